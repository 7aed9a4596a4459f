// crates/geoindex-core/src/storage/relational.rs
//! DuckDB-backed storage provider.
//!
//! A place is spread over five tables joined by `object_hash`:
//! `place`, `address`, `admin_level`, `polygon` (one row per vertex) and
//! `actual_keys` (its secondary-index rows). With compression enabled the
//! `place` row carries the whole record as a blob and the address and
//! polygon rows are not written.

use super::codec::{write_failed, PlaceCodec};
use crate::config::DBConfig;
use crate::error::{GeoError, Result};
use crate::index::IndexEntry;
use crate::model::{
    Address, AdminLevel, AdminLevelCollection, Bounds, Coordinates, Country, Place, PlaceId,
    Polygon,
};
use crate::traits::StorageProvider;
use duckdb::types::Value;
use duckdb::{params, params_from_iter, Connection, Params, Row};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS place (
    object_hash VARCHAR NOT NULL,
    seq_no BIGINT NOT NULL,
    primary_locale VARCHAR NOT NULL,
    postal_code VARCHAR,
    timezone VARCHAR,
    provided_by VARCHAR NOT NULL,
    bounds_west DOUBLE,
    bounds_east DOUBLE,
    bounds_north DOUBLE,
    bounds_south DOUBLE,
    compressed_data BLOB
);
CREATE TABLE IF NOT EXISTS address (
    object_hash VARCHAR NOT NULL,
    locale VARCHAR NOT NULL,
    street_number VARCHAR NOT NULL,
    street_name VARCHAR NOT NULL,
    locality VARCHAR NOT NULL,
    sub_locality VARCHAR NOT NULL,
    country_name VARCHAR,
    country_code VARCHAR
);
CREATE TABLE IF NOT EXISTS admin_level (
    object_hash VARCHAR NOT NULL,
    locale VARCHAR NOT NULL,
    level INTEGER NOT NULL,
    name VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS polygon (
    object_hash VARCHAR NOT NULL,
    ring INTEGER NOT NULL,
    vertex INTEGER NOT NULL,
    longitude DOUBLE NOT NULL,
    latitude DOUBLE NOT NULL,
    altitude DOUBLE NOT NULL
);
CREATE TABLE IF NOT EXISTS actual_keys (
    object_hash VARCHAR NOT NULL,
    locale VARCHAR NOT NULL,
    level INTEGER NOT NULL,
    search_key VARCHAR NOT NULL
);
";

const TABLES: [&str; 5] = ["actual_keys", "polygon", "admin_level", "address", "place"];

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn opt_text(s: Option<&str>) -> Value {
    s.map_or(Value::Null, text)
}

fn opt_double(v: Option<f64>) -> Value {
    v.map_or(Value::Null, Value::Double)
}

fn column_list(names: impl Iterator<Item = &'static str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

fn insert_sql(table: &str, names: impl Iterator<Item = &'static str> + Clone) -> String {
    let placeholders = vec!["?"; names.clone().count()].join(", ");
    format!("INSERT INTO {table} ({}) VALUES ({placeholders})", column_list(names))
}

// Column ↔ field mapping, one enum per table. The variant order is the
// column order of every SELECT and INSERT built from `ALL`.

struct PlaceRow<'a> {
    id: &'a PlaceId,
    place: &'a Place,
    position: i64,
    blob: Option<Vec<u8>>,
}

#[derive(Clone, Copy)]
enum PlaceColumn {
    ObjectHash,
    Position,
    PrimaryLocale,
    PostalCode,
    Timezone,
    ProvidedBy,
    BoundsWest,
    BoundsEast,
    BoundsNorth,
    BoundsSouth,
    CompressedData,
}

impl PlaceColumn {
    const ALL: [PlaceColumn; 11] = [
        PlaceColumn::ObjectHash,
        PlaceColumn::Position,
        PlaceColumn::PrimaryLocale,
        PlaceColumn::PostalCode,
        PlaceColumn::Timezone,
        PlaceColumn::ProvidedBy,
        PlaceColumn::BoundsWest,
        PlaceColumn::BoundsEast,
        PlaceColumn::BoundsNorth,
        PlaceColumn::BoundsSouth,
        PlaceColumn::CompressedData,
    ];

    fn name(self) -> &'static str {
        match self {
            PlaceColumn::ObjectHash => "object_hash",
            PlaceColumn::Position => "seq_no",
            PlaceColumn::PrimaryLocale => "primary_locale",
            PlaceColumn::PostalCode => "postal_code",
            PlaceColumn::Timezone => "timezone",
            PlaceColumn::ProvidedBy => "provided_by",
            PlaceColumn::BoundsWest => "bounds_west",
            PlaceColumn::BoundsEast => "bounds_east",
            PlaceColumn::BoundsNorth => "bounds_north",
            PlaceColumn::BoundsSouth => "bounds_south",
            PlaceColumn::CompressedData => "compressed_data",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn value(self, row: &PlaceRow<'_>) -> Value {
        let bounds = row.place.bounds();
        match self {
            PlaceColumn::ObjectHash => text(row.id.as_str()),
            PlaceColumn::Position => Value::BigInt(row.position),
            PlaceColumn::PrimaryLocale => text(row.place.primary_locale()),
            PlaceColumn::PostalCode => opt_text(row.place.postal_code()),
            PlaceColumn::Timezone => opt_text(row.place.timezone()),
            PlaceColumn::ProvidedBy => text(row.place.provided_by()),
            PlaceColumn::BoundsWest => opt_double(bounds.map(Bounds::west)),
            PlaceColumn::BoundsEast => opt_double(bounds.map(Bounds::east)),
            PlaceColumn::BoundsNorth => opt_double(bounds.map(Bounds::north)),
            PlaceColumn::BoundsSouth => opt_double(bounds.map(Bounds::south)),
            PlaceColumn::CompressedData => row.blob.clone().map_or(Value::Null, Value::Blob),
        }
    }
}

#[derive(Clone, Copy)]
enum AddressColumn {
    ObjectHash,
    Locale,
    StreetNumber,
    StreetName,
    Locality,
    SubLocality,
    CountryName,
    CountryCode,
}

impl AddressColumn {
    const ALL: [AddressColumn; 8] = [
        AddressColumn::ObjectHash,
        AddressColumn::Locale,
        AddressColumn::StreetNumber,
        AddressColumn::StreetName,
        AddressColumn::Locality,
        AddressColumn::SubLocality,
        AddressColumn::CountryName,
        AddressColumn::CountryCode,
    ];

    fn name(self) -> &'static str {
        match self {
            AddressColumn::ObjectHash => "object_hash",
            AddressColumn::Locale => "locale",
            AddressColumn::StreetNumber => "street_number",
            AddressColumn::StreetName => "street_name",
            AddressColumn::Locality => "locality",
            AddressColumn::SubLocality => "sub_locality",
            AddressColumn::CountryName => "country_name",
            AddressColumn::CountryCode => "country_code",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn value(self, id: &PlaceId, address: &Address) -> Value {
        match self {
            AddressColumn::ObjectHash => text(id.as_str()),
            AddressColumn::Locale => text(address.locale()),
            AddressColumn::StreetNumber => text(address.street_number()),
            AddressColumn::StreetName => text(address.street_name()),
            AddressColumn::Locality => text(address.locality()),
            AddressColumn::SubLocality => text(address.sub_locality()),
            AddressColumn::CountryName => opt_text(address.country().and_then(Country::name)),
            AddressColumn::CountryCode => opt_text(address.country().and_then(Country::code)),
        }
    }
}

#[derive(Clone, Copy)]
enum AdminLevelColumn {
    ObjectHash,
    Locale,
    Level,
    Name,
}

impl AdminLevelColumn {
    const ALL: [AdminLevelColumn; 4] = [
        AdminLevelColumn::ObjectHash,
        AdminLevelColumn::Locale,
        AdminLevelColumn::Level,
        AdminLevelColumn::Name,
    ];

    fn name(self) -> &'static str {
        match self {
            AdminLevelColumn::ObjectHash => "object_hash",
            AdminLevelColumn::Locale => "locale",
            AdminLevelColumn::Level => "level",
            AdminLevelColumn::Name => "name",
        }
    }

    fn value(self, id: &PlaceId, locale: &str, admin: &AdminLevel) -> Value {
        match self {
            AdminLevelColumn::ObjectHash => text(id.as_str()),
            AdminLevelColumn::Locale => text(locale),
            AdminLevelColumn::Level => Value::Int(admin.level()),
            AdminLevelColumn::Name => text(admin.name()),
        }
    }
}

#[derive(Clone, Copy)]
enum PolygonColumn {
    ObjectHash,
    Ring,
    Vertex,
    Longitude,
    Latitude,
    Altitude,
}

impl PolygonColumn {
    const ALL: [PolygonColumn; 6] = [
        PolygonColumn::ObjectHash,
        PolygonColumn::Ring,
        PolygonColumn::Vertex,
        PolygonColumn::Longitude,
        PolygonColumn::Latitude,
        PolygonColumn::Altitude,
    ];

    fn name(self) -> &'static str {
        match self {
            PolygonColumn::ObjectHash => "object_hash",
            PolygonColumn::Ring => "ring",
            PolygonColumn::Vertex => "vertex",
            PolygonColumn::Longitude => "longitude",
            PolygonColumn::Latitude => "latitude",
            PolygonColumn::Altitude => "altitude",
        }
    }

    fn value(self, id: &PlaceId, ring: i32, vertex: i32, c: &Coordinates) -> Value {
        match self {
            PolygonColumn::ObjectHash => text(id.as_str()),
            PolygonColumn::Ring => Value::Int(ring),
            PolygonColumn::Vertex => Value::Int(vertex),
            PolygonColumn::Longitude => Value::Double(c.longitude()),
            PolygonColumn::Latitude => Value::Double(c.latitude()),
            PolygonColumn::Altitude => Value::Double(c.altitude()),
        }
    }
}

#[derive(Clone, Copy)]
enum KeyColumn {
    ObjectHash,
    Locale,
    Level,
    SearchKey,
}

impl KeyColumn {
    const ALL: [KeyColumn; 4] = [
        KeyColumn::ObjectHash,
        KeyColumn::Locale,
        KeyColumn::Level,
        KeyColumn::SearchKey,
    ];

    fn name(self) -> &'static str {
        match self {
            KeyColumn::ObjectHash => "object_hash",
            KeyColumn::Locale => "locale",
            KeyColumn::Level => "level",
            KeyColumn::SearchKey => "search_key",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn value(self, entry: &IndexEntry) -> Value {
        match self {
            KeyColumn::ObjectHash => text(entry.place_id.as_str()),
            KeyColumn::Locale => text(&entry.locale),
            KeyColumn::Level => Value::Int(entry.level),
            KeyColumn::SearchKey => text(&entry.key),
        }
    }
}

fn ring_index(i: usize) -> Result<i32> {
    i32::try_from(i).map_err(|_| GeoError::validation(format!("polygon index {i} is too large")))
}

// Best-effort ROLLBACK; false when the connection refused it.
fn abort_open_transaction(conn: &Connection) -> bool {
    match conn.execute_batch("ROLLBACK") {
        Ok(()) => true,
        Err(e) => {
            log::error!("rollback after failed commit failed too: {e}");
            false
        }
    }
}

pub struct RelationalStorage {
    conn: Connection,
    codec: PlaceCodec,
    in_transaction: bool,
}

impl RelationalStorage {
    /// Wraps `conn`, creating the tables when missing.
    pub fn open(conn: Connection, config: &DBConfig) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            codec: PlaceCodec::from_config(config),
            in_transaction: false,
        })
    }

    pub fn open_path(path: impl AsRef<Path>, config: &DBConfig) -> Result<Self> {
        Self::open(Connection::open(path)?, config)
    }

    pub fn open_in_memory(config: &DBConfig) -> Result<Self> {
        Self::open(Connection::open_in_memory()?, config)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn staged<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.in_transaction {
            return f(self);
        }
        self.begin_transaction()?;
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(e) => {
                self.rollback()?;
                Err(e)
            }
        }
    }

    fn exists(&self, id: &PlaceId) -> Result<bool> {
        let mut stmt = self.conn.prepare("SELECT COUNT(*) FROM place WHERE object_hash = ?")?;
        let count: i64 = stmt.query_row(params![id.as_str()], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn remove_rows(&self, id: &PlaceId) -> Result<()> {
        for table in TABLES {
            self.conn.execute(
                &format!("DELETE FROM {table} WHERE object_hash = ?"),
                params![id.as_str()],
            )?;
        }
        Ok(())
    }

    fn next_position(&self) -> Result<i64> {
        let mut stmt = self
            .conn
            .prepare("SELECT COALESCE(MAX(seq_no), -1) + 1 FROM place")?;
        Ok(stmt.query_row([], |row| row.get(0))?)
    }

    fn insert_rows(&self, id: &PlaceId, place: &Place, entries: &[IndexEntry]) -> Result<()> {
        let blob = if self.codec.is_compressed() {
            Some(self.codec.compress_place(place)?)
        } else {
            None
        };
        let row = PlaceRow {
            id,
            place,
            position: self.next_position()?,
            blob,
        };
        self.conn.execute(
            &insert_sql("place", PlaceColumn::ALL.iter().map(|c| c.name())),
            params_from_iter(PlaceColumn::ALL.iter().map(|c| c.value(&row))),
        )?;

        let admin_sql = insert_sql("admin_level", AdminLevelColumn::ALL.iter().map(|c| c.name()));
        for (locale, address) in place.addresses() {
            for admin in address.admin_levels() {
                self.conn.execute(
                    &admin_sql,
                    params_from_iter(
                        AdminLevelColumn::ALL.iter().map(|c| c.value(id, locale, admin)),
                    ),
                )?;
            }
        }

        let key_sql = insert_sql("actual_keys", KeyColumn::ALL.iter().map(|c| c.name()));
        for entry in entries {
            self.conn.execute(
                &key_sql,
                params_from_iter(KeyColumn::ALL.iter().map(|c| c.value(entry))),
            )?;
        }

        if self.codec.is_compressed() {
            return Ok(());
        }

        let address_sql = insert_sql("address", AddressColumn::ALL.iter().map(|c| c.name()));
        for address in place.addresses().values() {
            self.conn.execute(
                &address_sql,
                params_from_iter(AddressColumn::ALL.iter().map(|c| c.value(id, address))),
            )?;
        }

        let polygon_sql = insert_sql("polygon", PolygonColumn::ALL.iter().map(|c| c.name()));
        for (r, polygon) in place.polygons().iter().enumerate() {
            let ring = ring_index(r)?;
            for (v, vertex) in polygon.coordinates().iter().enumerate() {
                let vertex_no = ring_index(v)?;
                self.conn.execute(
                    &polygon_sql,
                    params_from_iter(
                        PolygonColumn::ALL
                            .iter()
                            .map(|c| c.value(id, ring, vertex_no, vertex)),
                    ),
                )?;
            }
        }
        Ok(())
    }

    // Runs `sql` and maps every row; the statement is finished before
    // returning, so callers may issue further queries.
    fn collect_rows<T, P: Params>(
        &self,
        sql: &str,
        params: P,
        mut map: impl FnMut(&Row<'_>) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(map(row)?);
        }
        Ok(out)
    }

    fn load_admin_levels(&self, id: &PlaceId, locale: &str) -> Result<AdminLevelCollection> {
        let levels = self.collect_rows(
            "SELECT level, name FROM admin_level WHERE object_hash = ? AND locale = ? ORDER BY level",
            params![id.as_str(), locale],
            |row| Ok(AdminLevel::new(row.get(0)?, row.get::<_, String>(1)?)),
        )?;
        AdminLevelCollection::new(levels)
    }

    fn load_addresses(&self, id: &PlaceId) -> Result<Vec<Address>> {
        let sql = format!(
            "SELECT {} FROM address WHERE object_hash = ? ORDER BY locale",
            column_list(AddressColumn::ALL.iter().map(|c| c.name()))
        );
        let rows = self.collect_rows(&sql, params![id.as_str()], |row| {
            let locale: String = row.get(AddressColumn::Locale.index())?;
            let address = Address::new(locale, AdminLevelCollection::default())
                .with_street_number(row.get::<_, String>(AddressColumn::StreetNumber.index())?)
                .with_street_name(row.get::<_, String>(AddressColumn::StreetName.index())?)
                .with_locality(row.get::<_, String>(AddressColumn::Locality.index())?)
                .with_sub_locality(row.get::<_, String>(AddressColumn::SubLocality.index())?);
            let name: Option<String> = row.get(AddressColumn::CountryName.index())?;
            let code: Option<String> = row.get(AddressColumn::CountryCode.index())?;
            Ok(match (name, code) {
                (None, None) => address,
                (name, code) => address.with_country(Country::new(name, code)?),
            })
        })?;

        rows.into_iter()
            .map(|address| {
                let levels = self.load_admin_levels(id, address.locale())?;
                Ok(address.with_admin_levels(levels))
            })
            .collect()
    }

    fn load_polygons(&self, id: &PlaceId) -> Result<Vec<Polygon>> {
        let vertices = self.collect_rows(
            "SELECT ring, longitude, latitude, altitude FROM polygon \
             WHERE object_hash = ? ORDER BY ring, vertex",
            params![id.as_str()],
            |row| {
                let ring: i32 = row.get(0)?;
                Ok((ring, Coordinates::with_altitude(row.get(1)?, row.get(2)?, row.get(3)?)?))
            },
        )?;
        let mut polygons: Vec<Polygon> = Vec::new();
        let mut current = None;
        for (ring, vertex) in vertices {
            if current != Some(ring) {
                polygons.push(Polygon::default());
                current = Some(ring);
            }
            if let Some(polygon) = polygons.last_mut() {
                polygon.push(vertex);
            }
        }
        Ok(polygons)
    }
}

struct PlaceHeader {
    primary_locale: String,
    postal_code: Option<String>,
    timezone: Option<String>,
    provided_by: String,
    bounds: [Option<f64>; 4],
    blob: Option<Vec<u8>>,
}

impl PlaceHeader {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let mut bounds = [None; 4];
        for (slot, column) in bounds.iter_mut().zip([
            PlaceColumn::BoundsWest,
            PlaceColumn::BoundsEast,
            PlaceColumn::BoundsNorth,
            PlaceColumn::BoundsSouth,
        ]) {
            *slot = row.get(column.index())?;
        }
        Ok(Self {
            primary_locale: row.get(PlaceColumn::PrimaryLocale.index())?,
            postal_code: row.get(PlaceColumn::PostalCode.index())?,
            timezone: row.get(PlaceColumn::Timezone.index())?,
            provided_by: row.get(PlaceColumn::ProvidedBy.index())?,
            bounds,
            blob: row.get(PlaceColumn::CompressedData.index())?,
        })
    }
}

impl StorageProvider for RelationalStorage {
    fn begin_transaction(&mut self) -> Result<()> {
        if self.in_transaction {
            return Err(GeoError::Transaction("a transaction is already open".into()));
        }
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Err(GeoError::Transaction("commit without an open transaction".into()));
        }
        self.in_transaction = false;
        if let Err(e) = self.conn.execute_batch("COMMIT") {
            // a failed COMMIT can leave the transaction open
            abort_open_transaction(&self.conn);
            return Err(write_failed("commit", e.into()));
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.conn.execute_batch("ROLLBACK")?;
        log::debug!("relational transaction rolled back");
        Ok(())
    }

    fn persist_place(&mut self, place: &Place, entries: &[IndexEntry]) -> Result<()> {
        let id = place
            .id()
            .ok_or_else(|| GeoError::validation("cannot persist a place without id"))?;
        self.staged(|this| {
            this.remove_rows(id)?;
            this.insert_rows(id, place, entries)
        })
    }

    fn delete_place_by_id(&mut self, id: &PlaceId) -> Result<bool> {
        self.staged(|this| {
            if !this.exists(id)? {
                return Ok(false);
            }
            this.remove_rows(id)?;
            Ok(true)
        })
    }

    fn fetch_place_by_id(&self, id: &PlaceId) -> Result<Place> {
        let sql = format!(
            "SELECT {} FROM place WHERE object_hash = ?",
            column_list(PlaceColumn::ALL.iter().map(|c| c.name()))
        );
        let header = self
            .collect_rows(&sql, params![id.as_str()], PlaceHeader::from_row)?
            .into_iter()
            .next()
            .ok_or_else(|| GeoError::not_found(format!("place {id}")))?;

        if let Some(bytes) = header.blob {
            let place = self.codec.decompress_place(&bytes)?;
            return Ok(place.with_id(id.clone()));
        }

        let mut place = Place::from_addresses(self.load_addresses(id)?, &header.primary_locale)?
            .with_polygons(self.load_polygons(id)?)
            .with_provided_by(header.provided_by)
            .with_id(id.clone());
        if let [Some(west), Some(east), Some(north), Some(south)] = header.bounds {
            place = place.with_bounds(Bounds::new(west, east, north, south)?);
        }
        if let Some(code) = header.postal_code {
            place.set_postal_code(code);
        }
        if let Some(tz) = header.timezone {
            place.set_timezone(tz);
        }
        Ok(place)
    }

    fn list_places(&self, offset: usize, limit: usize) -> Result<Vec<Place>> {
        let ids = self.collect_rows(
            &format!("SELECT object_hash FROM place ORDER BY seq_no LIMIT {limit} OFFSET {offset}"),
            [],
            |row| Ok(PlaceId::new(row.get::<_, String>(0)?)),
        )?;
        ids.iter().map(|id| self.fetch_place_by_id(id)).collect()
    }

    fn list_all_known_admin_levels(&self) -> Result<Vec<i32>> {
        self.collect_rows(
            "SELECT DISTINCT level FROM admin_level ORDER BY level",
            [],
            |row| Ok(row.get(0)?),
        )
    }

    fn list_all_secondary_index_entries(&self) -> Result<Vec<IndexEntry>> {
        let sql = format!(
            "SELECT {} FROM actual_keys k JOIN place p USING (object_hash) ORDER BY p.seq_no",
            column_list(KeyColumn::ALL.iter().map(|c| c.name()))
        );
        self.collect_rows(&sql, [], |row| {
            Ok(IndexEntry {
                place_id: PlaceId::new(row.get::<_, String>(KeyColumn::ObjectHash.index())?),
                locale: row.get(KeyColumn::Locale.index())?,
                level: row.get(KeyColumn::Level.index())?,
                key: row.get(KeyColumn::SearchKey.index())?,
            })
        })
    }
}
