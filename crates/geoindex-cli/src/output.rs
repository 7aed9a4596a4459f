use geoindex_core::{Address, PairedCoordinates, Place};
use std::fmt::Write;

fn id_of(place: &Place) -> &str {
    place.id().map_or("-", |id| id.as_str())
}

fn line(address: &Address) -> String {
    let path: Vec<&str> = address.admin_levels().iter().map(|l| l.name()).collect();
    let street = [address.street_name(), address.street_number()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if street.is_empty() {
        path.join(" / ")
    } else {
        format!("{} / {street}", path.join(" / "))
    }
}

/// `<id>  <admin path> / <street>`
pub fn summary(place: &Place, locale: &str) -> String {
    format!("{}  {}", id_of(place), line(place.address_or_primary(locale)))
}

pub fn details(place: &Place, locale: &str) -> String {
    let address = place.address_or_primary(locale);
    let mut out = String::new();
    let _ = writeln!(out, "Place: {}", id_of(place));
    for level in address.admin_levels() {
        let _ = writeln!(out, "  Level {}: {}", level.level(), level.name());
    }
    if let Some(country) = address.country() {
        let _ = writeln!(
            out,
            "  Country: {} ({})",
            country.name().unwrap_or("-"),
            country.code().unwrap_or("-")
        );
    }
    for (label, value) in [
        ("Locality", address.locality()),
        ("Sub-locality", address.sub_locality()),
        ("Street", address.street_name()),
        ("Number", address.street_number()),
        ("Postal code", place.postal_code().unwrap_or_default()),
        ("Timezone", place.timezone().unwrap_or_default()),
        ("Provided by", place.provided_by()),
    ] {
        if !value.is_empty() {
            let _ = writeln!(out, "  {label}: {value}");
        }
    }
    let locales: Vec<&str> = place.locales().collect();
    let _ = writeln!(out, "  Locales: {}", locales.join(", "));
    let _ = writeln!(out, "  Polygons: {}", place.polygons().len());
    out
}

pub fn pair(pair: &PairedCoordinates, locale: &str) -> String {
    let (a, b) = (pair.coordinates_a(), pair.coordinates_b());
    format!(
        "{:.3} km  ({:.6}, {:.6}) ~ ({:.6}, {:.6})  {}",
        pair.distance(),
        a.latitude(),
        a.longitude(),
        b.latitude(),
        b.longitude(),
        summary(pair.place_b(), locale)
    )
}
