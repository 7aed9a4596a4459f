// crates/geoindex-core/src/model/paired.rs
use super::{Coordinates, Place};
use crate::spatial::distance;
use std::sync::Arc;

/// One vertex pair found by neighbor detection: a vertex of place A and the
/// nearest vertex of place B, `distance` kilometers apart.
#[derive(Clone, Debug, PartialEq)]
pub struct PairedCoordinates {
    coordinates_a: Coordinates,
    place_a: Arc<Place>,
    coordinates_b: Coordinates,
    place_b: Arc<Place>,
    distance: f64,
}

impl PairedCoordinates {
    pub fn new(
        coordinates_a: Coordinates,
        place_a: Arc<Place>,
        coordinates_b: Coordinates,
        place_b: Arc<Place>,
        distance: f64,
    ) -> Self {
        Self {
            coordinates_a,
            place_a,
            coordinates_b,
            place_b,
            distance: distance.max(0.0),
        }
    }

    pub fn coordinates_a(&self) -> &Coordinates {
        &self.coordinates_a
    }

    pub fn place_a(&self) -> &Place {
        &self.place_a
    }

    pub fn coordinates_b(&self) -> &Coordinates {
        &self.coordinates_b
    }

    pub fn place_b(&self) -> &Place {
        &self.place_b
    }

    /// Kilometers between the two vertices.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    fn involves(&self, place: &Place) -> bool {
        self.place_a.is_same(place) || self.place_b.is_same(place)
    }

    // Distance from `point` to the nearer side of the pair; a side whose place
    // is `exclude` is not measured.
    fn reach(&self, point: &Coordinates, exclude: Option<&Place>) -> f64 {
        let to_a = distance(point, &self.coordinates_a);
        let to_b = distance(point, &self.coordinates_b);
        match exclude {
            Some(p) if self.place_a.is_same(p) => to_b,
            Some(p) if self.place_b.is_same(p) => to_a,
            _ => to_a.min(to_b),
        }
    }
}

/// Ordered result of [`crate::Location::find_touched_places`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PairedCoordinatesCollection {
    pairs: Vec<PairedCoordinates>,
}

impl PairedCoordinatesCollection {
    pub fn new(pairs: Vec<PairedCoordinates>) -> Self {
        Self { pairs }
    }

    pub fn push(&mut self, pair: PairedCoordinates) {
        self.pairs.push(pair);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PairedCoordinates> {
        self.pairs.iter()
    }

    /// Pairs that have `place` on either side.
    pub fn filter_by_place(&self, place: &Place) -> PairedCoordinatesCollection {
        self.pairs
            .iter()
            .filter(|pair| pair.involves(place))
            .cloned()
            .collect()
    }

    /// Pairs ordered by how close they are to `point`, nearest first.
    ///
    /// When `exclude` is given, the side belonging to that place is ignored
    /// and only the opposite vertex is measured.
    pub fn sort_nearest_pair(
        &self,
        point: &Coordinates,
        exclude: Option<&Place>,
    ) -> PairedCoordinatesCollection {
        let mut keyed: Vec<(f64, &PairedCoordinates)> = self
            .pairs
            .iter()
            .map(|pair| (pair.reach(point, exclude), pair))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, pair)| pair.clone()).collect()
    }
}

impl FromIterator<PairedCoordinates> for PairedCoordinatesCollection {
    fn from_iter<I: IntoIterator<Item = PairedCoordinates>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for PairedCoordinatesCollection {
    type Item = PairedCoordinates;
    type IntoIter = std::vec::IntoIter<PairedCoordinates>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<'a> IntoIterator for &'a PairedCoordinatesCollection {
    type Item = &'a PairedCoordinates;
    type IntoIter = std::slice::Iter<'a, PairedCoordinates>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
