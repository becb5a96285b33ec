//! Bundled boundary datasets.
//!
//! Two GeoJSON assets ship with the binary: district polygons keyed by a
//! `DISTRICT` property (some features also carry `code`) and assembly
//! constituency polygons keyed by `AC_NAME` with a `DIST_NAME` parent
//! reference. Any FeatureCollection whose features carry at least one of
//! the `code`/`DISTRICT`/`AC_NAME`/`name` keys works here; nothing is
//! fetched at runtime.

use std::str::FromStr;

use geojson::{FeatureCollection, GeoJson};

use crate::error::MapError;
use crate::matching::name_contains;

const DISTRICTS_GEOJSON: &str = include_str!("../assets/tn_districts.geojson");
const CONSTITUENCIES_GEOJSON: &str = include_str!("../assets/tn_constituencies.geojson");

/// Property on constituency features naming the owning district.
const DISTRICT_NAME_KEY: &str = "DIST_NAME";

pub struct BoundaryStore {
    districts: FeatureCollection,
    constituencies: FeatureCollection,
}

impl BoundaryStore {
    pub fn bundled() -> Result<Self, MapError> {
        Ok(Self {
            districts: parse_collection(DISTRICTS_GEOJSON, "tn_districts.geojson")?,
            constituencies: parse_collection(CONSTITUENCIES_GEOJSON, "tn_constituencies.geojson")?,
        })
    }

    /// The full district boundary file (the state-level view).
    pub fn district_boundaries(&self) -> &FeatureCollection {
        &self.districts
    }

    /// Constituency features whose district-name property contains the
    /// given district name, case-insensitively. Contains rather than exact
    /// so that "Coimbatore District" still matches "Coimbatore".
    pub fn constituency_subset(&self, district_name: &str) -> FeatureCollection {
        let features = self
            .constituencies
            .features
            .iter()
            .filter(|f| {
                f.properties
                    .as_ref()
                    .and_then(|p| p.get(DISTRICT_NAME_KEY))
                    .and_then(|v| v.as_str())
                    .is_some_and(|v| name_contains(v, district_name))
            })
            .cloned()
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

fn parse_collection(raw: &str, asset: &'static str) -> Result<FeatureCollection, MapError> {
    match GeoJson::from_str(raw)? {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => Err(MapError::NotACollection(asset)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_assets_parse() {
        let store = BoundaryStore::bundled().unwrap();
        assert_eq!(store.district_boundaries().features.len(), 10);
    }

    #[test]
    fn subset_filters_by_district_name() {
        let store = BoundaryStore::bundled().unwrap();
        let subset = store.constituency_subset("Coimbatore");
        assert_eq!(subset.features.len(), 5);
        for f in &subset.features {
            let dist = f.properties.as_ref().unwrap()["DIST_NAME"].as_str().unwrap();
            assert!(dist.to_lowercase().contains("coimbatore"));
        }
    }

    #[test]
    fn subset_matching_ignores_case() {
        let store = BoundaryStore::bundled().unwrap();
        assert_eq!(store.constituency_subset("CHENNAI").features.len(), 3);
    }

    #[test]
    fn unknown_district_yields_empty_subset() {
        let store = BoundaryStore::bundled().unwrap();
        assert!(store.constituency_subset("Hogwarts").features.is_empty());
    }
}
