//! Static geographic reference data: the State → District → Constituency
//! hierarchy plus sample polling booths.
//!
//! The registry is an explicit value constructed once at startup and passed
//! by reference to whoever needs lookups, so tests can inject a small
//! fixture instead. All lookups are pure; nothing here mutates after
//! construction.

use serde::Deserialize;

use crate::booths::PollingBooth;
use crate::error::MapError;
use crate::matching::names_equal;
use crate::sentiment::SentimentScore;

const REGISTRY_JSON: &str = include_str!("../assets/tn_registry.json");

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn tuple(self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct State {
    pub code: String,
    pub name: String,
    pub center: LatLng,
    pub total_voters: u64,
    pub district_codes: Vec<String>,
    pub sentiment: Option<SentimentScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct District {
    pub code: String,
    pub name: String,
    pub center: LatLng,
    pub total_voters: u64,
    pub area_sq_km: f64,
    pub constituency_codes: Vec<String>,
    pub sentiment: Option<SentimentScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Constituency {
    pub code: String,
    pub name: String,
    pub center: LatLng,
    pub district_code: String,
    pub total_voters: u64,
    pub polling_booths: usize,
    pub sentiment: Option<SentimentScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeographicRegistry {
    states: Vec<State>,
    districts: Vec<District>,
    constituencies: Vec<Constituency>,
    #[serde(default)]
    sample_booths: Vec<PollingBooth>,
}

impl GeographicRegistry {
    /// Parses the bundled reference tables and checks their linkage.
    pub fn bundled() -> Result<Self, MapError> {
        let registry: Self = serde_json::from_str(REGISTRY_JSON)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Test/fixture constructor.
    pub fn new(
        states: Vec<State>,
        districts: Vec<District>,
        constituencies: Vec<Constituency>,
        sample_booths: Vec<PollingBooth>,
    ) -> Self {
        Self {
            states,
            districts,
            constituencies,
            sample_booths,
        }
    }

    /// Every constituency's `district_code` and every code in a state's
    /// district list must resolve. Districts without constituencies are
    /// allowed.
    fn validate(&self) -> Result<(), MapError> {
        for c in &self.constituencies {
            if self.district(&c.district_code).is_none() {
                return Err(MapError::Registry(format!(
                    "constituency {} references unknown district {}",
                    c.code, c.district_code
                )));
            }
        }
        for s in &self.states {
            for code in &s.district_codes {
                if self.district(code).is_none() {
                    return Err(MapError::Registry(format!(
                        "state {} lists unknown district {code}",
                        s.code
                    )));
                }
            }
        }
        for d in &self.districts {
            for code in &d.constituency_codes {
                if self.constituency(code).is_none() {
                    return Err(MapError::Registry(format!(
                        "district {} lists unknown constituency {code}",
                        d.code
                    )));
                }
            }
        }
        Ok(())
    }

    /// The state the map opens on.
    pub fn default_state(&self) -> Option<&State> {
        self.states.first()
    }

    pub fn state(&self, code: &str) -> Option<&State> {
        self.states.iter().find(|s| s.code == code)
    }

    pub fn district(&self, code: &str) -> Option<&District> {
        self.districts.iter().find(|d| d.code == code)
    }

    pub fn constituency(&self, code: &str) -> Option<&Constituency> {
        self.constituencies.iter().find(|c| c.code == code)
    }

    pub fn state_by_name(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| names_equal(&s.name, name))
    }

    pub fn district_by_name(&self, name: &str) -> Option<&District> {
        self.districts.iter().find(|d| names_equal(&d.name, name))
    }

    pub fn constituency_by_name(&self, name: &str) -> Option<&Constituency> {
        self.constituencies.iter().find(|c| names_equal(&c.name, name))
    }

    /// Ordered district codes of a state.
    pub fn districts_of(&self, state_code: &str) -> &[String] {
        self.state(state_code)
            .map(|s| s.district_codes.as_slice())
            .unwrap_or(&[])
    }

    /// Ordered constituency codes of a district.
    pub fn constituencies_of(&self, district_code: &str) -> &[String] {
        self.district(district_code)
            .map(|d| d.constituency_codes.as_slice())
            .unwrap_or(&[])
    }

    /// Sample booths belonging to a constituency, in table order.
    pub fn sample_booths_for(&self, constituency_code: &str) -> Vec<PollingBooth> {
        self.sample_booths
            .iter()
            .filter(|b| b.constituency_code == constituency_code)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_tables_parse_and_link() {
        let reg = GeographicRegistry::bundled().unwrap();
        assert_eq!(reg.default_state().unwrap().code, "TN");
        assert_eq!(reg.districts_of("TN").len(), 10);
    }

    #[test]
    fn lookup_by_code() {
        let reg = GeographicRegistry::bundled().unwrap();
        let d = reg.district("TN04").unwrap();
        assert_eq!(d.name, "Coimbatore");
        assert_eq!(d.center.tuple(), (11.0168, 76.9558));
        assert!(reg.district("TN99").is_none());
    }

    #[test]
    fn lookup_by_name_is_case_insensitive() {
        let reg = GeographicRegistry::bundled().unwrap();
        assert_eq!(reg.district_by_name("COIMBATORE").unwrap().code, "TN04");
        assert_eq!(
            reg.constituency_by_name("kavundampalayam").unwrap().code,
            "TN044"
        );
        assert!(reg.district_by_name("Coimbatore District").is_none());
    }

    #[test]
    fn children_are_ordered() {
        let reg = GeographicRegistry::bundled().unwrap();
        assert_eq!(
            reg.constituencies_of("TN04"),
            ["TN041", "TN042", "TN043", "TN044", "TN045"]
        );
        assert!(reg.constituencies_of("TN10").is_empty());
        assert!(reg.constituencies_of("nope").is_empty());
    }

    #[test]
    fn every_constituency_has_a_parent_district() {
        let reg = GeographicRegistry::bundled().unwrap();
        for code in reg.constituencies_of("TN04") {
            let c = reg.constituency(code).unwrap();
            assert!(reg.district(&c.district_code).is_some());
        }
    }

    #[test]
    fn broken_linkage_is_rejected() {
        let mut reg = GeographicRegistry::bundled().unwrap();
        reg.constituencies[0].district_code = "TN77".into();
        assert!(reg.validate().is_err());
    }

    #[test]
    fn sample_booths_filter_by_constituency() {
        let reg = GeographicRegistry::bundled().unwrap();
        assert_eq!(reg.sample_booths_for("TN044").len(), 4);
        assert!(reg.sample_booths_for("TN045").is_empty());
    }
}
