//! Polling booths: the leaf level of the drill-down.
//!
//! Booths are either taken from the bundled sample set or synthesized, so
//! the booth view is never empty regardless of data coverage.

use rand::Rng;
use serde::Deserialize;

use crate::config::{BOOTH_JITTER_DEG, DEFAULT_BOOTH_COUNT};
use crate::registry::{GeographicRegistry, LatLng};
use crate::sentiment::SentimentScore;

#[derive(Debug, Clone, Deserialize)]
pub struct PollingBooth {
    pub id: String,
    pub name: String,
    pub booth_number: u32,
    pub constituency_code: String,
    pub location: LatLng,
    pub total_voters: u64,
    pub address: String,
    pub sentiment: Option<SentimentScore>,
}

/// Knobs for the synthetic generator.
#[derive(Debug, Clone)]
pub struct BoothGenConfig {
    /// Booth count when the registry has no count for the constituency.
    pub default_count: usize,
    /// Max lat/lng offset from the approximate center, in degrees.
    pub jitter_deg: f64,
}

impl Default for BoothGenConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_BOOTH_COUNT,
            jitter_deg: BOOTH_JITTER_DEG,
        }
    }
}

/// Returns the booths for a constituency, never empty.
///
/// Sample booths win when any exist; otherwise a plausible set is
/// synthesized around the constituency center (the state center when even
/// the constituency is unknown), sized by the registry's booth count or the
/// configured default.
pub fn booths_for(
    constituency_code: &str,
    registry: &GeographicRegistry,
    config: &BoothGenConfig,
    rng: &mut impl Rng,
) -> Vec<PollingBooth> {
    let samples = registry.sample_booths_for(constituency_code);
    if !samples.is_empty() {
        return samples;
    }

    let constituency = registry.constituency(constituency_code);
    let count = constituency
        .map(|c| c.polling_booths)
        .filter(|&n| n > 0)
        .unwrap_or(config.default_count);
    let center = constituency
        .map(|c| c.center)
        .or_else(|| registry.default_state().map(|s| s.center))
        .unwrap_or(LatLng { lat: 0.0, lng: 0.0 });
    let label = constituency
        .map(|c| c.name.clone())
        .unwrap_or_else(|| constituency_code.to_string());

    (1..=count)
        .map(|n| synthesize(constituency_code, &label, n as u32, center, config, rng))
        .collect()
}

fn synthesize(
    code: &str,
    label: &str,
    number: u32,
    center: LatLng,
    config: &BoothGenConfig,
    rng: &mut impl Rng,
) -> PollingBooth {
    let j = config.jitter_deg;
    let positive = rng.random_range(20.0..70.0);
    let negative = rng.random_range(10.0..(95.0 - positive));
    let neutral = 100.0 - positive - negative;
    PollingBooth {
        id: format!("PB-{code}-G{number:03}"),
        name: format!("Booth {number}, {label}"),
        booth_number: number,
        constituency_code: code.to_string(),
        location: LatLng {
            lat: center.lat + rng.random_range(-j..j),
            lng: center.lng + rng.random_range(-j..j),
        },
        total_voters: rng.random_range(600..1400),
        address: format!("Ward {number}, {label}"),
        sentiment: Some(SentimentScore::from_breakdown(
            positive,
            neutral,
            negative,
            rng.random_range(0.4..0.9),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup() -> (GeographicRegistry, BoothGenConfig, StdRng) {
        (
            GeographicRegistry::bundled().unwrap(),
            BoothGenConfig::default(),
            StdRng::seed_from_u64(7),
        )
    }

    #[test]
    fn sampled_constituency_returns_its_samples() {
        let (reg, cfg, mut rng) = setup();
        let booths = booths_for("TN044", &reg, &cfg, &mut rng);
        assert_eq!(booths.len(), 4);
        assert!(booths.iter().all(|b| b.constituency_code == "TN044"));
        assert!(booths.iter().all(|b| b.id.starts_with("PB-TN044-")));
    }

    #[test]
    fn unsampled_constituency_generates_registry_count() {
        let (reg, cfg, mut rng) = setup();
        // TN045 has no samples; the registry says 5 booths.
        let booths = booths_for("TN045", &reg, &cfg, &mut rng);
        assert_eq!(booths.len(), 5);
        let c = reg.constituency("TN045").unwrap();
        for b in &booths {
            assert!((b.location.lat - c.center.lat).abs() <= cfg.jitter_deg);
            assert!((b.location.lng - c.center.lng).abs() <= cfg.jitter_deg);
            assert!(b.sentiment.is_some());
        }
    }

    #[test]
    fn unknown_constituency_generates_default_count() {
        let (reg, cfg, mut rng) = setup();
        let booths = booths_for("TN999", &reg, &cfg, &mut rng);
        assert_eq!(booths.len(), cfg.default_count);
        // Falls back to the state center for placement.
        let state = reg.default_state().unwrap();
        assert!((booths[0].location.lat - state.center.lat).abs() <= cfg.jitter_deg);
    }

    #[test]
    fn booths_are_never_empty() {
        let (reg, cfg, mut rng) = setup();
        for code in ["TN044", "TN045", "TN011", "TN999", ""] {
            assert!(!booths_for(code, &reg, &cfg, &mut rng).is_empty());
        }
    }
}
