use chrono::{DateTime, Utc};
use ratatui::style::Color;
use serde::Deserialize;

use crate::config::LEANING_MARGIN;
use crate::registry::GeographicRegistry;

/// Categorical summary of a sentiment breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Leaning {
    Positive,
    Neutral,
    Negative,
}

/// Aggregate sentiment for a region or booth.
///
/// The three percentages are carried as-is from the source tables; their sum
/// is not forced to 100.
#[derive(Debug, Clone, Deserialize)]
pub struct SentimentScore {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    pub overall: Leaning,
    pub confidence: f64,
    pub last_updated: DateTime<Utc>,
}

impl SentimentScore {
    /// Builds a score with `overall` derived from the breakdown: whichever
    /// of positive/negative leads by at least [`LEANING_MARGIN`] points
    /// wins, neutral otherwise.
    pub fn from_breakdown(positive: f64, neutral: f64, negative: f64, confidence: f64) -> Self {
        let overall = if positive >= negative + LEANING_MARGIN {
            Leaning::Positive
        } else if negative >= positive + LEANING_MARGIN {
            Leaning::Negative
        } else {
            Leaning::Neutral
        };
        Self {
            positive,
            neutral,
            negative,
            overall,
            confidence,
            last_updated: Utc::now(),
        }
    }
}

/// Choropleth severity band. Positive and negative each split three ways,
/// plus neutral and a distinct no-data band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    StrongPositive,
    MidPositive,
    WeakPositive,
    Neutral,
    WeakNegative,
    MidNegative,
    StrongNegative,
    NoData,
}

impl Tier {
    pub fn from_score(score: Option<&SentimentScore>) -> Self {
        let Some(s) = score else { return Tier::NoData };
        match s.overall {
            Leaning::Positive if s.positive >= 70.0 => Tier::StrongPositive,
            Leaning::Positive if s.positive >= 60.0 => Tier::MidPositive,
            Leaning::Positive => Tier::WeakPositive,
            Leaning::Negative if s.negative >= 40.0 => Tier::StrongNegative,
            Leaning::Negative if s.negative >= 30.0 => Tier::MidNegative,
            Leaning::Negative => Tier::WeakNegative,
            Leaning::Neutral => Tier::Neutral,
        }
    }

    /// Polygon outline color on the map canvas.
    pub fn color(self) -> Color {
        match self {
            Tier::StrongPositive => Color::Rgb(26, 152, 80),
            Tier::MidPositive => Color::Rgb(102, 189, 99),
            Tier::WeakPositive => Color::Rgb(166, 217, 106),
            Tier::Neutral => Color::Rgb(255, 255, 191),
            Tier::WeakNegative => Color::Rgb(254, 224, 139),
            Tier::MidNegative => Color::Rgb(244, 109, 67),
            Tier::StrongNegative => Color::Rgb(215, 48, 39),
            // Gray, never the neutral-sentiment color.
            Tier::NoData => Color::Rgb(128, 128, 128),
        }
    }

    /// Collapsed green/yellow/red/gray mapping for booth markers.
    pub fn marker_color(self) -> Color {
        match self {
            Tier::StrongPositive | Tier::MidPositive | Tier::WeakPositive => Color::Green,
            Tier::Neutral => Color::Yellow,
            Tier::WeakNegative | Tier::MidNegative | Tier::StrongNegative => Color::Red,
            Tier::NoData => Color::DarkGray,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::StrongPositive => "strongly positive",
            Tier::MidPositive => "positive",
            Tier::WeakPositive => "leaning positive",
            Tier::Neutral => "neutral",
            Tier::WeakNegative => "leaning negative",
            Tier::MidNegative => "negative",
            Tier::StrongNegative => "strongly negative",
            Tier::NoData => "no data",
        }
    }
}

/// Resolves a boundary feature's identifying string to a sentiment score.
///
/// Boundary files expose different identifying properties (`code`,
/// `DISTRICT`, `AC_NAME`, `name`), so the lookup walks an ordered fallback
/// chain and returns the first region that both matches and carries a
/// score. Callers cannot tell which strategy succeeded.
pub struct SentimentResolver<'r> {
    registry: &'r GeographicRegistry,
}

impl<'r> SentimentResolver<'r> {
    pub fn new(registry: &'r GeographicRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, feature_id: &str) -> Option<&'r SentimentScore> {
        let r = self.registry;
        r.district(feature_id)
            .and_then(|d| d.sentiment.as_ref())
            .or_else(|| r.constituency(feature_id).and_then(|c| c.sentiment.as_ref()))
            .or_else(|| r.district_by_name(feature_id).and_then(|d| d.sentiment.as_ref()))
            .or_else(|| {
                r.constituency_by_name(feature_id)
                    .and_then(|c| c.sentiment.as_ref())
            })
            // Top-level state codes and names come last.
            .or_else(|| r.state(feature_id).and_then(|s| s.sentiment.as_ref()))
            .or_else(|| r.state_by_name(feature_id).and_then(|s| s.sentiment.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::GeographicRegistry;

    fn registry() -> GeographicRegistry {
        GeographicRegistry::bundled().unwrap()
    }

    #[test]
    fn resolves_district_by_code() {
        let reg = registry();
        let s = SentimentResolver::new(&reg).resolve("TN04").unwrap();
        assert_eq!(s.positive, 61.0);
    }

    #[test]
    fn falls_back_to_district_name() {
        // A DISTRICT-style feature id carries no code at all; the chain must
        // still land on the right district.
        let reg = registry();
        let s = SentimentResolver::new(&reg).resolve("Coimbatore").unwrap();
        assert_eq!(s.positive, 61.0);
    }

    #[test]
    fn falls_back_to_constituency_name() {
        let reg = registry();
        let s = SentimentResolver::new(&reg).resolve("Kavundampalayam").unwrap();
        assert_eq!(s.positive, 66.0);
    }

    #[test]
    fn resolves_state_codes_last() {
        let reg = registry();
        assert!(SentimentResolver::new(&reg).resolve("TN").is_some());
        assert!(SentimentResolver::new(&reg).resolve("Tamil Nadu").is_some());
    }

    #[test]
    fn unknown_feature_is_absent() {
        let reg = registry();
        assert!(SentimentResolver::new(&reg).resolve("Atlantis").is_none());
    }

    #[test]
    fn region_without_score_is_absent() {
        // Thanjavur exists in the registry but has no sentiment.
        let reg = registry();
        assert!(SentimentResolver::new(&reg).resolve("TN09").is_none());
    }

    fn score(positive: f64, negative: f64, overall: Leaning) -> SentimentScore {
        SentimentScore {
            positive,
            neutral: 100.0 - positive - negative,
            negative,
            overall,
            confidence: 0.7,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn positive_tier_boundaries_are_exact() {
        let t = |p| Tier::from_score(Some(&score(p, 10.0, Leaning::Positive)));
        assert_eq!(t(70.0), Tier::StrongPositive);
        assert_eq!(t(69.0), Tier::MidPositive);
        assert_eq!(t(60.0), Tier::MidPositive);
        assert_eq!(t(59.0), Tier::WeakPositive);
    }

    #[test]
    fn negative_tier_boundaries_are_exact() {
        let t = |n| Tier::from_score(Some(&score(10.0, n, Leaning::Negative)));
        assert_eq!(t(40.0), Tier::StrongNegative);
        assert_eq!(t(39.0), Tier::MidNegative);
        assert_eq!(t(30.0), Tier::MidNegative);
        assert_eq!(t(29.0), Tier::WeakNegative);
    }

    #[test]
    fn missing_score_has_its_own_tier() {
        assert_eq!(Tier::from_score(None), Tier::NoData);
        assert_ne!(
            Tier::NoData.color(),
            Tier::from_score(Some(&score(30.0, 30.0, Leaning::Neutral))).color()
        );
    }

    #[test]
    fn breakdown_leaning_uses_margin() {
        assert_eq!(
            SentimentScore::from_breakdown(55.0, 25.0, 20.0, 0.7).overall,
            Leaning::Positive
        );
        assert_eq!(
            SentimentScore::from_breakdown(20.0, 35.0, 45.0, 0.7).overall,
            Leaning::Negative
        );
        assert_eq!(
            SentimentScore::from_breakdown(38.0, 27.0, 35.0, 0.7).overall,
            Leaning::Neutral
        );
    }
}
