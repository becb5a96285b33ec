//! Choropleth boundary layer: polygon features colored by resolved
//! sentiment, with hover and click hit-testing.
//!
//! The layer is rebuilt from scratch whenever the active feature collection
//! changes; there is no incremental diffing, and dropping the old layer is
//! what guarantees stale hover state never outlives its dataset.

use geo::{Contains, Geometry, MultiPolygon, Point, Polygon};
use geojson::{FeatureCollection, JsonObject};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::canvas::{Canvas, Line};
use ratatui::widgets::{Block, Borders};

use crate::sentiment::{SentimentScore, Tier};
use crate::viewport::Viewport;

/// Identifying property keys tried in order. Different boundary sources
/// expose different ones.
const ID_KEYS: [&str; 4] = ["code", "DISTRICT", "AC_NAME", "name"];

/// Display-name keys, preferred over a bare code for labels.
const NAME_KEYS: [&str; 3] = ["DISTRICT", "AC_NAME", "name"];

/// Extracts the identifying string from a feature's property bag.
pub fn feature_id(properties: &JsonObject) -> Option<String> {
    ID_KEYS
        .iter()
        .find_map(|k| properties.get(*k).and_then(|v| v.as_str()))
        .map(str::to_string)
}

pub fn feature_display_name(properties: &JsonObject) -> Option<String> {
    NAME_KEYS
        .iter()
        .find_map(|k| properties.get(*k).and_then(|v| v.as_str()))
        .map(str::to_string)
        .or_else(|| feature_id(properties))
}

/// Hover transition reported to the application: `(Some, Some)` entering a
/// feature, `(None, None)` leaving.
pub struct HoverEvent {
    pub id: Option<String>,
    pub properties: Option<JsonObject>,
}

pub struct BoundaryFeature {
    pub id: String,
    pub name: String,
    pub properties: JsonObject,
    geometry: MultiPolygon<f64>,
    /// [min_lng, min_lat, max_lng, max_lat]
    pub bbox: [f64; 4],
}

pub struct BoundaryLayer {
    features: Vec<BoundaryFeature>,
    hovered: Option<usize>,
}

impl BoundaryLayer {
    /// Builds the layer from a feature collection. Features without a
    /// recognizable identifier or polygon geometry are skipped; partial
    /// coverage is expected, not an error.
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        let mut features = Vec::new();
        for feature in &collection.features {
            let Some(props) = feature.properties.clone() else { continue };
            let Some(id) = feature_id(&props) else { continue };
            let name = feature_display_name(&props).unwrap_or_else(|| id.clone());
            let Some(gj) = &feature.geometry else { continue };
            let Ok(geom) = Geometry::<f64>::try_from(gj.value.clone()) else {
                log::debug!("skipping feature {id}: unsupported geometry");
                continue;
            };
            let geometry: MultiPolygon<f64> = match geom {
                Geometry::Polygon(p) => p.into(),
                Geometry::MultiPolygon(m) => m,
                _ => continue,
            };
            let bbox = multipolygon_bbox(&geometry);
            features.push(BoundaryFeature {
                id,
                name,
                properties: props,
                geometry,
                bbox,
            });
        }
        Self {
            features,
            hovered: None,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.id.as_str())
    }

    /// First feature containing the point, if any.
    pub fn hit_test(&self, lat: f64, lng: f64) -> Option<&BoundaryFeature> {
        let point = Point::new(lng, lat);
        self.features.iter().find(|f| f.geometry.contains(&point))
    }

    /// Bounding box of the feature with the given id.
    pub fn bounds_of(&self, id: &str) -> Option<[f64; 4]> {
        self.features.iter().find(|f| f.id == id).map(|f| f.bbox)
    }

    /// Moves the hover state to whatever feature is under `pos` and reports
    /// the transition, or `None` when nothing changed.
    pub fn update_hover(&mut self, pos: Option<(f64, f64)>) -> Option<HoverEvent> {
        let hit = pos.and_then(|(lat, lng)| {
            let point = Point::new(lng, lat);
            self.features.iter().position(|f| f.geometry.contains(&point))
        });
        if hit == self.hovered {
            return None;
        }
        self.hovered = hit;
        Some(match hit {
            Some(i) => HoverEvent {
                id: Some(self.features[i].id.clone()),
                properties: Some(self.features[i].properties.clone()),
            },
            None => HoverEvent {
                id: None,
                properties: None,
            },
        })
    }

    pub fn hovered(&self) -> Option<&BoundaryFeature> {
        self.hovered.map(|i| &self.features[i])
    }

    /// On-hover label: feature name plus the sentiment breakdown when the
    /// feature resolves.
    pub fn tooltip(&self, resolve: &dyn Fn(&str) -> Option<SentimentScore>) -> Option<String> {
        let f = self.hovered()?;
        Some(match resolve(&f.id) {
            Some(s) => format!(
                "{}  +{:.0}% ={:.0}% -{:.0}%",
                f.name, s.positive, s.neutral, s.negative
            ),
            None => format!("{}  (no data)", f.name),
        })
    }

    /// Draws every polygon outline in its sentiment tier color. The hovered
    /// feature is drawn last, on top of its neighbors, in a highlight
    /// style.
    pub fn render(
        &self,
        f: &mut Frame,
        area: Rect,
        title: &str,
        viewport: &Viewport,
        resolve: &dyn Fn(&str) -> Option<SentimentScore>,
    ) {
        let (x_bounds, y_bounds) = viewport.canvas_bounds();
        let canvas = Canvas::default()
            .block(Block::default().title(title.to_string()).borders(Borders::ALL))
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                for (i, feature) in self.features.iter().enumerate() {
                    if Some(i) == self.hovered {
                        continue;
                    }
                    let tier = Tier::from_score(resolve(&feature.id).as_ref());
                    draw_outline(ctx, &feature.geometry, tier.color());
                }
                if let Some(f) = self.hovered() {
                    draw_outline(ctx, &f.geometry, Color::White);
                }
            });
        f.render_widget(canvas, area);
    }
}

fn draw_outline(
    ctx: &mut ratatui::widgets::canvas::Context<'_>,
    mp: &MultiPolygon<f64>,
    color: Color,
) {
    for poly in &mp.0 {
        draw_ring(ctx, poly, color);
    }
}

fn draw_ring(ctx: &mut ratatui::widgets::canvas::Context<'_>, poly: &Polygon<f64>, color: Color) {
    let ring = &poly.exterior().0;
    for window in ring.windows(2) {
        let (a, b) = (window[0], window[1]);
        ctx.draw(&Line {
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            color,
        });
    }
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        ctx.draw(&Line {
            x1: last.x,
            y1: last.y,
            x2: first.x,
            y2: first.y,
            color,
        });
    }
}

fn multipolygon_bbox(mp: &MultiPolygon<f64>) -> [f64; 4] {
    let (mut min_x, mut min_y, mut max_x, mut max_y) =
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for poly in &mp.0 {
        for coord in poly
            .exterior()
            .0
            .iter()
            .chain(poly.interiors().iter().flat_map(|r| r.0.iter()))
        {
            min_x = min_x.min(coord.x);
            min_y = min_y.min(coord.y);
            max_x = max_x.max(coord.x);
            max_y = max_y.max(coord.y);
        }
    }
    [min_x, min_y, max_x, max_y]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BoundaryStore;

    fn district_layer() -> BoundaryLayer {
        let store = BoundaryStore::bundled().unwrap();
        BoundaryLayer::from_collection(store.district_boundaries())
    }

    #[test]
    fn id_extraction_walks_the_key_chain() {
        let mut props = JsonObject::new();
        props.insert("DISTRICT".into(), "Coimbatore".into());
        assert_eq!(feature_id(&props).as_deref(), Some("Coimbatore"));

        props.insert("code".into(), "TN04".into());
        assert_eq!(feature_id(&props).as_deref(), Some("TN04"));
        // Display name still prefers the human-readable key.
        assert_eq!(feature_display_name(&props).as_deref(), Some("Coimbatore"));

        let mut ac = JsonObject::new();
        ac.insert("AC_NAME".into(), "Sulur".into());
        assert_eq!(feature_id(&ac).as_deref(), Some("Sulur"));

        assert_eq!(feature_id(&JsonObject::new()), None);
    }

    #[test]
    fn builds_all_district_features() {
        let layer = district_layer();
        assert_eq!(layer.feature_count(), 10);
        // The Chennai feature carries an explicit code.
        assert!(layer.ids().any(|id| id == "TN01"));
        assert!(layer.ids().any(|id| id == "Coimbatore"));
    }

    #[test]
    fn hit_test_finds_the_containing_polygon() {
        let layer = district_layer();
        let hit = layer.hit_test(11.0168, 76.9558).unwrap();
        assert_eq!(hit.id, "Coimbatore");
        // Bay of Bengal.
        assert!(layer.hit_test(12.0, 85.0).is_none());
    }

    #[test]
    fn hover_reports_transitions_once() {
        let mut layer = district_layer();
        let enter = layer.update_hover(Some((11.0168, 76.9558))).unwrap();
        assert_eq!(enter.id.as_deref(), Some("Coimbatore"));
        assert!(enter.properties.is_some());

        // Same position again: no event.
        assert!(layer.update_hover(Some((11.0, 76.96))).is_none());

        let leave = layer.update_hover(None).unwrap();
        assert!(leave.id.is_none());
        assert!(leave.properties.is_none());
        assert!(layer.hovered().is_none());
    }

    #[test]
    fn bounds_cover_the_feature() {
        let layer = district_layer();
        let [min_lng, min_lat, max_lng, max_lat] = layer.bounds_of("Coimbatore").unwrap();
        assert!(min_lng < 76.9558 && 76.9558 < max_lng);
        assert!(min_lat < 11.0168 && 11.0168 < max_lat);
        assert!(layer.bounds_of("Narnia").is_none());
    }

    #[test]
    fn tooltip_shows_breakdown_or_no_data() {
        let mut layer = district_layer();
        layer.update_hover(Some((11.0168, 76.9558)));
        let resolve = |id: &str| {
            (id == "Coimbatore").then(|| SentimentScore::from_breakdown(61.0, 22.0, 17.0, 0.8))
        };
        let tip = layer.tooltip(&resolve).unwrap();
        assert!(tip.contains("Coimbatore"));
        assert!(tip.contains("61"));

        layer.update_hover(Some((10.787, 79.1378))); // Thanjavur
        assert!(layer.tooltip(&resolve).unwrap().contains("no data"));
    }
}
