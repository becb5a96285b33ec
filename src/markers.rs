//! Discrete point markers for polling booths, active only at the deepest
//! drill level. Markers are torn down and rebuilt whenever the booth list
//! changes identity; teardown is idempotent.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::canvas::Canvas;
use ratatui::widgets::{Block, Borders};

use crate::booths::PollingBooth;
use crate::config::{MARKER_FIT_MAX_ZOOM, MARKER_FIT_PADDING};
use crate::sentiment::Tier;
use crate::viewport::Viewport;

struct Marker {
    booth: PollingBooth,
    color: Color,
}

pub struct MarkerLayer {
    markers: Vec<Marker>,
    hovered: Option<usize>,
}

impl MarkerLayer {
    pub fn build(booths: &[PollingBooth]) -> Self {
        let markers = booths
            .iter()
            .map(|b| Marker {
                color: Tier::from_score(b.sentiment.as_ref()).marker_color(),
                booth: b.clone(),
            })
            .collect();
        Self {
            markers,
            hovered: None,
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Detaches every marker. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.markers.clear();
        self.hovered = None;
    }

    /// Fits the viewport to bound all markers, padded and zoom-capped.
    /// No-op when the layer is empty.
    pub fn fit_all(&self, viewport: &mut Viewport) {
        let mut it = self.markers.iter().map(|m| m.booth.location);
        let Some(first) = it.next() else { return };
        let mut bbox = [first.lng, first.lat, first.lng, first.lat];
        for loc in it {
            bbox[0] = bbox[0].min(loc.lng);
            bbox[1] = bbox[1].min(loc.lat);
            bbox[2] = bbox[2].max(loc.lng);
            bbox[3] = bbox[3].max(loc.lat);
        }
        viewport.fit_bounds(bbox, MARKER_FIT_PADDING, MARKER_FIT_MAX_ZOOM);
    }

    /// Nearest booth within `tolerance_deg` of the point.
    pub fn hit_test(&self, lat: f64, lng: f64, tolerance_deg: f64) -> Option<&PollingBooth> {
        self.markers
            .iter()
            .map(|m| {
                let d = ((m.booth.location.lat - lat).powi(2)
                    + (m.booth.location.lng - lng).powi(2))
                .sqrt();
                (m, d)
            })
            .filter(|(_, d)| *d <= tolerance_deg)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(m, _)| &m.booth)
    }

    /// Moves hover to the booth under the cursor; returns the hovered booth.
    pub fn update_hover(&mut self, pos: Option<(f64, f64)>, tolerance_deg: f64) -> Option<&PollingBooth> {
        self.hovered = pos.and_then(|(lat, lng)| {
            let hit = self.hit_test(lat, lng, tolerance_deg)?;
            self.markers.iter().position(|m| m.booth.id == hit.id)
        });
        self.hovered.map(|i| &self.markers[i].booth)
    }

    /// Popup body for a booth marker.
    pub fn popup_text(booth: &PollingBooth) -> String {
        let sentiment = match &booth.sentiment {
            Some(s) => format!(
                "+{:.0}% ={:.0}% -{:.0}%",
                s.positive, s.neutral, s.negative
            ),
            None => "no data".to_string(),
        };
        format!(
            "{}\nBooth #{} — {} voters\n{}\nSentiment: {}",
            booth.name, booth.booth_number, booth.total_voters, booth.address, sentiment
        )
    }

    pub fn render(&self, f: &mut Frame, area: Rect, title: &str, viewport: &Viewport) {
        let (x_bounds, y_bounds) = viewport.canvas_bounds();
        let canvas = Canvas::default()
            .block(Block::default().title(title.to_string()).borders(Borders::ALL))
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                for (i, m) in self.markers.iter().enumerate() {
                    let style = if Some(i) == self.hovered {
                        Style::default().fg(Color::White).bg(m.color)
                    } else {
                        Style::default().fg(m.color)
                    };
                    ctx.print(
                        m.booth.location.lng,
                        m.booth.location.lat,
                        Span::styled("⬤", style),
                    );
                }
                if let Some(i) = self.hovered {
                    let m = &self.markers[i];
                    ctx.print(
                        m.booth.location.lng,
                        m.booth.location.lat + viewport.lat_span() / 30.0,
                        Span::styled(m.booth.name.clone(), Style::default().fg(Color::White)),
                    );
                }
            });
        f.render_widget(canvas, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booths::{BoothGenConfig, booths_for};
    use crate::registry::GeographicRegistry;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn layer() -> MarkerLayer {
        let reg = GeographicRegistry::bundled().unwrap();
        let booths = booths_for(
            "TN044",
            &reg,
            &BoothGenConfig::default(),
            &mut StdRng::seed_from_u64(3),
        );
        MarkerLayer::build(&booths)
    }

    #[test]
    fn builds_one_marker_per_booth() {
        assert_eq!(layer().len(), 4);
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut l = layer();
        l.clear();
        l.clear();
        assert_eq!(l.len(), 0);
        assert!(l.update_hover(Some((11.06, 76.94)), 1.0).is_none());
    }

    #[test]
    fn fit_all_bounds_every_marker() {
        let l = layer();
        let mut vp = Viewport::new((0.0, 0.0), 2.0);
        l.fit_all(&mut vp);
        let ([x_min, x_max], [y_min, y_max]) = vp.canvas_bounds();
        let reg = GeographicRegistry::bundled().unwrap();
        for b in reg.sample_booths_for("TN044") {
            assert!(x_min <= b.location.lng && b.location.lng <= x_max);
            assert!(y_min <= b.location.lat && b.location.lat <= y_max);
        }
        assert!(vp.zoom() <= MARKER_FIT_MAX_ZOOM);
    }

    #[test]
    fn fit_all_on_empty_layer_is_a_noop() {
        let mut l = layer();
        l.clear();
        let mut vp = Viewport::new((11.0, 78.0), 6.0);
        l.fit_all(&mut vp);
        assert_eq!(vp.center(), (11.0, 78.0));
        assert_eq!(vp.zoom(), 6.0);
    }

    #[test]
    fn hit_test_respects_tolerance() {
        let l = layer();
        // PB-TN044-001 sits at (11.0655, 76.9402).
        let hit = l.hit_test(11.0654, 76.9401, 0.001).unwrap();
        assert_eq!(hit.id, "PB-TN044-001");
        assert!(l.hit_test(11.5, 76.94, 0.001).is_none());
    }

    #[test]
    fn popup_text_carries_booth_details() {
        let l = layer();
        let booth = l.hit_test(11.0655, 76.9402, 0.001).unwrap();
        let text = MarkerLayer::popup_text(booth);
        assert!(text.contains("Booth #1"));
        assert!(text.contains("1180 voters"));
    }
}
