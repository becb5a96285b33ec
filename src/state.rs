use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use geojson::JsonObject;
use ratatui::layout::Rect;

use crate::data::BoundaryStore;
use crate::drill::{DrillDownController, DrillLevel, Selection};
use crate::error::MapError;
use crate::markers::MarkerLayer;
use crate::registry::GeographicRegistry;
use crate::sentiment::{SentimentResolver, SentimentScore};

/// Action offered by the detail popup. Present only when the selection can
/// be drilled further.
#[derive(Debug, Clone)]
pub enum DrillAction {
    District(String),
    Constituency(String),
}

/// Modal information overlay. Closing it never changes drill level or
/// viewport; navigation happens only through its explicit action.
pub enum DetailPopup {
    Region {
        title: String,
        score: Option<SentimentScore>,
        total_voters: u64,
        polling_booths: Option<usize>,
        area_sq_km: Option<f64>,
        action: Option<DrillAction>,
        opened_tick: u64,
    },
    Booth {
        title: String,
        body: String,
    },
}

pub struct AppState<'a> {
    pub registry: &'a GeographicRegistry,
    pub controller: DrillDownController<'a>,
    pub popup: Option<DetailPopup>,
    /// Last hover callback payload from the active layer.
    pub hovered: Option<(String, JsonObject)>,
    pub tooltip: Option<String>,
    /// Inner map canvas area, recorded by the last draw for mouse mapping.
    pub map_area: Rect,
    /// Breadcrumb segment hitboxes from the last draw: (row, col range).
    pub crumb_row: u16,
    pub crumb_hits: Vec<(std::ops::Range<u16>, DrillLevel)>,
    pub ticks: u64,
}

impl<'a> AppState<'a> {
    pub fn new(
        registry: &'a GeographicRegistry,
        store: &'a BoundaryStore,
    ) -> Result<Self, MapError> {
        Ok(Self {
            registry,
            controller: DrillDownController::new(registry, store),
            popup: None,
            hovered: None,
            tooltip: None,
            map_area: Rect::default(),
            crumb_row: 0,
            crumb_hits: Vec::new(),
            ticks: 0,
        })
    }

    /// One event-loop tick: advances camera animation and popup bars.
    pub fn tick(&mut self) {
        self.ticks += 1;
        self.controller.tick();
    }

    /// Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.popup.take().is_none() {
                    self.jump_back();
                }
            }
            KeyCode::Backspace => self.jump_back(),
            KeyCode::Enter => self.run_popup_action(),
            KeyCode::Char('1') => {
                self.jump(DrillLevel::State);
            }
            KeyCode::Char('2') => {
                self.jump(DrillLevel::District);
            }
            KeyCode::Char('3') => {
                self.jump(DrillLevel::Constituency);
            }
            _ => {}
        }
        false
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Moved => self.handle_hover(event.column, event.row),
            MouseEventKind::Down(MouseButton::Left) => self.handle_click(event.column, event.row),
            _ => {}
        }
    }

    fn cursor_lat_lng(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        self.controller
            .viewport()
            .cell_to_lat_lng(self.map_area, column, row)
    }

    fn handle_hover(&mut self, column: u16, row: u16) {
        if self.popup.is_some() {
            return;
        }
        let pos = self.cursor_lat_lng(column, row);
        let registry = self.registry;
        let resolve = move |id: &str| SentimentResolver::new(registry).resolve(id).cloned();

        if let Some(layer) = self.controller.boundaries_mut() {
            if let Some(event) = layer.update_hover(pos) {
                self.hovered = event.id.zip(event.properties);
            }
            self.tooltip = self
                .controller
                .boundaries()
                .and_then(|l| l.tooltip(&resolve));
        } else {
            let tolerance = self.controller.viewport().lon_span() / 40.0;
            if let Some(layer) = self.controller.markers_mut() {
                self.tooltip = layer
                    .update_hover(pos, tolerance)
                    .map(|b| format!("{} (booth #{})", b.name, b.booth_number));
            }
            self.hovered = None;
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) {
        if self.popup.take().is_some() {
            // First click dismisses the overlay, nothing else.
            return;
        }
        if row == self.crumb_row {
            let target = self
                .crumb_hits
                .iter()
                .find(|(range, _)| range.contains(&column))
                .map(|(_, level)| *level);
            if let Some(level) = target {
                self.jump(level);
            }
            return;
        }
        let Some((lat, lng)) = self.cursor_lat_lng(column, row) else {
            return;
        };

        if self.controller.boundaries().is_some() {
            let hit = self
                .controller
                .boundaries()
                .and_then(|l| l.hit_test(lat, lng))
                .map(|f| f.id.clone());
            if let Some(id) = hit {
                let selection = self.controller.handle_feature_click(&id);
                self.popup = selection.and_then(|s| self.region_popup(s));
            }
        } else if let Some(layer) = self.controller.markers() {
            let tolerance = self.controller.viewport().lon_span() / 40.0;
            if let Some(booth) = layer.hit_test(lat, lng, tolerance) {
                self.popup = Some(DetailPopup::Booth {
                    title: booth.name.clone(),
                    body: MarkerLayer::popup_text(booth),
                });
            }
        }
    }

    fn region_popup(&self, selection: Selection) -> Option<DetailPopup> {
        let at_booth_level = self.controller.state().level == DrillLevel::Booth;
        match selection {
            Selection::District(code) => {
                let d = self.registry.district(&code)?;
                Some(DetailPopup::Region {
                    title: format!("{} ({})", d.name, d.code),
                    score: d.sentiment.clone(),
                    total_voters: d.total_voters,
                    polling_booths: None,
                    area_sq_km: Some(d.area_sq_km),
                    action: Some(DrillAction::District(code)),
                    opened_tick: self.ticks,
                })
            }
            Selection::Constituency(code) => {
                let c = self.registry.constituency(&code)?;
                Some(DetailPopup::Region {
                    title: format!("{} ({})", c.name, c.code),
                    score: c.sentiment.clone(),
                    total_voters: c.total_voters,
                    polling_booths: Some(c.polling_booths),
                    area_sq_km: None,
                    action: (!at_booth_level).then_some(DrillAction::Constituency(code)),
                    opened_tick: self.ticks,
                })
            }
        }
    }

    fn run_popup_action(&mut self) {
        let action = match self.popup.take() {
            Some(DetailPopup::Region { action: Some(a), .. }) => a,
            _ => return,
        };
        match action {
            DrillAction::District(code) => {
                self.controller.drill_into_district(&code);
            }
            DrillAction::Constituency(code) => {
                self.controller.drill_into_booths(&code);
            }
        }
        self.tooltip = None;
        self.hovered = None;
    }

    fn jump_back(&mut self) {
        let parent = match self.controller.state().level {
            DrillLevel::State => return,
            DrillLevel::District => DrillLevel::State,
            DrillLevel::Constituency => DrillLevel::District,
            DrillLevel::Booth => DrillLevel::Constituency,
        };
        self.jump(parent);
    }

    fn jump(&mut self, level: DrillLevel) {
        if self.controller.jump_to_level(level) {
            self.tooltip = None;
            self.hovered = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (GeographicRegistry, BoundaryStore) {
        (
            GeographicRegistry::bundled().unwrap(),
            BoundaryStore::bundled().unwrap(),
        )
    }

    #[test]
    fn escape_closes_the_popup_without_navigating() {
        let (reg, store) = fixtures();
        let mut app = AppState::new(&reg, &store).unwrap();
        app.controller.handle_feature_click("Coimbatore");
        app.popup = app.region_popup(Selection::District("TN04".into()));
        assert!(app.popup.is_some());
        let level = app.controller.state().level;
        let center = app.controller.viewport().center();

        app.handle_key(KeyCode::Esc);
        assert!(app.popup.is_none());
        assert_eq!(app.controller.state().level, level);
        assert_eq!(app.controller.viewport().center(), center);
    }

    #[test]
    fn popup_action_is_disabled_at_booth_level() {
        let (reg, store) = fixtures();
        let mut app = AppState::new(&reg, &store).unwrap();
        app.controller.handle_feature_click("Coimbatore");
        app.controller.handle_feature_click("Kavundampalayam");
        app.controller.handle_feature_click("Kavundampalayam");
        assert_eq!(app.controller.state().level, DrillLevel::Booth);

        let popup = app
            .region_popup(Selection::Constituency("TN044".into()))
            .unwrap();
        match popup {
            DetailPopup::Region { action, .. } => assert!(action.is_none()),
            DetailPopup::Booth { .. } => panic!("expected a region popup"),
        }
    }

    #[test]
    fn popup_drill_action_loads_booths() {
        let (reg, store) = fixtures();
        let mut app = AppState::new(&reg, &store).unwrap();
        app.controller.handle_feature_click("Coimbatore");
        app.controller.handle_feature_click("Kavundampalayam");
        app.popup = app.region_popup(Selection::Constituency("TN044".into()));

        app.handle_key(KeyCode::Enter);
        assert!(app.popup.is_none());
        assert_eq!(app.controller.state().level, DrillLevel::Booth);
        assert_eq!(app.controller.markers().unwrap().len(), 4);
    }

    #[test]
    fn backspace_walks_up_one_level() {
        let (reg, store) = fixtures();
        let mut app = AppState::new(&reg, &store).unwrap();
        app.controller.handle_feature_click("Coimbatore");
        app.handle_key(KeyCode::Backspace);
        assert_eq!(app.controller.state().level, DrillLevel::State);
        // At the root there is nowhere shallower to go.
        app.handle_key(KeyCode::Backspace);
        assert_eq!(app.controller.state().level, DrillLevel::State);
    }

    #[test]
    fn quit_key_exits() {
        let (reg, store) = fixtures();
        let mut app = AppState::new(&reg, &store).unwrap();
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(!app.handle_key(KeyCode::Char('x')));
    }
}
