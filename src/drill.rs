//! Drill-down controller: the four-level navigation state machine that owns
//! the active dataset and the map camera.
//!
//! Polygon and marker rendering are mutually exclusive: the active layer is
//! either a boundary layer or a booth marker layer, never both. Only this
//! controller mutates the drill state, the viewport, or the dataset.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::booths::{BoothGenConfig, booths_for};
use crate::boundary::BoundaryLayer;
use crate::config::{
    BOOTH_ZOOM, CLICK_FIT_MAX_ZOOM, CLICK_FIT_PADDING, CONSTITUENCY_ZOOM, DISTRICT_ZOOM,
    STATE_ZOOM,
};
use crate::data::BoundaryStore;
use crate::markers::MarkerLayer;
use crate::registry::GeographicRegistry;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillLevel {
    State,
    District,
    Constituency,
    Booth,
}

impl DrillLevel {
    pub fn depth(self) -> u8 {
        match self {
            DrillLevel::State => 0,
            DrillLevel::District => 1,
            DrillLevel::Constituency => 2,
            DrillLevel::Booth => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DrillLevel::State => "State",
            DrillLevel::District => "District",
            DrillLevel::Constituency => "Constituency",
            DrillLevel::Booth => "Booths",
        }
    }
}

/// Where the user currently is. The single source of truth for the active
/// dataset and viewport.
#[derive(Debug, Clone)]
pub struct DrillState {
    pub level: DrillLevel,
    pub selected_state_code: Option<String>,
    pub selected_district_code: Option<String>,
    pub selected_constituency_code: Option<String>,
}

impl DrillState {
    /// `selected_district_code` only at district depth or deeper;
    /// `selected_constituency_code` only at constituency depth or deeper.
    pub fn invariant_holds(&self) -> bool {
        let d = self.level.depth();
        (self.selected_district_code.is_some() == (d >= 1))
            && (self.selected_constituency_code.is_some() == (d >= 2))
    }
}

/// What a click resolved to, for the detail popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    District(String),
    Constituency(String),
}

pub enum ActiveLayer {
    Boundaries(BoundaryLayer),
    Booths(MarkerLayer),
}

pub struct DrillDownController<'a> {
    registry: &'a GeographicRegistry,
    store: &'a BoundaryStore,
    gen_config: BoothGenConfig,
    rng: StdRng,
    state: DrillState,
    layer: ActiveLayer,
    viewport: Viewport,
    /// Center/zoom of the root view, restored on a "state" breadcrumb jump.
    home: ((f64, f64), f64),
}

impl<'a> DrillDownController<'a> {
    pub fn new(registry: &'a GeographicRegistry, store: &'a BoundaryStore) -> Self {
        let state = registry.default_state();
        let center = state.map(|s| s.center.tuple()).unwrap_or((0.0, 0.0));
        let code = state.map(|s| s.code.clone());
        Self {
            registry,
            store,
            gen_config: BoothGenConfig::default(),
            rng: StdRng::from_os_rng(),
            state: DrillState {
                level: DrillLevel::State,
                selected_state_code: code,
                selected_district_code: None,
                selected_constituency_code: None,
            },
            layer: ActiveLayer::Boundaries(BoundaryLayer::from_collection(
                store.district_boundaries(),
            )),
            viewport: Viewport::new(center, STATE_ZOOM),
            home: (center, STATE_ZOOM),
        }
    }

    /// Deterministic booth generation for tests and demos.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> &DrillState {
        &self.state
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn active_layer(&self) -> &ActiveLayer {
        &self.layer
    }

    pub fn boundaries(&self) -> Option<&BoundaryLayer> {
        match &self.layer {
            ActiveLayer::Boundaries(b) => Some(b),
            ActiveLayer::Booths(_) => None,
        }
    }

    pub fn boundaries_mut(&mut self) -> Option<&mut BoundaryLayer> {
        match &mut self.layer {
            ActiveLayer::Boundaries(b) => Some(b),
            ActiveLayer::Booths(_) => None,
        }
    }

    pub fn markers(&self) -> Option<&MarkerLayer> {
        match &self.layer {
            ActiveLayer::Booths(m) => Some(m),
            ActiveLayer::Boundaries(_) => None,
        }
    }

    pub fn markers_mut(&mut self) -> Option<&mut MarkerLayer> {
        match &mut self.layer {
            ActiveLayer::Booths(m) => Some(m),
            ActiveLayer::Boundaries(_) => None,
        }
    }

    /// Advances any in-flight camera animation; called once per event-loop
    /// tick.
    pub fn tick(&mut self) {
        self.viewport.step();
    }

    /// Ancestor levels down to the current one, with display labels, for
    /// the breadcrumb bar.
    pub fn breadcrumbs(&self) -> Vec<(DrillLevel, String)> {
        let mut path = Vec::new();
        let state_name = self
            .state
            .selected_state_code
            .as_deref()
            .and_then(|c| self.registry.state(c))
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "State".to_string());
        path.push((DrillLevel::State, state_name));
        if let Some(d) = self
            .state
            .selected_district_code
            .as_deref()
            .and_then(|c| self.registry.district(c))
        {
            path.push((DrillLevel::District, d.name.clone()));
        }
        if let Some(c) = self
            .state
            .selected_constituency_code
            .as_deref()
            .and_then(|c| self.registry.constituency(c))
        {
            path.push((DrillLevel::Constituency, c.name.clone()));
        }
        if self.state.level == DrillLevel::Booth {
            path.push((DrillLevel::Booth, "Polling booths".to_string()));
        }
        path
    }

    /// Handles a click reported by the boundary layer.
    ///
    /// The click first drives the state machine (which may start an
    /// animated recenter), then the camera is fitted to the clicked
    /// feature's bounds unconditionally — the fit is the renderer's
    /// contract and happens even when the feature resolves to nothing. An
    /// in-flight fly-to keeps its target, so a successful transition still
    /// lands on its own center/zoom.
    pub fn handle_feature_click(&mut self, feature_id: &str) -> Option<Selection> {
        let bounds = self.boundaries().and_then(|b| b.bounds_of(feature_id));
        let selection = match self.state.level {
            DrillLevel::State => self
                .resolve_district(feature_id)
                .and_then(|code| self.drill_into_district(&code).then_some(Selection::District(code))),
            DrillLevel::District => self.resolve_constituency(feature_id).and_then(|code| {
                self.select_constituency(&code)
                    .then_some(Selection::Constituency(code))
            }),
            DrillLevel::Constituency => self.resolve_constituency(feature_id).and_then(|code| {
                if self.state.selected_constituency_code.as_deref() == Some(code.as_str()) {
                    // Clicking the already-selected constituency drills to
                    // its booths.
                    self.drill_into_booths(&code)
                        .then_some(Selection::Constituency(code))
                } else {
                    self.select_constituency(&code)
                        .then_some(Selection::Constituency(code))
                }
            }),
            // Terminal level; marker clicks are handled by the marker layer.
            DrillLevel::Booth => None,
        };
        if let Some(bbox) = bounds {
            self.viewport
                .fit_bounds(bbox, CLICK_FIT_PADDING, CLICK_FIT_MAX_ZOOM);
        }
        selection
    }

    fn resolve_district(&self, feature_id: &str) -> Option<String> {
        self.registry
            .district(feature_id)
            .or_else(|| self.registry.district_by_name(feature_id))
            .map(|d| d.code.clone())
    }

    fn resolve_constituency(&self, feature_id: &str) -> Option<String> {
        self.registry
            .constituency(feature_id)
            .or_else(|| self.registry.constituency_by_name(feature_id))
            .map(|c| c.code.clone())
    }

    /// State → District: load the constituency subset for the district and
    /// recenter on its registry center.
    pub fn drill_into_district(&mut self, code: &str) -> bool {
        let Some(district) = self.registry.district(code) else {
            return false;
        };
        let (center, name) = (district.center.tuple(), district.name.clone());
        self.state.level = DrillLevel::District;
        self.state.selected_district_code = Some(code.to_string());
        self.state.selected_constituency_code = None;
        self.layer = ActiveLayer::Boundaries(BoundaryLayer::from_collection(
            &self.store.constituency_subset(&name),
        ));
        log::debug!("drilled into district {code} ({name})");
        self.fly_or_jump(center, DISTRICT_ZOOM);
        true
    }

    /// District/Constituency → Constituency: select a constituency and
    /// recenter deeper. The displayed polygons stay at constituency
    /// granularity.
    pub fn select_constituency(&mut self, code: &str) -> bool {
        let Some(constituency) = self.registry.constituency(code) else {
            return false;
        };
        let center = constituency.center.tuple();
        // A constituency clicked from the district view may belong to a
        // different district than the remembered one only if the subset
        // filter was lenient; trust the registry's parent linkage.
        self.state.selected_district_code = Some(constituency.district_code.clone());
        self.state.level = DrillLevel::Constituency;
        self.state.selected_constituency_code = Some(code.to_string());
        self.fly_or_jump(center, CONSTITUENCY_ZOOM);
        true
    }

    /// Constituency → Booth: polygons are cleared entirely (booths are
    /// points) and the booth set is loaded or synthesized, so the view is
    /// never empty.
    pub fn drill_into_booths(&mut self, code: &str) -> bool {
        if self.state.level == DrillLevel::Booth {
            return false;
        }
        let constituency = self.registry.constituency(code);
        let center = constituency
            .map(|c| c.center.tuple())
            .unwrap_or(self.home.0);
        if let Some(c) = constituency {
            self.state.selected_district_code = Some(c.district_code.clone());
        } else if self.state.selected_district_code.is_none() {
            return false;
        }
        let booths = booths_for(code, self.registry, &self.gen_config, &mut self.rng);
        log::debug!("loaded {} booths for {code}", booths.len());
        let markers = MarkerLayer::build(&booths);
        self.state.level = DrillLevel::Booth;
        self.state.selected_constituency_code = Some(code.to_string());
        self.fly_or_jump(center, BOOTH_ZOOM);
        // The marker layer fits the camera to its markers on mount; the
        // animated recenter above still lands on the booth-level target.
        markers.fit_all(&mut self.viewport);
        self.layer = ActiveLayer::Booths(markers);
        true
    }

    /// Breadcrumb navigation to an ancestor level. Jumping to the current
    /// or a deeper level is a no-op.
    pub fn jump_to_level(&mut self, target: DrillLevel) -> bool {
        if target.depth() >= self.state.level.depth() {
            return false;
        }
        // Leaving the booth level discards the booth set entirely.
        if let ActiveLayer::Booths(markers) = &mut self.layer {
            markers.clear();
        }
        match target {
            DrillLevel::State => {
                self.state.level = DrillLevel::State;
                self.state.selected_district_code = None;
                self.state.selected_constituency_code = None;
                self.layer = ActiveLayer::Boundaries(BoundaryLayer::from_collection(
                    self.store.district_boundaries(),
                ));
                let (center, zoom) = self.home;
                self.fly_or_jump(center, zoom);
                true
            }
            DrillLevel::District => {
                let Some(district) = self
                    .state
                    .selected_district_code
                    .as_deref()
                    .and_then(|c| self.registry.district(c))
                else {
                    return false;
                };
                let (center, name) = (district.center.tuple(), district.name.clone());
                self.state.level = DrillLevel::District;
                self.state.selected_constituency_code = None;
                self.layer = ActiveLayer::Boundaries(BoundaryLayer::from_collection(
                    &self.store.constituency_subset(&name),
                ));
                self.fly_or_jump(center, DISTRICT_ZOOM);
                true
            }
            DrillLevel::Constituency => {
                let Some(constituency) = self
                    .state
                    .selected_constituency_code
                    .as_deref()
                    .and_then(|c| self.registry.constituency(c))
                else {
                    return false;
                };
                let center = constituency.center.tuple();
                // Re-filter the subset keyed off the remembered district.
                let Some(district) = self
                    .state
                    .selected_district_code
                    .as_deref()
                    .and_then(|c| self.registry.district(c))
                else {
                    return false;
                };
                let name = district.name.clone();
                self.state.level = DrillLevel::Constituency;
                self.layer = ActiveLayer::Boundaries(BoundaryLayer::from_collection(
                    &self.store.constituency_subset(&name),
                ));
                self.fly_or_jump(center, CONSTITUENCY_ZOOM);
                true
            }
            DrillLevel::Booth => false,
        }
    }

    /// Animated recenter with an instantaneous fallback when the animation
    /// is rejected.
    fn fly_or_jump(&mut self, center: (f64, f64), zoom: f64) {
        if let Err(err) = self.viewport.fly_to(center, zoom) {
            log::warn!("viewport fly-to failed ({err}); moving instantly");
            self.viewport.jump_to(center, zoom);
        }
    }
}
