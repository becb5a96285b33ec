//! Map camera: a center/zoom pair plus the arithmetic that turns it into
//! canvas bounds and back into geographic coordinates for mouse hits.
//!
//! Zoom n corresponds to a visible longitude span of 360/2^n degrees; the
//! latitude span is scaled by [`CANVAS_ASPECT`] to compensate for terminal
//! cell shape.

use ratatui::layout::Rect;
use thiserror::Error;

use crate::config::{CANVAS_ASPECT, FLY_FRAMES, MAX_ZOOM, MIN_ZOOM};

#[derive(Error, Debug)]
pub enum ViewportError {
    #[error("fly-to target out of range: lat {lat}, lng {lng}, zoom {zoom}")]
    OutOfRange { lat: f64, lng: f64, zoom: f64 },
}

#[derive(Debug, Clone, Copy)]
struct Anim {
    target_center: (f64, f64),
    target_zoom: f64,
    frames_left: u32,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    /// (lat, lng)
    center: (f64, f64),
    zoom: f64,
    anim: Option<Anim>,
}

impl Viewport {
    pub fn new(center: (f64, f64), zoom: f64) -> Self {
        Self {
            center: clamp_center(center),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            anim: None,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Instantaneous move. Never fails: out-of-range targets are clamped,
    /// non-finite ones ignored. Cancels any in-flight fly-to.
    pub fn jump_to(&mut self, center: (f64, f64), zoom: f64) {
        self.anim = None;
        if center.0.is_finite() && center.1.is_finite() {
            self.center = clamp_center(center);
        }
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Animated move, interpolated over the next [`FLY_FRAMES`] ticks.
    /// Rejects unusable targets so the caller can fall back to a plain
    /// jump.
    pub fn fly_to(&mut self, center: (f64, f64), zoom: f64) -> Result<(), ViewportError> {
        let (lat, lng) = center;
        let valid = lat.is_finite()
            && lng.is_finite()
            && zoom.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng)
            && (MIN_ZOOM..=MAX_ZOOM).contains(&zoom);
        if !valid {
            return Err(ViewportError::OutOfRange { lat, lng, zoom });
        }
        self.anim = Some(Anim {
            target_center: center,
            target_zoom: zoom,
            frames_left: FLY_FRAMES,
        });
        Ok(())
    }

    /// Advances an in-flight animation by one tick.
    pub fn step(&mut self) {
        let Some(anim) = self.anim else { return };
        let t = 1.0 / anim.frames_left as f64;
        self.center = (
            lerp(self.center.0, anim.target_center.0, t),
            lerp(self.center.1, anim.target_center.1, t),
        );
        self.zoom = lerp(self.zoom, anim.target_zoom, t);
        if anim.frames_left <= 1 {
            self.center = anim.target_center;
            self.zoom = anim.target_zoom;
            self.anim = None;
        } else {
            self.anim = Some(Anim {
                frames_left: anim.frames_left - 1,
                ..anim
            });
        }
    }

    pub fn is_animating(&self) -> bool {
        self.anim.is_some()
    }

    /// Runs any in-flight animation to completion.
    pub fn settle(&mut self) {
        while self.is_animating() {
            self.step();
        }
    }

    /// Fits the camera to a `[min_lng, min_lat, max_lng, max_lat]` box with
    /// fractional padding, never zooming in past `max_zoom`.
    ///
    /// The move is applied instantly, but an in-flight fly-to keeps its
    /// target: the animated transition wins on subsequent ticks.
    pub fn fit_bounds(&mut self, bbox: [f64; 4], padding: f64, max_zoom: f64) {
        let [min_lng, min_lat, max_lng, max_lat] = bbox;
        if !bbox.iter().all(|v| v.is_finite()) || min_lng > max_lng || min_lat > max_lat {
            return;
        }
        let pad = 1.0 + 2.0 * padding;
        let lng_span = ((max_lng - min_lng) * pad).max(1e-4);
        let lat_span = ((max_lat - min_lat) * pad / CANVAS_ASPECT).max(1e-4);
        let span = lng_span.max(lat_span);
        let zoom = (360.0 / span).log2().clamp(MIN_ZOOM, max_zoom.min(MAX_ZOOM));
        self.center = clamp_center(((min_lat + max_lat) / 2.0, (min_lng + max_lng) / 2.0));
        self.zoom = zoom;
    }

    pub fn lon_span(&self) -> f64 {
        360.0 / 2f64.powf(self.zoom)
    }

    pub fn lat_span(&self) -> f64 {
        self.lon_span() * CANVAS_ASPECT
    }

    /// Canvas bounds as ([x_min, x_max], [y_min, y_max]) in lng/lat.
    pub fn canvas_bounds(&self) -> ([f64; 2], [f64; 2]) {
        let (lat, lng) = self.center;
        let half_x = self.lon_span() / 2.0;
        let half_y = self.lat_span() / 2.0;
        ([lng - half_x, lng + half_x], [lat - half_y, lat + half_y])
    }

    /// Maps a terminal cell inside `area` to (lat, lng); `None` when the
    /// cell lies outside the area.
    pub fn cell_to_lat_lng(&self, area: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
        if !area.contains(ratatui::layout::Position::new(column, row))
            || area.width == 0
            || area.height == 0
        {
            return None;
        }
        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        let ([x_min, x_max], [y_min, y_max]) = self.canvas_bounds();
        let lng = x_min + fx * (x_max - x_min);
        let lat = y_max - fy * (y_max - y_min);
        Some((lat, lng))
    }
}

fn clamp_center((lat, lng): (f64, f64)) -> (f64, f64) {
    (lat.clamp(-90.0, 90.0), lng.clamp(-180.0, 180.0))
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
