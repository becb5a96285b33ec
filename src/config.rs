//! Fixed presets for the map camera and booth generation.

/// Zoom presets per drill level. Zoom n shows a longitude span of 360/2^n
/// degrees, so higher is closer.
pub const STATE_ZOOM: f64 = 6.0;
pub const DISTRICT_ZOOM: f64 = 9.0;
pub const CONSTITUENCY_ZOOM: f64 = 10.5;
pub const BOOTH_ZOOM: f64 = 12.0;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 14.0;

/// Terminal cells are taller than wide; the canvas shows a latitude span of
/// `lon_span * CANVAS_ASPECT`.
pub const CANVAS_ASPECT: f64 = 0.75;

/// Frames a fly-to transition is spread over (the event loop ticks at
/// ~100ms, so this is about a second).
pub const FLY_FRAMES: u32 = 12;

/// Fit-bounds applied after a polygon click: fractional padding around the
/// feature bbox and the zoom-in cap.
pub const CLICK_FIT_PADDING: f64 = 0.15;
pub const CLICK_FIT_MAX_ZOOM: f64 = 11.0;

/// Fit-bounds applied when the booth marker layer mounts.
pub const MARKER_FIT_PADDING: f64 = 0.2;
pub const MARKER_FIT_MAX_ZOOM: f64 = 13.0;

/// Booth generation: count used when neither samples nor a registry booth
/// count exist, and the lat/lng jitter around the approximate center.
pub const DEFAULT_BOOTH_COUNT: usize = 5;
pub const BOOTH_JITTER_DEG: f64 = 0.02;

/// Margin (in percentage points) by which positive or negative must lead
/// before a generated score is summarized as anything but neutral.
pub const LEANING_MARGIN: f64 = 10.0;
