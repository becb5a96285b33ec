use thiserror::Error;

/// Failures that can abort startup or the terminal session.
///
/// Data-coverage gaps (unknown feature ids, missing sentiment, empty booth
/// sets) are not errors anywhere in this crate; they fall back to "no data"
/// paths instead.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("terminal io: {0}")]
    Io(#[from] std::io::Error),

    #[error("boundary data: {0}")]
    Geojson(#[from] geojson::Error),

    #[error("registry data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bundled asset {0} is not a FeatureCollection")]
    NotACollection(&'static str),

    #[error("registry integrity: {0}")]
    Registry(String),
}
