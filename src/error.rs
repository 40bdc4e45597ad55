use thiserror::Error;

/// Failure to fetch or parse one of the startup datasets.
///
/// Never fatal: the caller logs it and continues with an empty store.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {url}: {message}")]
    Http { url: String, message: String },

    #[error("Failed to parse {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Boundary data must be a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    #[error("Region '{region}' has a ring with {points} positions (need at least 3)")]
    InvalidGeometry { region: String, points: usize },
}

/// A coordinate that falls inside no known region.
///
/// This is a normal negative result, surfaced to the user as a notice.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("No region contains ({lat}, {lng})")]
pub struct ResolutionMiss {
    pub lat: f64,
    pub lng: f64,
}

/// Errors from the geocoding collaborator.
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("Geocoding request failed: {0}")]
    HttpError(String),

    #[error("Failed to parse geocoding response: {0}")]
    JsonError(String),

    #[error("No geocoding API key configured")]
    MissingApiKey,
}
