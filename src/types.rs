use geo::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub geometry: RegionGeometry,
}

/// Boundary geometry as found in the source. Holes are kept for rendering
/// but never take part in containment.
#[derive(Debug, Clone)]
pub enum RegionGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

/// One entry of the assembly dataset (`{ "states": [...] }`).
#[derive(Debug, Clone, Deserialize)]
pub struct RegionMetadata {
    pub name: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub members: u32,
    // Comma separated legacy province names
    #[serde(default, rename = "oldName")]
    pub old_name: String,
}

/// One entry of the delegate roster (`{ "members": [...] }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegate {
    pub name: String,
    pub province: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Where a coordinate-driven selection came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
}
