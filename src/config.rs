use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

const DEFAULT_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/udit-001/india-maps-data/main/geojson/india.geojson";
const DEFAULT_GEOCODER_ENDPOINT: &str = "https://api.geoapify.com/v1/geocode/autocomplete";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

/// A dataset location: a local path, or an http(s) URL fetched at startup.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(from = "String")]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl From<String> for DataSource {
    fn from(value: String) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            DataSource::Url(value)
        } else {
            DataSource::File(PathBuf::from(value))
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => write!(f, "{}", url),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub boundaries: DataSource,
    // Property keys tried in order for the region name
    pub name_properties: Vec<String>,
    pub assembly: DataSource,
    pub members: DataSource,
    // Deadline for each dataset fetched over HTTP
    pub timeout_secs: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            boundaries: DataSource::Url(DEFAULT_BOUNDARIES_URL.to_string()),
            name_properties: vec!["name".to_string(), "st_nm".to_string()],
            assembly: DataSource::File(PathBuf::from("data/assembly.json")),
            members: DataSource::File(PathBuf::from("data/members.json")),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub country_codes: Vec<String>,
    pub limit: u32,
    pub timeout_secs: u64,
    pub debounce_ms: u64,
    pub min_query_chars: usize,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            api_key: None,
            country_codes: vec!["in".to_string()],
            limit: 10,
            timeout_secs: 10,
            debounce_ms: 300,
            min_query_chars: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            static_dir: PathBuf::from("web"),
        }
    }
}

/// Map view parameters handed to the front-end.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ViewConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Zoom used when centering on a searched or clicked location.
    pub location_zoom: u8,
    /// Padding in pixels when fitting the map to a selected region.
    pub fit_padding: u32,
    pub tile_url: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center_lat: 20.5937,
            center_lng: 78.9629,
            zoom: 5,
            min_zoom: 4,
            max_zoom: 19,
            location_zoom: 8,
            fit_padding: 50,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.view.location_zoom, 8);
        assert_eq!(config.geocoder.debounce_ms, 300);
        assert_eq!(config.input.name_properties, vec!["name", "st_nm"]);
        assert!(matches!(config.input.boundaries, DataSource::Url(_)));
        assert_eq!(config.input.timeout_secs, 30);
    }

    #[test]
    fn test_data_source_detects_urls_and_paths() {
        let config: AppConfig = toml::from_str(
            r#"
            [input]
            boundaries = "data/india.geojson"
            assembly = "https://example.org/assembly.json"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.input.boundaries,
            DataSource::File(PathBuf::from("data/india.geojson"))
        );
        assert_eq!(
            config.input.assembly,
            DataSource::Url("https://example.org/assembly.json".to_string())
        );
        // Untouched keys in a present section still default
        assert_eq!(
            config.input.members,
            DataSource::File(PathBuf::from("data/members.json"))
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nport = 9000\n\n[geocoder]\ncountry_codes = [\"in\", \"pk\"]\n").unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.geocoder.country_codes, vec!["in", "pk"]);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }
}
