use crate::config::DataSource;
use crate::data;
use crate::error::DataLoadError;
use crate::types::{Region, RegionGeometry};
use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct BoundaryStore {
    // Load order, which is also resolution order
    regions: Vec<Region>,
    // Name -> position in `regions`, last write wins
    index: HashMap<String, usize>,
}

impl BoundaryStore {
    pub fn from_regions(regions: Vec<Region>) -> Self {
        let mut index = HashMap::with_capacity(regions.len());
        for (i, region) in regions.iter().enumerate() {
            if let Some(previous) = index.insert(region.name.clone(), i) {
                warn!(
                    region = %region.name,
                    earlier = previous,
                    later = i,
                    "Duplicate region name, later feature replaces earlier in lookup"
                );
            }
        }
        Self { regions, index }
    }

    /// Fetch and parse the boundary dataset.
    pub async fn load(
        source: &DataSource,
        name_properties: &[String],
        timeout: Duration,
    ) -> Result<Self, DataLoadError> {
        info!(source = %source, "Loading boundary GeoJSON");
        let bytes = data::fetch(source, timeout).await?;
        let store = Self::from_geojson(&bytes, name_properties)?;
        info!(regions = store.len(), "Boundary store ready");
        Ok(store)
    }

    /// Parse a GeoJSON FeatureCollection of Polygon / MultiPolygon features.
    ///
    /// The region name is the first of `name_properties` present on a
    /// feature. Features without a name, without polygonal geometry or with
    /// a malformed outer ring are skipped.
    pub fn from_geojson(bytes: &[u8], name_properties: &[String]) -> Result<Self, DataLoadError> {
        let geojson: GeoJson = serde_json::from_slice(bytes).map_err(|source| DataLoadError::Json {
            what: "boundary GeoJSON".to_string(),
            source,
        })?;

        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            _ => return Err(DataLoadError::NotFeatureCollection),
        };

        let mut regions = Vec::with_capacity(collection.features.len());

        for (position, feature) in collection.features.into_iter().enumerate() {
            let Some(name) = feature_name(&feature, name_properties) else {
                warn!(feature = position, "Skipping boundary feature without a name");
                continue;
            };

            let geometry = match &feature.geometry {
                Some(geometry) => convert_geometry(&name, &geometry.value),
                None => Ok(None),
            };

            match geometry {
                Ok(Some(geometry)) => regions.push(Region { name, geometry }),
                Ok(None) => warn!(region = %name, "Skipping boundary feature without polygon geometry"),
                Err(e) => warn!(region = %name, error = %e, "Skipping boundary feature with invalid geometry"),
            }
        }

        Ok(Self::from_regions(regions))
    }

    pub fn lookup(&self, name: &str) -> Option<&Region> {
        self.index.get(name).map(|&i| &self.regions[i])
    }

    /// Every region in load order.
    pub fn all(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn bounds(&self, name: &str) -> Option<Rect<f64>> {
        self.lookup(name).and_then(|region| match &region.geometry {
            RegionGeometry::Polygon(polygon) => polygon.bounding_rect(),
            RegionGeometry::MultiPolygon(multi) => multi.bounding_rect(),
        })
    }

    /// The boundary set for the map widget, with `highlighted` set on the
    /// selected region only.
    pub fn feature_collection(&self, highlighted: Option<&str>) -> FeatureCollection {
        // Highlight the indexed feature only, so duplicate names light up once
        let highlighted = highlighted.and_then(|name| self.index.get(name)).copied();

        let features = self
            .regions
            .iter()
            .enumerate()
            .map(|(i, region)| {
                let value = match &region.geometry {
                    RegionGeometry::Polygon(polygon) => Value::from(polygon),
                    RegionGeometry::MultiPolygon(multi) => Value::from(multi),
                };

                let mut properties = JsonObject::new();
                properties.insert("name".to_string(), region.name.clone().into());
                properties.insert(
                    "highlighted".to_string(),
                    (highlighted == Some(i)).into(),
                );

                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(value)),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

fn feature_name(feature: &Feature, name_properties: &[String]) -> Option<String> {
    let props = feature.properties.as_ref()?;
    name_properties.iter().find_map(|key| match props.get(key) {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn convert_geometry(name: &str, value: &Value) -> Result<Option<RegionGeometry>, DataLoadError> {
    match value {
        Value::Polygon(rings) => Ok(Some(RegionGeometry::Polygon(to_polygon(name, rings)?))),
        Value::MultiPolygon(parts) => {
            let mut polygons = Vec::with_capacity(parts.len());
            let mut last_error = None;

            for rings in parts {
                match to_polygon(name, rings) {
                    Ok(polygon) => polygons.push(polygon),
                    Err(e) => {
                        warn!(region = name, error = %e, "Dropping invalid part of MultiPolygon");
                        last_error = Some(e);
                    }
                }
            }

            match (polygons.is_empty(), last_error) {
                (true, Some(e)) => Err(e),
                (true, None) => Ok(None),
                (false, _) => Ok(Some(RegionGeometry::MultiPolygon(MultiPolygon::new(polygons)))),
            }
        }
        _ => Ok(None),
    }
}

fn to_polygon(name: &str, rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, DataLoadError> {
    let (exterior, interiors) = rings.split_first().ok_or_else(|| DataLoadError::InvalidGeometry {
        region: name.to_string(),
        points: 0,
    })?;

    let exterior = to_line_string(exterior);
    if exterior.0.len() < 3 {
        return Err(DataLoadError::InvalidGeometry {
            region: name.to_string(),
            points: exterior.0.len(),
        });
    }

    // Holes are carried unvalidated
    let interiors = interiors.iter().map(|ring| to_line_string(ring)).collect();

    Ok(Polygon::new(exterior, interiors))
}

fn to_line_string(positions: &[Vec<f64>]) -> LineString<f64> {
    positions
        .iter()
        .filter_map(|position| match position.as_slice() {
            [x, y, ..] => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect()
}
