use crate::boundary::BoundaryStore;
use crate::config::ViewConfig;
use crate::data::Datasets;
use crate::error::{GeocodingError, ResolutionMiss};
use crate::geocoder::{GeocodeCandidate, Geocoder};
use crate::info::{InfoAggregator, InfoResult};
use crate::resolver;
use crate::selection::{RequestId, SelectionManager, SelectionState};
use crate::types::ResolvedLocation;
use geojson::FeatureCollection;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const LOCATION_NOT_FOUND: &str = "Could not determine the state for this location.";

/// Instruction for the map widget after a selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewCommand {
    FitBounds {
        south: f64,
        west: f64,
        north: f64,
        east: f64,
        padding: u32,
    },
    Center {
        lat: f64,
        lng: f64,
        zoom: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionReport {
    pub selection: SelectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<InfoResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewCommand>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LocateOutcome {
    Selected(SelectionReport),
    NotFound { notice: &'static str },
    /// The selection changed while the geocoder was working; result dropped.
    Stale,
}

pub struct App {
    boundaries: BoundaryStore,
    info: InfoAggregator,
    selection: SelectionManager,
    view: ViewConfig,
}

impl App {
    pub fn new(datasets: Datasets, view: ViewConfig) -> Self {
        Self {
            boundaries: datasets.boundaries,
            info: datasets.info,
            selection: SelectionManager::new(),
            view,
        }
    }

    pub fn view_config(&self) -> &ViewConfig {
        &self.view
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.current()
    }

    pub fn info_for(&self, region: &str) -> InfoResult {
        self.info.info_for(region)
    }

    pub fn resolve(&self, lat: f64, lng: f64) -> Option<&str> {
        resolver::resolve(&self.boundaries, lat, lng).map(|region| region.name.as_str())
    }

    /// Boundaries with the current selection highlighted.
    pub fn regions(&self) -> FeatureCollection {
        self.boundaries.feature_collection(self.selection().region())
    }

    /// The current selection and its info, without a view change.
    pub fn report(&self) -> SelectionReport {
        let selection = self.selection().clone();
        let info = selection.region().map(|region| self.info.info_for(region));
        SelectionReport {
            selection,
            info,
            view: None,
        }
    }

    /// A region clicked directly on the map.
    pub fn select_region(&mut self, name: &str) -> SelectionReport {
        info!(region = name, "Selecting region");
        self.selection.select_by_name(name);

        let view = self.boundaries.bounds(name).map(|rect| ViewCommand::FitBounds {
            south: rect.min().y,
            west: rect.min().x,
            north: rect.max().y,
            east: rect.max().x,
            padding: self.view.fit_padding,
        });

        SelectionReport { view, ..self.report() }
    }

    /// A raw click on the map at (`lat`, `lng`).
    pub fn select_point(&mut self, lat: f64, lng: f64) -> Result<SelectionReport, ResolutionMiss> {
        let location = ResolvedLocation {
            lat,
            lng,
            display_name: format!("{lat:.4}, {lng:.4}"),
        };
        self.selection.select_by_coordinate(&self.boundaries, location)?;
        Ok(self.located_report(lat, lng))
    }

    /// A geocoder candidate. A state hint from the geocoder is trusted as is
    /// and skips the resolver.
    pub fn select_candidate(
        &mut self,
        candidate: &GeocodeCandidate,
    ) -> Result<SelectionReport, ResolutionMiss> {
        let location = ResolvedLocation {
            lat: candidate.lat,
            lng: candidate.lng,
            display_name: candidate.display_name.clone(),
        };

        match candidate.state.as_deref() {
            Some(state) => {
                debug!(state, "Using geocoder state hint");
                self.selection.select_at(state, location);
            }
            None => {
                self.selection.select_by_coordinate(&self.boundaries, location)?;
            }
        }

        Ok(self.located_report(candidate.lat, candidate.lng))
    }

    pub fn clear(&mut self) -> SelectionReport {
        self.selection.clear();
        self.report()
    }

    pub fn begin_geocode(&mut self) -> RequestId {
        self.selection.begin_request()
    }

    /// Apply a geocoder response, unless something else was selected since
    /// the request was issued.
    pub fn finish_geocode(
        &mut self,
        request: RequestId,
        result: Result<Vec<GeocodeCandidate>, GeocodingError>,
    ) -> LocateOutcome {
        if !self.selection.is_current(request) {
            debug!(request = request.value(), "Dropping stale geocoding response");
            return LocateOutcome::Stale;
        }

        let candidates = match result {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "Geocoding failed");
                return LocateOutcome::NotFound {
                    notice: LOCATION_NOT_FOUND,
                };
            }
        };

        let Some(first) = candidates.first() else {
            return LocateOutcome::NotFound {
                notice: LOCATION_NOT_FOUND,
            };
        };

        match self.select_candidate(first) {
            Ok(report) => LocateOutcome::Selected(report),
            Err(_) => LocateOutcome::NotFound {
                notice: LOCATION_NOT_FOUND,
            },
        }
    }

    fn located_report(&self, lat: f64, lng: f64) -> SelectionReport {
        SelectionReport {
            view: Some(ViewCommand::Center {
                lat,
                lng,
                zoom: self.view.location_zoom,
            }),
            ..self.report()
        }
    }
}

/// Geocode `query` and select its first candidate.
///
/// The lock is released while the geocoder runs, so other selections can
/// happen in the meantime; the request id decides whether the response still
/// applies when it arrives.
pub async fn locate<G: Geocoder>(app: &Mutex<App>, geocoder: &G, query: &str) -> LocateOutcome {
    let request = app.lock().await.begin_geocode();
    let result = geocoder.autocomplete(query).await;
    app.lock().await.finish_geocode(request, result)
}
