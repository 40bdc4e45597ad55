use crate::boundary::BoundaryStore;
use crate::error::ResolutionMiss;
use crate::resolver;
use crate::types::ResolvedLocation;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    NoSelection,
    Selected {
        region: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        location: Option<ResolvedLocation>,
    },
}

impl SelectionState {
    pub fn region(&self) -> Option<&str> {
        match self {
            SelectionState::NoSelection => None,
            SelectionState::Selected { region, .. } => Some(region.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct SelectionManager {
    // Every selection change and every issued request advances `sequence`
    state: SelectionState,
    sequence: u64,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &SelectionState {
        &self.state
    }

    /// Select `name` without checking that it exists in any dataset.
    pub fn select_by_name(&mut self, name: &str) -> &SelectionState {
        self.set(SelectionState::Selected {
            region: name.to_string(),
            location: None,
        })
    }

    /// Select `name` and remember the location that led to it.
    pub fn select_at(&mut self, name: &str, location: ResolvedLocation) -> &SelectionState {
        self.set(SelectionState::Selected {
            region: name.to_string(),
            location: Some(location),
        })
    }

    /// Resolve the location against the store and select the containing
    /// region. On a miss the current selection is left untouched.
    pub fn select_by_coordinate(
        &mut self,
        store: &BoundaryStore,
        location: ResolvedLocation,
    ) -> Result<&SelectionState, ResolutionMiss> {
        match resolver::resolve(store, location.lat, location.lng) {
            Some(region) => {
                let name = region.name.clone();
                Ok(self.select_at(&name, location))
            }
            None => {
                info!(lat = location.lat, lng = location.lng, "No region contains location");
                Err(ResolutionMiss {
                    lat: location.lat,
                    lng: location.lng,
                })
            }
        }
    }

    pub fn clear(&mut self) -> &SelectionState {
        self.set(SelectionState::NoSelection)
    }

    /// Issue an id for an async request. Any earlier outstanding request
    /// becomes stale.
    pub fn begin_request(&mut self) -> RequestId {
        self.sequence += 1;
        RequestId(self.sequence)
    }

    /// True while nothing has happened since `id` was issued.
    pub fn is_current(&self, id: RequestId) -> bool {
        id.0 == self.sequence
    }

    fn set(&mut self, state: SelectionState) -> &SelectionState {
        self.sequence += 1;
        debug!(sequence = self.sequence, selection = ?state.region(), "Selection changed");
        self.state = state;
        &self.state
    }
}
