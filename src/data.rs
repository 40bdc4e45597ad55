use crate::boundary::BoundaryStore;
use crate::config::{AppConfig, DataSource};
use crate::error::DataLoadError;
use crate::info::InfoAggregator;
use crate::types::{Delegate, RegionMetadata};
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

/// Everything loaded at startup.
pub struct Datasets {
    pub boundaries: BoundaryStore,
    pub info: InfoAggregator,
}

#[derive(Deserialize)]
struct AssemblyFile {
    states: Vec<RegionMetadata>,
}

#[derive(Deserialize)]
struct MembersFile {
    members: Vec<Delegate>,
}

/// Load the three datasets. A dataset that fails to load is logged and
/// replaced by an empty one; the application keeps running without it.
pub async fn load_datasets(config: &AppConfig) -> Datasets {
    let input = &config.input;
    let timeout = Duration::from_secs(input.timeout_secs);

    let boundaries = match BoundaryStore::load(&input.boundaries, &input.name_properties, timeout).await {
        Ok(store) => store,
        Err(e) => {
            error!(source = %input.boundaries, error = %e, "Error loading boundaries");
            BoundaryStore::default()
        }
    };

    let states = match load_assembly(&input.assembly, timeout).await {
        Ok(states) => states,
        Err(e) => {
            error!(source = %input.assembly, error = %e, "Error loading assembly data");
            Vec::new()
        }
    };

    let members = match load_members(&input.members, timeout).await {
        Ok(members) => members,
        Err(e) => {
            error!(source = %input.members, error = %e, "Error loading member roster");
            Vec::new()
        }
    };

    Datasets {
        boundaries,
        info: InfoAggregator::new(states, members),
    }
}

pub async fn load_assembly(
    source: &DataSource,
    timeout: Duration,
) -> Result<Vec<RegionMetadata>, DataLoadError> {
    let bytes = fetch(source, timeout).await?;
    let file: AssemblyFile = serde_json::from_slice(&bytes).map_err(|source| DataLoadError::Json {
        what: "assembly data".to_string(),
        source,
    })?;
    info!(states = file.states.len(), "Assembly data loaded");
    Ok(file.states)
}

pub async fn load_members(
    source: &DataSource,
    timeout: Duration,
) -> Result<Vec<Delegate>, DataLoadError> {
    let bytes = fetch(source, timeout).await?;
    let file: MembersFile = serde_json::from_slice(&bytes).map_err(|source| DataLoadError::Json {
        what: "member roster".to_string(),
        source,
    })?;
    info!(members = file.members.len(), "Member roster loaded");
    Ok(file.members)
}

/// Read a dataset from disk or over HTTP. `timeout` bounds the whole HTTP
/// request, body included.
pub async fn fetch(source: &DataSource, timeout: Duration) -> Result<Vec<u8>, DataLoadError> {
    match source {
        DataSource::File(path) => tokio::fs::read(path).await.map_err(|source| DataLoadError::Io {
            path: path.display().to_string(),
            source,
        }),
        DataSource::Url(url) => {
            let http_error = |e: reqwest::Error| DataLoadError::Http {
                url: url.clone(),
                message: e.to_string(),
            };

            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(http_error)?;

            let response = client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(http_error)?;
            let bytes = response.bytes().await.map_err(http_error)?;
            Ok(bytes.to_vec())
        }
    }
}
