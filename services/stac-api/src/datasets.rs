//! Opening item assets as datasets.

use async_trait::async_trait;
use climate_common::{ClimateError, ClimateResult};
use dataset::Dataset;
use netcdf_parser::{decode_dataset, CoordinateNames};
use storage::AssetReader;
use tracing::{debug, instrument};

/// Turns an asset href into a decoded dataset.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Read the asset and decode `variables` (all data variables when empty).
    async fn open(
        &self,
        href: &str,
        coords: &CoordinateNames,
        variables: &[String],
    ) -> ClimateResult<Dataset>;
}

/// Reads NetCDF assets from object storage.
#[derive(Debug, Clone, Default)]
pub struct NetCdfDatasets {
    reader: AssetReader,
}

impl NetCdfDatasets {
    pub fn new(reader: AssetReader) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl DatasetSource for NetCdfDatasets {
    #[instrument(skip(self, coords, variables))]
    async fn open(
        &self,
        href: &str,
        coords: &CoordinateNames,
        variables: &[String],
    ) -> ClimateResult<Dataset> {
        let bytes = self.reader.read(href).await?;

        let coords = coords.clone();
        let variables = variables.to_vec();
        let dataset = tokio::task::spawn_blocking(move || {
            decode_dataset(&bytes, &coords, &variables)
        })
        .await
        .map_err(|e| ClimateError::InternalError(format!("Decode task failed: {}", e)))?
        .map_err(|e| ClimateError::NetCdfError(format!("{}: {}", href, e)))?;

        debug!(
            x = dataset.x.len(),
            y = dataset.y.len(),
            z = dataset.z.len(),
            t = dataset.t.len(),
            "Decoded asset"
        );
        Ok(dataset)
    }
}
