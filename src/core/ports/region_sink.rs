use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::models::ExtractionResult;

#[async_trait]
pub trait RegionSink: Send + Sync {
    async fn save_region(&self, region: &ExtractionResult) -> Result<PathBuf>;
}
