use std::fs::OpenOptions;
use std::io::{Cursor, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};

use crate::core::models::ExtractionResult;
use crate::core::ports::RegionSink;
use crate::global_constants::{
    LOG_TAG_SAVER, SCREENSHOT_DIRECTORY_NAME, SCREENSHOT_FILE_PREFIX, SCREENSHOT_TIMESTAMP_FORMAT,
};

pub struct PngRegionSaver {
    output_directory: PathBuf,
}

impl PngRegionSaver {
    pub fn new(output_directory: Option<PathBuf>) -> Result<Self> {
        let output_directory = match output_directory {
            Some(directory) => directory,
            None => Self::default_output_directory()?,
        };
        log::debug!("{} saving regions to {:?}", LOG_TAG_SAVER, output_directory);
        Ok(Self { output_directory })
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    fn default_output_directory() -> Result<PathBuf> {
        let pictures = dirs::picture_dir()
            .or_else(dirs::home_dir)
            .context("Could not determine a pictures directory")?;
        Ok(pictures.join(SCREENSHOT_DIRECTORY_NAME))
    }

    fn timestamped_file_name() -> String {
        format!(
            "{}{}.png",
            SCREENSHOT_FILE_PREFIX,
            chrono::Local::now().format(SCREENSHOT_TIMESTAMP_FORMAT)
        )
    }

    fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut encoded = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .context("Failed to encode region as PNG")?;
        Ok(encoded)
    }

    // Claims the name with create_new so concurrent saves in the same second
    // step to `_1`, `_2`, ... instead of overwriting each other.
    fn write_unique(directory: &Path, file_name: &str, encoded: &[u8]) -> Result<PathBuf> {
        let stem = file_name.trim_end_matches(".png");
        let mut suffix = 0;
        loop {
            let path = match suffix {
                0 => directory.join(file_name),
                n => directory.join(format!("{}_{}.png", stem, n)),
            };
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(encoded)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(e).with_context(|| format!("Failed to create {:?}", path)),
            }
        }
    }
}

#[async_trait]
impl RegionSink for PngRegionSaver {
    async fn save_region(&self, region: &ExtractionResult) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_directory)
            .await
            .with_context(|| format!("Failed to create {:?}", self.output_directory))?;

        let image = region.image.clone();
        let directory = self.output_directory.clone();
        let file_name = Self::timestamped_file_name();
        let path = tokio::task::spawn_blocking(move || {
            let encoded = Self::encode_png(&image)?;
            Self::write_unique(&directory, &file_name, &encoded)
        })
        .await
        .context("PNG writer task failed")??;

        log::info!(
            "{} saved {}x{} region to {:?}",
            LOG_TAG_SAVER,
            region.width(),
            region.height(),
            path
        );
        Ok(path)
    }
}
