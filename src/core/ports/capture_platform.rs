use anyhow::Result;

use crate::core::models::{CaptureGrant, PlaneBuffer};
use crate::global_constants::BYTES_PER_PIXEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkPixelFormat {
    Rgba8888,
}

impl SinkPixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            SinkPixelFormat::Rgba8888 => BYTES_PER_PIXEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkSpec {
    pub width: u32,
    pub height: u32,
    pub density_dpi: u32,
    pub format: SinkPixelFormat,
    pub buffer_depth: usize,
}

pub trait FrameReader: Send {
    // Newest completed buffer, older queued ones dropped. None until the
    // compositor delivers something.
    fn acquire_latest_buffer(&mut self) -> Result<Option<PlaneBuffer>>;

    fn close(&mut self) -> Result<()>;
}

pub trait VirtualSurface: Send {
    fn release(&mut self) -> Result<()>;
}

pub trait CapturePlatform: Send + Sync {
    fn open_reader(&self, spec: &SinkSpec) -> Result<Box<dyn FrameReader>>;

    fn create_virtual_surface(
        &self,
        grant: &CaptureGrant,
        spec: &SinkSpec,
    ) -> Result<Box<dyn VirtualSurface>>;
}
