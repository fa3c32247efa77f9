use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::core::models::{CaptureGrant, DisplayMetrics, PlaneBuffer};
use crate::core::ports::{CapturePlatform, FrameReader, SinkSpec, VirtualSurface};
use crate::global_constants::{
    BYTES_PER_PIXEL, ERROR_CONTEXT_CAPTURE_MONITOR, ERROR_CONTEXT_MONITOR_METRICS,
    ERROR_CONTEXT_PRIMARY_MONITOR, LOG_TAG_PLATFORM,
};

const BASELINE_DPI: f32 = 96.0;

#[derive(Clone, Default)]
pub struct XcapCapturePlatform {
    mirrored_monitor: Arc<Mutex<Option<u32>>>,
}

impl XcapCapturePlatform {
    pub fn initialize() -> Self {
        log::debug!("{} initializing xcap capture platform", LOG_TAG_PLATFORM);
        Self::default()
    }

    pub fn primary_display_metrics() -> Result<DisplayMetrics> {
        let monitor = find_primary_monitor()?;
        let width = monitor.width().with_context(|| ERROR_CONTEXT_MONITOR_METRICS)?;
        let height = monitor.height().with_context(|| ERROR_CONTEXT_MONITOR_METRICS)?;
        let scale_factor = monitor
            .scale_factor()
            .with_context(|| ERROR_CONTEXT_MONITOR_METRICS)?;

        let metrics = DisplayMetrics::new(width, height, (scale_factor * BASELINE_DPI).round() as u32);
        log::info!(
            "{} primary monitor {}x{} at {} dpi",
            LOG_TAG_PLATFORM,
            metrics.width,
            metrics.height,
            metrics.density_dpi
        );
        Ok(metrics)
    }
}

impl CapturePlatform for XcapCapturePlatform {
    fn open_reader(&self, spec: &SinkSpec) -> Result<Box<dyn FrameReader>> {
        log::debug!(
            "{} opening reader {}x{} ({:?}, depth {})",
            LOG_TAG_PLATFORM,
            spec.width,
            spec.height,
            spec.format,
            spec.buffer_depth
        );
        Ok(Box::new(XcapFrameReader {
            mirrored_monitor: Arc::clone(&self.mirrored_monitor),
            width: spec.width,
            height: spec.height,
        }))
    }

    fn create_virtual_surface(
        &self,
        grant: &CaptureGrant,
        spec: &SinkSpec,
    ) -> Result<Box<dyn VirtualSurface>> {
        let monitor = find_primary_monitor()?;
        let monitor_id = monitor.id().with_context(|| ERROR_CONTEXT_MONITOR_METRICS)?;

        let mut mirrored = self
            .mirrored_monitor
            .lock()
            .map_err(|_| anyhow::anyhow!("mirrored monitor slot poisoned"))?;
        *mirrored = Some(monitor_id);

        log::debug!(
            "{} mirroring monitor {} for grant {} at {}x{}",
            LOG_TAG_PLATFORM,
            monitor_id,
            grant.grant_id(),
            spec.width,
            spec.height
        );
        Ok(Box::new(XcapMirrorSurface {
            mirrored_monitor: Arc::clone(&self.mirrored_monitor),
        }))
    }
}

fn find_primary_monitor() -> Result<xcap::Monitor> {
    let monitors = xcap::Monitor::all().with_context(|| ERROR_CONTEXT_PRIMARY_MONITOR)?;
    monitors
        .into_iter()
        .find(|monitor| monitor.is_primary().unwrap_or(false))
        .with_context(|| ERROR_CONTEXT_PRIMARY_MONITOR)
}

struct XcapMirrorSurface {
    mirrored_monitor: Arc<Mutex<Option<u32>>>,
}

impl VirtualSurface for XcapMirrorSurface {
    fn release(&mut self) -> Result<()> {
        let mut mirrored = self
            .mirrored_monitor
            .lock()
            .map_err(|_| anyhow::anyhow!("mirrored monitor slot poisoned"))?;
        if let Some(monitor_id) = mirrored.take() {
            log::debug!("{} stopped mirroring monitor {}", LOG_TAG_PLATFORM, monitor_id);
        }
        Ok(())
    }
}

struct XcapFrameReader {
    mirrored_monitor: Arc<Mutex<Option<u32>>>,
    width: u32,
    height: u32,
}

impl XcapFrameReader {
    fn capture_monitor(&self, monitor_id: u32) -> Result<RgbaImage> {
        let monitors = xcap::Monitor::all().with_context(|| ERROR_CONTEXT_CAPTURE_MONITOR)?;
        let monitor = monitors
            .into_iter()
            .find(|monitor| monitor.id().map(|id| id == monitor_id).unwrap_or(false))
            .with_context(|| format!("monitor {} disappeared", monitor_id))?;

        let captured = monitor
            .capture_image()
            .with_context(|| ERROR_CONTEXT_CAPTURE_MONITOR)?;
        let (captured_width, captured_height) = (captured.width(), captured.height());

        RgbaImage::from_raw(captured_width, captured_height, captured.into_raw())
            .with_context(|| ERROR_CONTEXT_CAPTURE_MONITOR)
    }

    fn into_plane(&self, image: RgbaImage) -> PlaneBuffer {
        let image = if image.dimensions() == (self.width, self.height) {
            image
        } else {
            log::debug!(
                "{} resampling {}x{} capture to {}x{}",
                LOG_TAG_PLATFORM,
                image.width(),
                image.height(),
                self.width,
                self.height
            );
            imageops::resize(&image, self.width, self.height, FilterType::Triangle)
        };

        PlaneBuffer::new(
            image.into_raw(),
            BYTES_PER_PIXEL,
            self.width as usize * BYTES_PER_PIXEL,
        )
    }
}

impl FrameReader for XcapFrameReader {
    fn acquire_latest_buffer(&mut self) -> Result<Option<PlaneBuffer>> {
        let mirrored = *self
            .mirrored_monitor
            .lock()
            .map_err(|_| anyhow::anyhow!("mirrored monitor slot poisoned"))?;

        let Some(monitor_id) = mirrored else {
            return Ok(None);
        };

        let image = self.capture_monitor(monitor_id)?;
        log::debug!(
            "{} captured {}x{} from monitor {}",
            LOG_TAG_PLATFORM,
            image.width(),
            image.height(),
            monitor_id
        );
        Ok(Some(self.into_plane(image)))
    }

    fn close(&mut self) -> Result<()> {
        log::debug!("{} reader closed", LOG_TAG_PLATFORM);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::acquisition::decode_plane;
    use crate::core::ports::SinkPixelFormat;

    fn reader(width: u32, height: u32) -> XcapFrameReader {
        XcapFrameReader {
            mirrored_monitor: Arc::default(),
            width,
            height,
        }
    }

    #[test]
    fn test_reader_without_surface_has_no_frame() {
        let mut reader = reader(10, 10);

        assert!(reader.acquire_latest_buffer().unwrap().is_none());
    }

    #[test]
    fn test_into_plane_keeps_matching_dimensions() {
        let reader = reader(100, 50);
        let image = RgbaImage::from_pixel(100, 50, image::Rgba([1, 2, 3, 255]));

        let plane = reader.into_plane(image);

        assert_eq!(plane.row_stride, 400);
        assert_eq!(plane.bytes.len(), 100 * 50 * 4);
        let frame = decode_plane(&plane, 100, 50, SinkPixelFormat::Rgba8888).unwrap();
        assert_eq!(frame.pixel(99, 49).unwrap().0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_into_plane_resamples_high_density_capture() {
        let reader = reader(100, 50);
        let image = RgbaImage::from_pixel(200, 100, image::Rgba([9, 9, 9, 255]));

        let plane = reader.into_plane(image);

        assert_eq!(plane.bytes.len(), 100 * 50 * 4);
        assert_eq!(plane.row_stride, 100 * 4);
    }

    #[test]
    fn test_surface_release_clears_mirror() {
        let slot = Arc::new(Mutex::new(Some(7)));
        let mut surface = XcapMirrorSurface {
            mirrored_monitor: Arc::clone(&slot),
        };

        surface.release().unwrap();
        surface.release().unwrap();

        assert!(slot.lock().unwrap().is_none());
    }
}
