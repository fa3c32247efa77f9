use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use tokio::time::Instant;

use crate::core::models::{CaptureGrant, ExtractionResult, PlaneBuffer};
use crate::core::ports::{CapturePlatform, FrameReader, RegionSink, SinkSpec, VirtualSurface};

pub fn synthetic_plane(width: u32, height: u32, padding: usize) -> (PlaneBuffer, RgbaImage) {
    let expected = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x % 251) as u8,
            (y % 251) as u8,
            ((x * 7 + y * 13) % 256) as u8,
            255,
        ])
    });

    let row_stride = width as usize * 4 + padding;
    let mut bytes = Vec::with_capacity(row_stride * height as usize);
    for row in expected.rows() {
        for pixel in row {
            bytes.extend_from_slice(&pixel.0);
        }
        bytes.extend(std::iter::repeat(0xAB).take(padding));
    }

    (PlaneBuffer::new(bytes, 4, row_stride), expected)
}

pub fn solid_plane(width: u32, height: u32, rgba: [u8; 4]) -> PlaneBuffer {
    let bytes = rgba
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect();
    PlaneBuffer::new(bytes, 4, width as usize * 4)
}

#[derive(Debug, Clone)]
pub enum SessionScript {
    Frames(Vec<PlaneBuffer>),
    Silent,
    ReadError(String),
    // Every read blocks the calling thread for this long, then finds nothing.
    Stalled(Duration),
}

#[derive(Default)]
struct FakePlatformState {
    scripts: VecDeque<SessionScript>,
    fallback: Option<SessionScript>,
    open_readers: usize,
    open_surfaces: usize,
    sessions_created: usize,
    fail_surface_creation: bool,
    fail_reader_close: bool,
    fail_surface_release: bool,
    surface_created_at: Vec<Instant>,
    read_attempts: Vec<Instant>,
    last_spec: Option<SinkSpec>,
}

#[derive(Clone, Default)]
pub struct FakeCapturePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakeCapturePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, script: SessionScript) -> Self {
        self.lock().scripts.push_back(script);
        self
    }

    pub fn with_fallback(self, script: SessionScript) -> Self {
        self.lock().fallback = Some(script);
        self
    }

    pub fn with_failing_surface_creation(self) -> Self {
        self.lock().fail_surface_creation = true;
        self
    }

    pub fn with_failing_teardown(self) -> Self {
        {
            let mut state = self.lock();
            state.fail_reader_close = true;
            state.fail_surface_release = true;
        }
        self
    }

    pub fn open_resources(&self) -> usize {
        let state = self.lock();
        state.open_readers + state.open_surfaces
    }

    pub fn sessions_created(&self) -> usize {
        self.lock().sessions_created
    }

    pub fn read_attempts(&self) -> Vec<Instant> {
        self.lock().read_attempts.clone()
    }

    pub fn surface_created_at(&self) -> Vec<Instant> {
        self.lock().surface_created_at.clone()
    }

    pub fn last_spec(&self) -> Option<SinkSpec> {
        self.lock().last_spec
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakePlatformState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CapturePlatform for FakeCapturePlatform {
    fn open_reader(&self, spec: &SinkSpec) -> Result<Box<dyn FrameReader>> {
        let mut state = self.lock();
        state.open_readers += 1;
        state.last_spec = Some(*spec);
        Ok(Box::new(FakeFrameReader {
            state: Arc::clone(&self.state),
            queued: VecDeque::new(),
            read_error: None,
            stall: None,
            attached: false,
            closed: false,
        }))
    }

    fn create_virtual_surface(
        &self,
        _grant: &CaptureGrant,
        _spec: &SinkSpec,
    ) -> Result<Box<dyn VirtualSurface>> {
        let mut state = self.lock();
        if state.fail_surface_creation {
            anyhow::bail!("virtual display rejected");
        }
        state.open_surfaces += 1;
        state.sessions_created += 1;
        state.surface_created_at.push(Instant::now());
        Ok(Box::new(FakeVirtualSurface {
            state: Arc::clone(&self.state),
            released: false,
        }))
    }
}

struct FakeFrameReader {
    state: Arc<Mutex<FakePlatformState>>,
    queued: VecDeque<PlaneBuffer>,
    read_error: Option<String>,
    stall: Option<Duration>,
    attached: bool,
    closed: bool,
}

impl FakeFrameReader {
    fn attach_script(&mut self, state: &mut FakePlatformState) {
        if self.attached {
            return;
        }
        self.attached = true;
        let script = state
            .scripts
            .pop_front()
            .or_else(|| state.fallback.clone())
            .unwrap_or(SessionScript::Silent);
        match script {
            SessionScript::Frames(frames) => self.queued.extend(frames),
            SessionScript::Silent => {}
            SessionScript::ReadError(message) => self.read_error = Some(message),
            SessionScript::Stalled(duration) => self.stall = Some(duration),
        }
    }
}

impl FrameReader for FakeFrameReader {
    fn acquire_latest_buffer(&mut self) -> Result<Option<PlaneBuffer>> {
        let state_handle = Arc::clone(&self.state);
        {
            let mut state = state_handle
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state.read_attempts.push(Instant::now());
            self.attach_script(&mut state);
        }

        if let Some(stall) = self.stall {
            std::thread::sleep(stall);
            return Ok(None);
        }
        if let Some(message) = &self.read_error {
            anyhow::bail!("{}", message);
        }
        let latest = self.queued.drain(..).last();
        Ok(latest)
    }

    fn close(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !self.closed {
            self.closed = true;
            state.open_readers -= 1;
        }
        if state.fail_reader_close {
            anyhow::bail!("reader close failed");
        }
        Ok(())
    }
}

struct FakeVirtualSurface {
    state: Arc<Mutex<FakePlatformState>>,
    released: bool,
}

impl VirtualSurface for FakeVirtualSurface {
    fn release(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !self.released {
            self.released = true;
            state.open_surfaces -= 1;
        }
        if state.fail_surface_release {
            anyhow::bail!("surface release failed");
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingRegionSink {
    saved: Arc<Mutex<Vec<ExtractionResult>>>,
    fail: bool,
}

impl RecordingRegionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            saved: Arc::default(),
            fail: true,
        }
    }

    pub fn saved(&self) -> Vec<ExtractionResult> {
        self.saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl RegionSink for RecordingRegionSink {
    async fn save_region(&self, region: &ExtractionResult) -> Result<PathBuf> {
        if self.fail {
            anyhow::bail!("disk full");
        }
        let mut saved = self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        saved.push(region.clone());
        Ok(PathBuf::from(format!("memory://region-{}", saved.len())))
    }
}
