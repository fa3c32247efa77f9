mod capture_platform;
#[cfg(test)]
pub mod fake_platform;
mod region_sink;

pub use capture_platform::{
    CapturePlatform, FrameReader, SinkPixelFormat, SinkSpec, VirtualSurface,
};
pub use region_sink::RegionSink;
