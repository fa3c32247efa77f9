mod acquisition_engine;
mod acquisition_error;
mod capture_session;
mod frame_decoder;
mod session_manager;

pub use acquisition_engine::AcquisitionEngine;
pub use acquisition_error::AcquisitionError;
pub use capture_session::CaptureSession;
pub use frame_decoder::{decode_plane, FrameDecodeError};
pub use session_manager::SessionManager;
