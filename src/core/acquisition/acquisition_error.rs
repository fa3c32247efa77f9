use uuid::Uuid;

use crate::core::acquisition::frame_decoder::FrameDecodeError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    #[error("Capture grant is missing or no longer valid")]
    GrantInvalid,

    #[error("Capture grant was revoked while capturing")]
    Revoked,

    #[error("No frame arrived within {waited_ms}ms")]
    Timeout { waited_ms: u64 },

    #[error("Capture reader delivered an empty buffer")]
    EmptyBuffer,

    #[error("Capture buffer could not be decoded: {0}")]
    DecodeFailure(String),

    #[error("Capture reader failed: {0}")]
    ReadFailure(String),

    #[error("Capture sink could not be created: {0}")]
    SinkUnavailable(String),

    #[error("Capture session {0} is not open")]
    SessionNotOpen(Uuid),

    #[error("Session manager is not running")]
    ManagerStopped,
}

impl AcquisitionError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AcquisitionError::Timeout { .. }
                | AcquisitionError::EmptyBuffer
                | AcquisitionError::DecodeFailure(_)
                | AcquisitionError::ReadFailure(_)
                | AcquisitionError::SinkUnavailable(_)
        )
    }

    pub fn requires_reauthorization(&self) -> bool {
        matches!(self, AcquisitionError::GrantInvalid | AcquisitionError::Revoked)
    }
}

impl From<FrameDecodeError> for AcquisitionError {
    fn from(error: FrameDecodeError) -> Self {
        match error {
            FrameDecodeError::EmptyBuffer => AcquisitionError::EmptyBuffer,
            other => AcquisitionError::DecodeFailure(other.to_string()),
        }
    }
}
