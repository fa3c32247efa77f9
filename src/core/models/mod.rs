mod capture_grant;
mod extraction_result;
mod freeselect_settings;
mod raw_frame;
mod selection_path;

pub use capture_grant::{CaptureGrant, DisplayMetrics, GrantRevoker};
pub use extraction_result::{ExtractionOutcome, ExtractionResult, NoOutputReason};
pub use freeselect_settings::{
    AcquisitionSettings, FillRule, FreeSelectSettings, PreviewStyle, SelectionSettings,
};
pub use raw_frame::{PlaneBuffer, RawFrame};
pub use selection_path::{BoundingBox, ClosedPath, Point, SelectionPath};
