mod freehand_extractor;
pub mod geometry;
pub mod rasterizer;
mod selection_controller;
mod selection_preview;

pub use freehand_extractor::FreehandExtractor;
pub use selection_controller::{SelectionController, SelectionMessage, SelectionPhase};
pub use selection_preview::{render_preview, PreviewShape};
