use image::RgbaImage;

#[derive(Clone)]
pub struct ExtractionResult {
    pub image: RgbaImage,
    pub source_x: i64,
    pub source_y: i64,
}

impl std::fmt::Debug for ExtractionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionResult")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("source_x", &self.source_x)
            .field("source_y", &self.source_y)
            .finish()
    }
}

impl ExtractionResult {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOutputReason {
    Cancelled,
    DegenerateSelection,
}

impl std::fmt::Display for NoOutputReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoOutputReason::Cancelled => write!(f, "selection cancelled"),
            NoOutputReason::DegenerateSelection => write!(f, "selection has no area"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    Extracted(ExtractionResult),
    NoOutput(NoOutputReason),
}

impl ExtractionOutcome {
    pub fn is_extracted(&self) -> bool {
        matches!(self, ExtractionOutcome::Extracted(_))
    }

    pub fn into_result(self) -> Option<ExtractionResult> {
        match self {
            ExtractionOutcome::Extracted(result) => Some(result),
            ExtractionOutcome::NoOutput(_) => None,
        }
    }
}
