use image::RgbaImage;

use crate::core::extraction::selection_preview::{render_preview, PreviewShape};
use crate::core::extraction::FreehandExtractor;
use crate::core::models::{
    ClosedPath, ExtractionOutcome, NoOutputReason, Point, PreviewStyle, RawFrame, SelectionPath,
    SelectionSettings,
};
use crate::global_constants::{LOG_TAG_PREVIEW, LOG_TAG_SELECTION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Drawing,
    Closed,
    Extracted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionMessage {
    PointerPressed(Point),
    PointerMoved(Point),
    PointerReleased,
    ConfirmSelection,
    RedoSelection,
    CancelRequested,
}

#[derive(Debug, Clone)]
enum SelectionState {
    Idle,
    Drawing(SelectionPath),
    Closed(ClosedPath),
    Extracted,
}

impl SelectionState {
    fn phase(&self) -> SelectionPhase {
        match self {
            SelectionState::Idle => SelectionPhase::Idle,
            SelectionState::Drawing(_) => SelectionPhase::Drawing,
            SelectionState::Closed(_) => SelectionPhase::Closed,
            SelectionState::Extracted => SelectionPhase::Extracted,
        }
    }
}

pub struct SelectionController {
    frame: RawFrame,
    view_width: u32,
    view_height: u32,
    settings: SelectionSettings,
    extractor: FreehandExtractor,
    state: SelectionState,
}

impl SelectionController {
    pub fn build_with_frame(
        frame: RawFrame,
        view_width: u32,
        view_height: u32,
        settings: SelectionSettings,
    ) -> Self {
        log::debug!(
            "{} selecting over {}x{} frame shown at {}x{}",
            LOG_TAG_SELECTION,
            frame.width(),
            frame.height(),
            view_width,
            view_height
        );
        Self {
            frame,
            view_width,
            view_height,
            extractor: FreehandExtractor::new(settings.fill_rule),
            settings,
            state: SelectionState::Idle,
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        self.state.phase()
    }

    pub fn frame(&self) -> &RawFrame {
        &self.frame
    }

    pub fn view_size(&self) -> (u32, u32) {
        (self.view_width, self.view_height)
    }

    pub fn points(&self) -> &[Point] {
        match &self.state {
            SelectionState::Drawing(path) => path.points(),
            SelectionState::Closed(path) => path.points(),
            SelectionState::Idle | SelectionState::Extracted => &[],
        }
    }

    pub fn shows_confirm_controls(&self) -> bool {
        matches!(self.state, SelectionState::Closed(_))
    }

    pub fn update(&mut self, message: SelectionMessage) -> Option<ExtractionOutcome> {
        let state = std::mem::replace(&mut self.state, SelectionState::Extracted);

        let (next_state, outcome) = match (state, message) {
            (SelectionState::Extracted, ignored) => {
                log::debug!(
                    "{} selection already extracted, ignoring {:?}",
                    LOG_TAG_SELECTION,
                    ignored
                );
                (SelectionState::Extracted, None)
            }

            (_, SelectionMessage::CancelRequested) => {
                log::info!("{} selection cancelled", LOG_TAG_SELECTION);
                (
                    SelectionState::Idle,
                    Some(ExtractionOutcome::NoOutput(NoOutputReason::Cancelled)),
                )
            }

            (SelectionState::Idle, SelectionMessage::PointerPressed(point))
            | (SelectionState::Drawing(_), SelectionMessage::PointerPressed(point)) => {
                (SelectionState::Drawing(SelectionPath::starting_at(point)), None)
            }

            (SelectionState::Drawing(mut path), SelectionMessage::PointerMoved(point)) => {
                path.extend_to(point, self.settings.min_point_spacing);
                (SelectionState::Drawing(path), None)
            }

            (SelectionState::Drawing(path), SelectionMessage::PointerReleased) => {
                if path.len() > self.settings.min_closing_points {
                    log::debug!(
                        "{} path closed with {} points",
                        LOG_TAG_SELECTION,
                        path.len()
                    );
                    (SelectionState::Closed(path.seal()), None)
                } else {
                    log::debug!(
                        "{} discarding path with {} points, need more than {}",
                        LOG_TAG_SELECTION,
                        path.len(),
                        self.settings.min_closing_points
                    );
                    (SelectionState::Idle, None)
                }
            }

            (SelectionState::Closed(_), SelectionMessage::RedoSelection) => {
                log::debug!("{} redo requested", LOG_TAG_SELECTION);
                (SelectionState::Idle, None)
            }

            (SelectionState::Closed(path), SelectionMessage::ConfirmSelection) => {
                let outcome = self.extractor.extract(
                    &path,
                    &self.frame,
                    self.view_width as f32,
                    self.view_height as f32,
                );
                (SelectionState::Extracted, Some(outcome))
            }

            (state, ignored) => {
                log::debug!(
                    "{} {:?} has no effect while {:?}",
                    LOG_TAG_SELECTION,
                    ignored,
                    state.phase()
                );
                (state, None)
            }
        };

        self.state = next_state;
        outcome
    }

    pub fn render_preview(&self, style: &PreviewStyle) -> RgbaImage {
        let shape = match &self.state {
            SelectionState::Drawing(path) => PreviewShape::Open(path.points()),
            SelectionState::Closed(path) => PreviewShape::Closed(path),
            SelectionState::Idle | SelectionState::Extracted => PreviewShape::Empty,
        };
        log::trace!("{} rendering {:?}", LOG_TAG_PREVIEW, self.phase());
        render_preview(
            &self.frame,
            self.view_width,
            self.view_height,
            shape,
            style,
            self.settings.fill_rule,
        )
    }
}
