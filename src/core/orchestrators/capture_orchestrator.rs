use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;

use crate::core::acquisition::{AcquisitionError, SessionManager};
use crate::core::extraction::{SelectionController, SelectionMessage};
use crate::core::models::{CaptureGrant, ExtractionOutcome, FreeSelectSettings, NoOutputReason};
use crate::core::ports::{CapturePlatform, RegionSink};
use crate::global_constants::{
    LOG_TAG_ORCHESTRATOR, STATUS_CAPTURE_FAILED, STATUS_CAPTURING, STATUS_PERMISSION_EXPIRED,
    STATUS_IMAGE_SAVED, STATUS_READY, STATUS_SAVE_FAILED, STATUS_SELECTING,
    STATUS_SELECTION_DISCARDED,
};

#[derive(Debug)]
pub enum OrchestratorEvent {
    SelectionStarted,
    SelectionUpdated,
    CaptureFailed(AcquisitionError),
    RegionSaved(PathBuf),
    NoOutput(NoOutputReason),
    SaveFailed(String),
    Ignored,
}

pub struct CaptureOrchestrator {
    session_manager: SessionManager,
    region_sink: Arc<dyn RegionSink>,
    settings: FreeSelectSettings,
    grant: Option<CaptureGrant>,
    view_size: (u32, u32),
    selection: Option<SelectionController>,
    status: String,
}

impl CaptureOrchestrator {
    pub fn build(
        platform: Arc<dyn CapturePlatform>,
        region_sink: Arc<dyn RegionSink>,
        settings: FreeSelectSettings,
    ) -> Self {
        let session_manager = SessionManager::start(platform, settings.acquisition.clone());
        Self {
            session_manager,
            region_sink,
            settings,
            grant: None,
            view_size: (0, 0),
            selection: None,
            status: STATUS_READY.to_string(),
        }
    }

    pub fn install_grant(&mut self, grant: CaptureGrant) {
        log::debug!(
            "{} grant {} installed for {}x{}",
            LOG_TAG_ORCHESTRATOR,
            grant.grant_id(),
            grant.display().width,
            grant.display().height
        );
        if self.view_size == (0, 0) {
            self.view_size = (grant.display().width, grant.display().height);
        }
        self.grant = Some(grant);
        self.status = STATUS_READY.to_string();
    }

    pub fn has_live_grant(&self) -> bool {
        self.grant.as_ref().is_some_and(CaptureGrant::is_live)
    }

    pub fn set_view_size(&mut self, width: u32, height: u32) {
        self.view_size = (width, height);
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn selection(&self) -> Option<&SelectionController> {
        self.selection.as_ref()
    }

    pub fn render_selection_preview(&self) -> Option<RgbaImage> {
        self.selection
            .as_ref()
            .map(|selection| selection.render_preview(&self.settings.preview))
    }

    pub async fn request_capture(&mut self) -> OrchestratorEvent {
        if self.selection.is_some() {
            log::warn!(
                "{} selection already open, ignoring capture request",
                LOG_TAG_ORCHESTRATOR
            );
            return OrchestratorEvent::Ignored;
        }

        let Some(grant) = self.grant.clone().filter(CaptureGrant::is_live) else {
            log::error!("{} no live capture grant", LOG_TAG_ORCHESTRATOR);
            self.grant = None;
            self.status = STATUS_PERMISSION_EXPIRED.to_string();
            return OrchestratorEvent::CaptureFailed(AcquisitionError::GrantInvalid);
        };

        self.status = STATUS_CAPTURING.to_string();
        log::info!("{} capture requested", LOG_TAG_ORCHESTRATOR);

        match self.session_manager.capture(&grant).await {
            Ok(frame) => {
                let (view_width, view_height) = self.view_size;
                self.selection = Some(SelectionController::build_with_frame(
                    frame,
                    view_width,
                    view_height,
                    self.settings.selection.clone(),
                ));
                self.status = STATUS_SELECTING.to_string();
                OrchestratorEvent::SelectionStarted
            }
            Err(e) => {
                if e.requires_reauthorization() {
                    self.grant = None;
                    self.status = STATUS_PERMISSION_EXPIRED.to_string();
                } else {
                    self.status = format!("{}: {}", STATUS_CAPTURE_FAILED, e);
                }
                log::error!("{} capture failed: {}", LOG_TAG_ORCHESTRATOR, e);
                OrchestratorEvent::CaptureFailed(e)
            }
        }
    }

    pub async fn handle_selection_message(&mut self, message: SelectionMessage) -> OrchestratorEvent {
        let Some(selection) = self.selection.as_mut() else {
            log::debug!(
                "{} no selection open, dropping {:?}",
                LOG_TAG_ORCHESTRATOR,
                message
            );
            return OrchestratorEvent::Ignored;
        };

        let Some(outcome) = selection.update(message) else {
            return OrchestratorEvent::SelectionUpdated;
        };
        self.selection = None;

        match outcome {
            ExtractionOutcome::Extracted(region) => match self.region_sink.save_region(&region).await {
                Ok(path) => {
                    self.status = format!("{}: {}", STATUS_IMAGE_SAVED, path.display());
                    OrchestratorEvent::RegionSaved(path)
                }
                Err(e) => {
                    log::error!("{} failed to save region: {:#}", LOG_TAG_ORCHESTRATOR, e);
                    self.status = STATUS_SAVE_FAILED.to_string();
                    OrchestratorEvent::SaveFailed(format!("{:#}", e))
                }
            },
            ExtractionOutcome::NoOutput(reason) => {
                log::info!("{} selection ended without output: {}", LOG_TAG_ORCHESTRATOR, reason);
                self.status = STATUS_SELECTION_DISCARDED.to_string();
                OrchestratorEvent::NoOutput(reason)
            }
        }
    }

    pub async fn dismiss_selection(&mut self) -> OrchestratorEvent {
        self.handle_selection_message(SelectionMessage::CancelRequested)
            .await
    }

    pub async fn shutdown(&mut self) {
        self.selection = None;
        self.session_manager.stop().await;
        log::info!("{} shut down", LOG_TAG_ORCHESTRATOR);
    }
}
