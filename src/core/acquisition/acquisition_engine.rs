use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::time::{sleep, sleep_until, timeout, Instant};
use uuid::Uuid;

use crate::core::acquisition::{decode_plane, AcquisitionError, CaptureSession};
use crate::core::models::{AcquisitionSettings, CaptureGrant, PlaneBuffer, RawFrame};
use crate::core::ports::{CapturePlatform, SinkPixelFormat, SinkSpec};
use crate::global_constants::LOG_TAG_ACQUISITION;

pub struct AcquisitionEngine {
    platform: Arc<dyn CapturePlatform>,
    settings: AcquisitionSettings,
    active_session: Option<CaptureSession>,
    open_sessions: Arc<AtomicUsize>,
}

impl AcquisitionEngine {
    pub fn new(platform: Arc<dyn CapturePlatform>, settings: AcquisitionSettings) -> Self {
        Self {
            platform,
            settings,
            active_session: None,
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn settings(&self) -> &AcquisitionSettings {
        &self.settings
    }

    pub fn open_session_count(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub fn active_session_id(&self) -> Option<Uuid> {
        self.active_session.as_ref().map(CaptureSession::session_id)
    }

    pub fn begin_session(&mut self, grant: &CaptureGrant) -> Result<Uuid, AcquisitionError> {
        if !grant.is_live() {
            log::error!(
                "{} refusing to open session: grant {} is not live",
                LOG_TAG_ACQUISITION,
                grant.grant_id()
            );
            return Err(AcquisitionError::GrantInvalid);
        }

        if let Some(mut previous) = self.active_session.take() {
            log::warn!(
                "{} session {} still open, tearing it down first",
                LOG_TAG_ACQUISITION,
                previous.session_id()
            );
            previous.release();
        }

        let display = grant.display();
        let spec = SinkSpec {
            width: display.width,
            height: display.height,
            density_dpi: display.density_dpi,
            format: SinkPixelFormat::Rgba8888,
            buffer_depth: self.settings.effective_buffer_depth(),
        };

        let session = CaptureSession::open(
            self.platform.as_ref(),
            grant,
            spec,
            Arc::clone(&self.open_sessions),
        )?;
        let session_id = session.session_id();
        self.active_session = Some(session);

        log::info!(
            "{} session {} started for {}x{}",
            LOG_TAG_ACQUISITION,
            session_id,
            display.width,
            display.height
        );
        Ok(session_id)
    }

    pub async fn acquire_frame(&mut self, session_id: Uuid) -> Result<RawFrame, AcquisitionError> {
        let post_creation_settle = self.settings.post_creation_settle();
        let pre_read_settle = self.settings.pre_read_settle();
        let read_timeout = self.settings.read_timeout();
        let poll_interval = self.settings.poll_interval();

        let session = self
            .active_session
            .as_mut()
            .filter(|session| session.session_id() == session_id)
            .ok_or(AcquisitionError::SessionNotOpen(session_id))?;

        let grant = session.grant().clone();
        let spec = session.spec();

        if grant.is_revoked() {
            return Err(AcquisitionError::Revoked);
        }

        wait_unless_revoked(&grant, session.created_at() + post_creation_settle).await?;
        wait_unless_revoked(&grant, Instant::now() + pre_read_settle).await?;

        let reader = session
            .shared_reader()
            .ok_or(AcquisitionError::SessionNotOpen(session_id))?;

        let poll = async {
            loop {
                if grant.is_revoked() {
                    return Err(AcquisitionError::Revoked);
                }
                let read = tokio::task::spawn_blocking({
                    let reader = Arc::clone(&reader);
                    move || {
                        let mut reader = reader
                            .lock()
                            .map_err(|_| anyhow::anyhow!("frame reader poisoned by an earlier read"))?;
                        reader.acquire_latest_buffer()
                    }
                });
                let outcome = tokio::select! {
                    joined = read => joined,
                    _ = grant.wait_for_revocation() => return Err(AcquisitionError::Revoked),
                };
                match outcome {
                    Ok(Ok(Some(plane))) => return Ok(plane),
                    Ok(Ok(None)) => {}
                    Ok(Err(e)) => return Err(AcquisitionError::ReadFailure(format!("{:#}", e))),
                    Err(e) => {
                        return Err(AcquisitionError::ReadFailure(format!("reader task failed: {}", e)))
                    }
                }
                tokio::select! {
                    _ = sleep(poll_interval) => {}
                    _ = grant.wait_for_revocation() => return Err(AcquisitionError::Revoked),
                }
            }
        };

        let plane: PlaneBuffer = match timeout(read_timeout, poll).await {
            Ok(result) => result?,
            Err(_) => {
                log::warn!(
                    "{} session {}: no frame within {:?}",
                    LOG_TAG_ACQUISITION,
                    session_id,
                    read_timeout
                );
                return Err(AcquisitionError::Timeout {
                    waited_ms: read_timeout.as_millis() as u64,
                });
            }
        };

        if grant.is_revoked() {
            log::warn!(
                "{} session {}: grant revoked after read, discarding frame",
                LOG_TAG_ACQUISITION,
                session_id
            );
            return Err(AcquisitionError::Revoked);
        }

        let frame = decode_plane(&plane, spec.width, spec.height, spec.format)?;
        log::info!(
            "{} session {}: acquired {}x{} frame",
            LOG_TAG_ACQUISITION,
            session_id,
            frame.width(),
            frame.height()
        );
        Ok(frame)
    }

    pub fn end_session(&mut self, session_id: Uuid) {
        match self.active_session.take() {
            Some(mut session) if session.session_id() == session_id => {
                session.release();
                log::debug!("{} session {} ended", LOG_TAG_ACQUISITION, session_id);
            }
            other => {
                self.active_session = other;
                log::debug!(
                    "{} session {} is not active, nothing to end",
                    LOG_TAG_ACQUISITION,
                    session_id
                );
            }
        }
    }

    pub fn end_active_session(&mut self) {
        if let Some(session_id) = self.active_session_id() {
            self.end_session(session_id);
        }
    }

    pub async fn capture_once(&mut self, grant: &CaptureGrant) -> Result<RawFrame, AcquisitionError> {
        let session_id = self.begin_session(grant)?;
        let result = self.acquire_frame(session_id).await;
        self.end_session(session_id);
        result
    }

    pub async fn capture_frame(&mut self, grant: &CaptureGrant) -> Result<RawFrame, AcquisitionError> {
        let max_retries = self.settings.max_automatic_retries;
        let mut attempt = 0;

        loop {
            match self.capture_once(grant).await {
                Ok(frame) => return Ok(frame),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    log::warn!(
                        "{} capture failed ({}), retrying ({}/{})",
                        LOG_TAG_ACQUISITION,
                        e,
                        attempt,
                        max_retries
                    );
                    wait_unless_revoked(grant, Instant::now() + self.settings.retry_cooldown())
                        .await?;
                }
                Err(e) => {
                    log::error!("{} capture failed: {}", LOG_TAG_ACQUISITION, e);
                    return Err(e);
                }
            }
        }
    }
}

impl Drop for AcquisitionEngine {
    fn drop(&mut self) {
        self.end_active_session();
    }
}

async fn wait_unless_revoked(grant: &CaptureGrant, deadline: Instant) -> Result<(), AcquisitionError> {
    tokio::select! {
        _ = sleep_until(deadline) => Ok(()),
        _ = grant.wait_for_revocation() => Err(AcquisitionError::Revoked),
    }
}
