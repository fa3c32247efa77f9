use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use tokio::time::Instant;
use uuid::Uuid;

use crate::core::acquisition::AcquisitionError;
use crate::core::models::CaptureGrant;
use crate::core::ports::{CapturePlatform, FrameReader, SinkSpec, VirtualSurface};
use crate::global_constants::LOG_TAG_SESSION;

pub(crate) type SharedReader = Arc<Mutex<Box<dyn FrameReader>>>;

pub struct CaptureSession {
    session_id: Uuid,
    grant: CaptureGrant,
    spec: SinkSpec,
    created_at: Instant,
    surface: Option<Box<dyn VirtualSurface>>,
    reader: Option<SharedReader>,
    open_sessions: Arc<AtomicUsize>,
    released: bool,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("session_id", &self.session_id)
            .field("spec", &self.spec)
            .field("released", &self.released)
            .finish()
    }
}

impl CaptureSession {
    pub(crate) fn open(
        platform: &dyn CapturePlatform,
        grant: &CaptureGrant,
        spec: SinkSpec,
        open_sessions: Arc<AtomicUsize>,
    ) -> Result<Self, AcquisitionError> {
        let session_id = Uuid::new_v4();

        let mut reader = platform
            .open_reader(&spec)
            .map_err(|e| AcquisitionError::SinkUnavailable(format!("{:#}", e)))?;

        let surface = match platform.create_virtual_surface(grant, &spec) {
            Ok(surface) => surface,
            Err(e) => {
                if let Err(close_error) = reader.close() {
                    log::warn!(
                        "{} failed to close reader after surface error: {:#}",
                        LOG_TAG_SESSION,
                        close_error
                    );
                }
                return Err(AcquisitionError::SinkUnavailable(format!("{:#}", e)));
            }
        };

        open_sessions.fetch_add(1, Ordering::SeqCst);

        log::debug!(
            "{} opened session {}: {}x{} depth={}",
            LOG_TAG_SESSION,
            session_id,
            spec.width,
            spec.height,
            spec.buffer_depth
        );

        Ok(Self {
            session_id,
            grant: grant.clone(),
            spec,
            created_at: Instant::now(),
            surface: Some(surface),
            reader: Some(Arc::new(Mutex::new(reader))),
            open_sessions,
            released: false,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn grant(&self) -> &CaptureGrant {
        &self.grant
    }

    pub fn spec(&self) -> SinkSpec {
        self.spec
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn is_open(&self) -> bool {
        !self.released
    }

    pub(crate) fn shared_reader(&self) -> Option<SharedReader> {
        self.reader.as_ref().map(Arc::clone)
    }

    // Returns how many teardown steps failed.
    pub fn release(&mut self) -> usize {
        if self.released {
            log::debug!(
                "{} session {} already released",
                LOG_TAG_SESSION,
                self.session_id
            );
            return 0;
        }
        self.released = true;

        let mut failures = 0;

        if let Some(mut surface) = self.surface.take() {
            if let Err(e) = surface.release() {
                failures += 1;
                log::warn!(
                    "{} session {}: virtual surface release failed: {:#}",
                    LOG_TAG_SESSION,
                    self.session_id,
                    e
                );
            }
        }

        if let Some(reader) = self.reader.take() {
            if let Err(e) = close_reader(reader, self.session_id) {
                failures += 1;
                log::warn!(
                    "{} session {}: reader close failed: {:#}",
                    LOG_TAG_SESSION,
                    self.session_id,
                    e
                );
            }
        }

        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        log::debug!(
            "{} released session {} ({} teardown failures)",
            LOG_TAG_SESSION,
            self.session_id,
            failures
        );

        failures
    }
}

// A read still running on the blocking pool holds the lock. The close then
// waits for it there instead of stalling the caller.
fn close_reader(reader: SharedReader, session_id: Uuid) -> anyhow::Result<()> {
    let attempt = match reader.try_lock() {
        Ok(mut guard) => Some(guard.close()),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner().close()),
        Err(TryLockError::WouldBlock) => None,
    };
    if let Some(result) = attempt {
        return result;
    }

    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        return reader.lock().unwrap_or_else(PoisonError::into_inner).close();
    };

    log::warn!(
        "{} session {}: reader busy, closing it once the read returns",
        LOG_TAG_SESSION,
        session_id
    );
    runtime.spawn_blocking(move || {
        let mut guard = reader.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = guard.close() {
            log::warn!(
                "{} session {}: deferred reader close failed: {:#}",
                LOG_TAG_SESSION,
                session_id,
                e
            );
        }
    });
    Ok(())
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if !self.released {
            log::warn!(
                "{} session {} dropped without being ended, releasing now",
                LOG_TAG_SESSION,
                self.session_id
            );
            self.release();
        }
    }
}
