use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::core::acquisition::{AcquisitionEngine, AcquisitionError};
use crate::core::models::{AcquisitionSettings, CaptureGrant, RawFrame};
use crate::core::ports::CapturePlatform;
use crate::global_constants::{LOG_TAG_SESSION, SESSION_COMMAND_QUEUE_DEPTH};

enum SessionCommand {
    Capture {
        grant: CaptureGrant,
        reply: oneshot::Sender<Result<RawFrame, AcquisitionError>>,
    },
    OpenSessionCount {
        reply: oneshot::Sender<usize>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

pub struct SessionManager {
    commands: mpsc::Sender<SessionCommand>,
    worker: Option<JoinHandle<()>>,
}

impl SessionManager {
    pub fn start(platform: Arc<dyn CapturePlatform>, settings: AcquisitionSettings) -> Self {
        let (commands, receiver) = mpsc::channel(SESSION_COMMAND_QUEUE_DEPTH);
        let engine = AcquisitionEngine::new(platform, settings);
        let worker = tokio::spawn(run_worker(engine, receiver));

        log::debug!("{} session worker started", LOG_TAG_SESSION);
        Self {
            commands,
            worker: Some(worker),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed() && self.worker.is_some()
    }

    pub async fn capture(&self, grant: &CaptureGrant) -> Result<RawFrame, AcquisitionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(SessionCommand::Capture {
                grant: grant.clone(),
                reply,
            })
            .await
            .map_err(|_| AcquisitionError::ManagerStopped)?;

        response.await.map_err(|_| AcquisitionError::ManagerStopped)?
    }

    pub async fn open_session_count(&self) -> Result<usize, AcquisitionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(SessionCommand::OpenSessionCount { reply })
            .await
            .map_err(|_| AcquisitionError::ManagerStopped)?;

        response.await.map_err(|_| AcquisitionError::ManagerStopped)
    }

    pub async fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        let (reply, response) = oneshot::channel();
        if self
            .commands
            .send(SessionCommand::Shutdown { reply })
            .await
            .is_ok()
        {
            let _ = response.await;
        }
        if let Err(e) = worker.await {
            log::warn!("{} session worker ended abnormally: {}", LOG_TAG_SESSION, e);
        }
        log::debug!("{} session worker stopped", LOG_TAG_SESSION);
    }
}

async fn run_worker(mut engine: AcquisitionEngine, mut commands: mpsc::Receiver<SessionCommand>) {
    while let Some(command) = commands.recv().await {
        match command {
            SessionCommand::Capture { grant, reply } => {
                if reply.is_closed() {
                    log::debug!("{} capture request abandoned before start", LOG_TAG_SESSION);
                    continue;
                }
                let result = engine.capture_frame(&grant).await;
                if reply.send(result).is_err() {
                    log::debug!(
                        "{} requester went away, discarding captured frame",
                        LOG_TAG_SESSION
                    );
                }
            }
            SessionCommand::OpenSessionCount { reply } => {
                let _ = reply.send(engine.open_session_count());
            }
            SessionCommand::Shutdown { reply } => {
                engine.end_active_session();
                let _ = reply.send(());
                break;
            }
        }
    }
    engine.end_active_session();
}
