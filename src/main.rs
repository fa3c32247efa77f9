use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use freeselect::adapters::PngRegionSaver;
use freeselect::core::models::{CaptureGrant, FreeSelectSettings};
use freeselect::core::orchestrators::{CaptureOrchestrator, OrchestratorEvent};
use freeselect::global_constants::{LOG_TAG_APP, STARTUP_BANNER};
use freeselect::ports::XcapCapturePlatform;
use freeselect::selection_script::SelectionScript;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("{}", STARTUP_BANNER);
    log::info!("{} Starting FreeSelect", LOG_TAG_APP);

    let settings = FreeSelectSettings::load().unwrap_or_else(|e| {
        log::warn!("{} Failed to load settings, using defaults: {:#}", LOG_TAG_APP, e);
        FreeSelectSettings::default()
    });

    let display = XcapCapturePlatform::primary_display_metrics()?;
    let (grant, _revoker) = CaptureGrant::issue("desktop", display);

    let script = match std::env::args().nth(1) {
        Some(path) => SelectionScript::load_from(&PathBuf::from(path))?,
        None => SelectionScript::centred_ellipse(display.width, display.height),
    };

    let region_saver = PngRegionSaver::new(settings.output_directory.clone())
        .context("Unable to prepare output directory")?;
    let mut orchestrator = CaptureOrchestrator::build(
        Arc::new(XcapCapturePlatform::initialize()),
        Arc::new(region_saver),
        settings,
    );
    orchestrator.install_grant(grant);
    orchestrator.set_view_size(script.view_width, script.view_height);

    if let OrchestratorEvent::CaptureFailed(e) = orchestrator.request_capture().await {
        orchestrator.shutdown().await;
        anyhow::bail!("{}: {}", orchestrator.status(), e);
    }

    let mut last_event = OrchestratorEvent::Ignored;
    for message in script.messages() {
        last_event = orchestrator.handle_selection_message(message).await;
    }

    if orchestrator.selection().is_some() {
        log::warn!(
            "{} Selection was never closed, discarding it",
            LOG_TAG_APP
        );
        last_event = orchestrator.dismiss_selection().await;
    }

    orchestrator.shutdown().await;

    match last_event {
        OrchestratorEvent::RegionSaved(path) => {
            println!("Saved selection to {}", path.display());
            Ok(())
        }
        OrchestratorEvent::NoOutput(reason) => {
            println!("No image produced: {}", reason);
            Ok(())
        }
        OrchestratorEvent::SaveFailed(message) => anyhow::bail!("{}", message),
        other => {
            log::debug!("{} Finished with {:?}", LOG_TAG_APP, other);
            Ok(())
        }
    }
}
