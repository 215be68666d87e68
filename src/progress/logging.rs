//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { artifact, mode } => {
                info!(artifact = %artifact, mode = %mode, "Starting build");
            }
            ProgressEvent::ModelsReady { services, job } => {
                debug!(services, job, "Models ready");
            }
            ProgressEvent::HandlerStarted { handler } => {
                info!(handler = %handler, "Starting handler");
            }
            ProgressEvent::HandlerComplete { handler, duration } => {
                debug!(
                    handler = %handler,
                    duration_ms = duration.as_millis(),
                    "Handler complete"
                );
            }
            ProgressEvent::ArtifactsWritten { count } => {
                info!(count, "Artifacts written");
            }
            ProgressEvent::Completed {
                instructions,
                total_time,
            } => {
                info!(
                    instructions,
                    total_time_ms = total_time.as_millis(),
                    "Build complete"
                );
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Build failed");
            }
        }
    }
}
