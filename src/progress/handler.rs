//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a build runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Build started for an executable
    Started { artifact: String, mode: String },

    /// Models populated from the intent and overrides
    ModelsReady { services: usize, job: bool },

    /// Handler started
    HandlerStarted { handler: String },

    /// Handler finished and queued its artifacts
    HandlerComplete { handler: String, duration: Duration },

    /// Queued artifacts flushed to disk
    ArtifactsWritten { count: usize },

    /// Build completed successfully
    Completed {
        instructions: usize,
        total_time: Duration,
    },

    /// Build failed
    Failed { error: String },
}

/// Trait for handling progress events during a build
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        NoOpHandler.on_progress(&ProgressEvent::Started {
            artifact: "hello.jar".to_string(),
            mode: "k8s".to_string(),
        });
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::Started {
            artifact: "hello.jar".to_string(),
            mode: "k8s".to_string(),
        });
        handler.on_progress(&ProgressEvent::HandlerStarted {
            handler: "ServiceHandler".to_string(),
        });
        handler.on_progress(&ProgressEvent::Completed {
            instructions: 2,
            total_time: Duration::from_millis(20),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_event_debug() {
        let event = ProgressEvent::ArtifactsWritten { count: 4 };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("ArtifactsWritten"));
        assert!(debug_str.contains("count: 4"));
    }
}
