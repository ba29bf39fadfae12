//! Background assessment worker.
//!
//! Runs one assessment on the tokio runtime while the TUI main loop keeps
//! drawing. Progress is delivered over a std channel that the loop polls
//! without blocking. Dropping the handle aborts the task.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::application::AssessmentService;
use crate::domain::{NormalizedRequest, Report};
use crate::ports::{Classifier, ReportExporter};

/// Progress updates from the assessment worker.
#[derive(Debug, Clone)]
pub enum AssessmentProgress {
    /// Request sent to the prediction gateway
    Submitting,
    /// Assessment finished; tagged with the submission it belongs to
    Complete { submission: u64, report: Box<Report> },
}

/// Handle to a running assessment.
pub struct AssessmentWorkerHandle {
    submission: u64,
    progress_rx: Receiver<AssessmentProgress>,
    task: JoinHandle<()>,
}

impl AssessmentWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<AssessmentProgress> {
        self.progress_rx.try_recv().ok()
    }

    #[must_use]
    pub fn submission(&self) -> u64 {
        self.submission
    }

    /// Whether the task ended (completed, panicked or aborted).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for AssessmentWorkerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns assessments in the background.
pub struct AssessmentWorker;

impl AssessmentWorker {
    /// Spawn a background assessment.
    ///
    /// Returns a handle to receive progress updates.
    pub fn spawn<C, E>(
        runtime: &Handle,
        service: Arc<AssessmentService<C, E>>,
        submission: u64,
        request: NormalizedRequest,
    ) -> AssessmentWorkerHandle
    where
        C: Classifier + 'static,
        E: ReportExporter + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let task = runtime.spawn(async move {
            Self::run_with_progress(service, submission, request, tx).await;
        });

        AssessmentWorkerHandle {
            submission,
            progress_rx: rx,
            task,
        }
    }

    async fn run_with_progress<C, E>(
        service: Arc<AssessmentService<C, E>>,
        submission: u64,
        request: NormalizedRequest,
        tx: Sender<AssessmentProgress>,
    ) where
        C: Classifier + 'static,
        E: ReportExporter + 'static,
    {
        let _ = tx.send(AssessmentProgress::Submitting);

        let report = service.assess(request).await;

        // The receiver is gone if the UI moved on; nothing to do then.
        let _ = tx.send(AssessmentProgress::Complete {
            submission,
            report: Box::new(report),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::markdown::MarkdownExporter;
    use crate::application::gateway::tests::{request, FakeClassifier};
    use crate::application::{LocalSimulator, PredictionGateway};
    use crate::domain::PredictionClass;
    use std::time::Duration;

    fn service(classifier: FakeClassifier) -> Arc<AssessmentService<FakeClassifier, MarkdownExporter>> {
        let gateway = PredictionGateway::new(
            Arc::new(classifier),
            LocalSimulator::with_seed(11),
            Duration::from_millis(20),
        );
        Arc::new(AssessmentService::new(
            gateway,
            MarkdownExporter::new("unused"),
            Duration::from_secs(2),
        ))
    }

    #[test]
    fn test_worker_delivers_tagged_report() {
        let runtime = tokio::runtime::Runtime::new().expect("Should build runtime");
        let svc = service(FakeClassifier::answering(PredictionClass::AtRisk, 0.88));

        let handle = AssessmentWorker::spawn(runtime.handle(), svc, 7, request());
        assert_eq!(handle.submission(), 7);

        let first = handle
            .progress_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("Should receive progress");
        assert!(matches!(first, AssessmentProgress::Submitting));

        match handle
            .progress_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("Should complete")
        {
            AssessmentProgress::Complete { submission, report } => {
                assert_eq!(submission, 7);
                assert_eq!(report.verdict(), PredictionClass::AtRisk);
            }
            other => panic!("unexpected progress {other:?}"),
        }
    }

    #[test]
    fn test_dropping_handle_aborts_task() {
        let runtime = tokio::runtime::Runtime::new().expect("Should build runtime");
        let slow = FakeClassifier {
            answer: Err(crate::ports::GatewayFailure::Timeout),
            delay: Duration::from_secs(30),
        };
        let svc = service(slow);
        let handle = AssessmentWorker::spawn(runtime.handle(), Arc::clone(&svc), 1, request());

        let first = handle
            .progress_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("Should receive progress");
        assert!(matches!(first, AssessmentProgress::Submitting));
        assert!(!handle.is_finished());
        assert_eq!(Arc::strong_count(&svc), 2);

        drop(handle);

        // The aborted task drops its future, releasing the service.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while Arc::strong_count(&svc) > 1 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(Arc::strong_count(&svc), 1, "task still holds the service");

        runtime.shutdown_timeout(Duration::from_secs(1));
    }
}
