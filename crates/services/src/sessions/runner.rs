use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::controller::{AdvanceOutcome, AnswerFeedback, SessionController};
use super::workflow::QuizLoopService;
use crate::error::SessionError;

/// Handle to a scheduled advance.
#[derive(Debug)]
pub struct PendingAdvance {
    handle: JoinHandle<Result<AdvanceOutcome, SessionError>>,
}

impl PendingAdvance {
    pub(crate) fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = Result<AdvanceOutcome, SessionError>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(task),
        }
    }

    /// Abort the advance if it has not fired yet.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the advance to fire and return its outcome.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AdvanceCancelled` if the advance was cancelled,
    /// `SessionError::AdvanceFailed` if the task panicked, or whatever the
    /// advance itself returned.
    pub async fn wait(self) -> Result<AdvanceOutcome, SessionError> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(SessionError::AdvanceCancelled),
            Err(err) => Err(SessionError::AdvanceFailed(err.to_string())),
        }
    }
}

/// Drives a session in real time: each accepted answer schedules a single
/// advance after the service's delay.
///
/// Dropping the runner cancels any advance still pending.
pub struct QuizRunner {
    service: QuizLoopService,
    session: Arc<Mutex<SessionController>>,
    pending: Option<PendingAdvance>,
}

impl QuizRunner {
    #[must_use]
    pub fn new(service: QuizLoopService, session: SessionController) -> Self {
        Self {
            service,
            session: Arc::new(Mutex::new(session)),
            pending: None,
        }
    }

    #[must_use]
    pub fn service(&self) -> &QuizLoopService {
        &self.service
    }

    /// Copy of the session as it stands now.
    pub async fn session(&self) -> SessionController {
        self.session.lock().await.clone()
    }

    #[must_use]
    pub fn has_pending_advance(&self) -> bool {
        self.pending.as_ref().is_some_and(|pending| !pending.is_finished())
    }

    /// Grade `answer` and schedule the advance. `None` when the answer was
    /// ignored, in which case nothing is scheduled.
    pub async fn submit_answer(&mut self, answer: &str) -> Option<AnswerFeedback> {
        let feedback = {
            let mut session = self.session.lock().await;
            self.service.submit_answer(&mut session, answer)?
        };
        self.schedule_advance();
        Some(feedback)
    }

    fn schedule_advance(&mut self) {
        let service = self.service.clone();
        let session = Arc::clone(&self.session);
        let delay = service.advance_delay();

        let pending = PendingAdvance::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut session = session.lock().await;
            service.advance(&mut session).await
        });
        debug!(delay_ms = delay.as_millis(), "advance scheduled");

        if let Some(previous) = self.pending.replace(pending) {
            previous.cancel();
        }
    }

    /// Wait for the scheduled advance. `None` when nothing is pending.
    pub async fn wait_for_advance(&mut self) -> Option<Result<AdvanceOutcome, SessionError>> {
        let pending = self.pending.take()?;
        Some(pending.wait().await)
    }

    /// Cancel the scheduled advance, leaving the session answered.
    pub fn cancel_pending(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let fired = pending.is_finished();
        pending.cancel();
        if !fired {
            info!("pending advance cancelled");
        }
        !fired
    }

    /// Replay the same questions. Only valid once completed; otherwise the
    /// call is ignored and any scheduled advance still fires.
    pub async fn restart(&mut self) -> bool {
        let session = Arc::clone(&self.session);
        let mut session = session.lock().await;
        if !session.is_complete() {
            return false;
        }
        self.cancel_pending();
        self.service.restart(&mut session)
    }

    /// Discard the session, cancelling any pending advance.
    pub fn teardown(mut self) {
        self.cancel_pending();
    }
}

impl Drop for QuizRunner {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
