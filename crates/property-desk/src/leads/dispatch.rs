use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::domain::Inquiry;
use super::notifier::LeadNotifier;

/// Runs lead notifications off the request path.
///
/// Each delivery is a tracked task bounded by `timeout`. Outcomes are only logged, so a slow or
/// failing notifier never reaches the caller that saved the lead. [`drain`](Self::drain) waits for
/// deliveries still in flight, e.g. during shutdown.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn LeadNotifier>,
    timeout: Duration,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn LeadNotifier>, timeout: Duration) -> Self {
        Self {
            notifier,
            timeout,
            tasks: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, inquiry: Inquiry, subject_title: String) {
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.timeout;

        let delivery = async move {
            let attempt = notifier.send_lead_notification(&inquiry, &subject_title);
            match tokio::time::timeout(timeout, attempt).await {
                Ok(Ok(())) => debug!(inquiry_id = %inquiry.id, "lead notification finished"),
                Ok(Err(error)) => {
                    warn!(inquiry_id = %inquiry.id, %error, "lead notification failed")
                }
                Err(_) => warn!(
                    inquiry_id = %inquiry.id,
                    timeout_secs = timeout.as_secs_f64(),
                    "lead notification timed out"
                ),
            }
        };

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(finished) = tasks.try_join_next() {
            log_join_failure(finished);
        }
        tasks.spawn(delivery);
    }

    /// Waits for every delivery dispatched so far.
    pub async fn drain(&self) {
        let mut pending = {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *tasks)
        };

        while let Some(finished) = pending.join_next().await {
            log_join_failure(finished);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn log_join_failure(result: Result<(), tokio::task::JoinError>) {
    if let Err(error) = result {
        warn!(%error, "lead notification task aborted");
    }
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("timeout", &self.timeout)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
