//! Single-worker execution front for the service.
//!
//! Translation requests line up on a bounded queue consumed by one task, so
//! at most one request drives the model daemon at a time. Status and
//! language queries answer from shared state directly and stay responsive
//! while a translation is in flight.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::schema::{LanguagesResponse, StatusResponse, TranslateRequest, TranslateResponse};
use crate::service::TranslationService;

struct Job {
    request: TranslateRequest,
    reply: oneshot::Sender<Result<TranslateResponse, ServiceError>>,
}

/// Cloneable front door to the translation worker.
#[derive(Clone)]
pub struct ServiceHandle {
    service: Arc<TranslationService>,
    queue: mpsc::Sender<Job>,
}

impl ServiceHandle {
    /// Queue one translation request and wait for its outcome.
    ///
    /// # Errors
    /// Validation and translation errors from the service pass through;
    /// `ServiceError::Internal` means the worker is gone.
    pub async fn translate(
        &self,
        request: TranslateRequest,
    ) -> Result<TranslateResponse, ServiceError> {
        let (reply, outcome) = oneshot::channel();
        self.queue
            .send(Job { request, reply })
            .await
            .map_err(|_| ServiceError::Internal("translation worker is gone".to_string()))?;
        outcome.await.map_err(|_| {
            ServiceError::Internal("translation worker dropped the request".to_string())
        })?
    }

    /// Immediate health snapshot; never queues behind translations.
    pub fn status(&self) -> StatusResponse {
        self.service.status()
    }

    /// Immediate registry listing; never queues behind translations.
    pub fn languages(&self) -> LanguagesResponse {
        self.service.languages()
    }
}

/// Spawn the translation worker over `service`.
///
/// Returns the handle plus the worker task; the worker exits once every
/// `ServiceHandle` clone has been dropped and the queue is drained.
pub fn start_worker(
    service: TranslationService,
    queue_depth: usize,
) -> (ServiceHandle, JoinHandle<()>) {
    let service = Arc::new(service);
    let (queue, mut jobs) = mpsc::channel::<Job>(queue_depth);

    let worker_service = Arc::clone(&service);
    let worker = tokio::spawn(async move {
        info!("✓ Translation worker started (queue depth {})", queue_depth);
        while let Some(job) = jobs.recv().await {
            let outcome = worker_service.translate(&job.request).await;
            if job.reply.send(outcome).is_err() {
                warn!("Requester went away before the reply was ready");
            }
        }
        info!("Translation worker stopped");
    });

    (ServiceHandle { service, queue }, worker)
}
