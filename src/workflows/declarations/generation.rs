use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{RequestId, RequestStatus, UserId};
use super::policy::{self, RequiredRole};
use super::render::document::{Letter, LetterRenderer};
use super::render::placeholder;
use super::repository::{
    BlobPublisher, DirectoryStore, RepositoryError, RequestRepository, RequestUpdate, RequestView,
    TemplateStore,
};
use super::service::{Clock, RequestServiceError, SystemClock};

const ARTIFACT_CONTENT_TYPE: &str = "application/pdf";

/// What happened to one batch item.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    Generated { document_url: String },
    Skipped { reason: String },
    Failed { reason: String },
}

/// Per-id entry of a batch report.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemOutcome {
    pub request_id: RequestId,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Batch result: the successfully processed views plus one structured
/// outcome per input id, so callers can see which items were skipped or
/// failed and why.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchGenerationReport {
    pub processed: Vec<RequestView>,
    pub outcomes: Vec<BatchItemOutcome>,
}

enum ItemFailure {
    Skip(String),
    Fail(String),
}

/// Walks a set of request ids and produces one published document per
/// eligible request. Items are processed sequentially and independently; a
/// skip or failure never aborts the rest of the batch, and a failed item
/// leaves its request `Pending` so a later batch can retry it.
pub struct BatchGenerationOrchestrator<R, D, T, B> {
    requests: Arc<R>,
    directory: Arc<D>,
    templates: Arc<T>,
    publisher: Arc<B>,
    renderer: LetterRenderer,
    namespace: String,
    clock: Arc<dyn Clock>,
}

impl<R, D, T, B> BatchGenerationOrchestrator<R, D, T, B>
where
    R: RequestRepository + 'static,
    D: DirectoryStore + 'static,
    T: TemplateStore + 'static,
    B: BlobPublisher + 'static,
{
    pub fn new(
        requests: Arc<R>,
        directory: Arc<D>,
        templates: Arc<T>,
        publisher: Arc<B>,
        namespace: impl Into<String>,
    ) -> Self {
        Self::with_clock(
            requests,
            directory,
            templates,
            publisher,
            namespace,
            Arc::new(SystemClock),
        )
    }

    pub fn with_clock(
        requests: Arc<R>,
        directory: Arc<D>,
        templates: Arc<T>,
        publisher: Arc<B>,
        namespace: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            directory,
            templates,
            publisher,
            renderer: LetterRenderer::new(),
            namespace: namespace.into(),
            clock,
        }
    }

    /// Generate and publish documents for every eligible id in the batch.
    pub fn generate_documents(
        &self,
        caller: &UserId,
        ids: &[RequestId],
    ) -> Result<BatchGenerationReport, RequestServiceError> {
        let attendant = self
            .directory
            .find_user(caller)?
            .ok_or(RepositoryError::NotFound)?;
        policy::authorize(&attendant, RequiredRole::Administrator)?;

        let mut report = BatchGenerationReport::default();
        for id in ids {
            match self.process_request(&attendant.id, id) {
                Ok(view) => {
                    let document_url = view.document_url.clone().unwrap_or_default();
                    info!(request = %id.0, url = %document_url, "declaration document generated");
                    report.outcomes.push(BatchItemOutcome {
                        request_id: id.clone(),
                        outcome: BatchOutcome::Generated { document_url },
                    });
                    report.processed.push(view);
                }
                Err(ItemFailure::Skip(reason)) => {
                    warn!(request = %id.0, %reason, "declaration generation skipped");
                    report.outcomes.push(BatchItemOutcome {
                        request_id: id.clone(),
                        outcome: BatchOutcome::Skipped { reason },
                    });
                }
                Err(ItemFailure::Fail(reason)) => {
                    warn!(request = %id.0, %reason, "declaration generation failed");
                    report.outcomes.push(BatchItemOutcome {
                        request_id: id.clone(),
                        outcome: BatchOutcome::Failed { reason },
                    });
                }
            }
        }
        Ok(report)
    }

    fn process_request(
        &self,
        attendant: &UserId,
        id: &RequestId,
    ) -> Result<RequestView, ItemFailure> {
        let record = self
            .requests
            .fetch(id)
            .map_err(|err| ItemFailure::Fail(format!("request lookup failed: {err}")))?
            .ok_or_else(|| ItemFailure::Skip("request not found".to_string()))?;

        if record.status != RequestStatus::Pending {
            return Err(ItemFailure::Skip(format!(
                "request is {}, expected pending",
                record.status.label()
            )));
        }

        let declaration = self
            .templates
            .find_declaration(&record.declaration_id)
            .map_err(|err| ItemFailure::Fail(format!("declaration lookup failed: {err}")))?
            .ok_or_else(|| ItemFailure::Skip("declaration not found".to_string()))?;

        let requester = self
            .directory
            .find_user(&record.user_id)
            .map_err(|err| ItemFailure::Fail(format!("profile lookup failed: {err}")))?
            .ok_or_else(|| ItemFailure::Skip("requester profile not found".to_string()))?;

        let now = self.clock.now();
        let context = placeholder::declaration_context(&requester, now.date_naive());
        let letter = Letter {
            title: declaration.title.clone(),
            body: placeholder::substitute(&declaration.body, &context),
            footer: placeholder::substitute(&declaration.footer, &context),
        };

        // The artifact never touches disk; the buffer is released on every
        // exit path when it goes out of scope.
        let artifact = self
            .renderer
            .render(&letter)
            .map_err(|err| ItemFailure::Fail(format!("document rendering failed: {err}")))?;

        let file_name = format!("{}_{}.pdf", id.0, now.timestamp_millis());
        let published = self
            .publisher
            .publish(&self.namespace, &file_name, artifact, ARTIFACT_CONTENT_TYPE)
            .map_err(|err| ItemFailure::Fail(format!("artifact publish failed: {err}")))?;

        let stored = self
            .requests
            .update(
                id,
                RequestUpdate {
                    status: Some(RequestStatus::Processing),
                    document_url: Some(published.signed_url),
                    generated_at: Some(now),
                    attendant_id: Some(attendant.clone()),
                },
            )
            .map_err(|err| ItemFailure::Fail(format!("request update failed: {err}")))?;

        Ok(stored.view())
    }
}
