use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::domain::{DeclarationId, RequestId, RequestStatus, UserId, UserProfile};
use super::policy::{self, PolicyViolation, RequiredRole};
use super::repository::{
    DirectoryStore, OwnRequestView, RepositoryError, RequestRecord, RequestRepository,
    RequestUpdate, RequestView, TemplateStore,
};

/// Time source seam so the recent-generation window is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Generated documents newer than this window count as recent.
pub const RECENT_GENERATION_WINDOW_DAYS: i64 = 7;

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

/// Service owning the request state machine and its access rules.
///
/// Generation is a separate pipeline; see
/// [`super::generation::BatchGenerationOrchestrator`].
pub struct RequestLifecycleService<R, D, T> {
    requests: Arc<R>,
    directory: Arc<D>,
    templates: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<R, D, T> RequestLifecycleService<R, D, T>
where
    R: RequestRepository + 'static,
    D: DirectoryStore + 'static,
    T: TemplateStore + 'static,
{
    pub fn new(requests: Arc<R>, directory: Arc<D>, templates: Arc<T>) -> Self {
        Self::with_clock(requests, directory, templates, Arc::new(SystemClock))
    }

    pub fn with_clock(
        requests: Arc<R>,
        directory: Arc<D>,
        templates: Arc<T>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            directory,
            templates,
            clock,
        }
    }

    fn caller_profile(&self, caller: &UserId) -> Result<UserProfile, RequestServiceError> {
        Ok(self
            .directory
            .find_user(caller)?
            .ok_or(RepositoryError::NotFound)?)
    }

    /// Every request in the system, newest submissions first.
    pub fn list_all_requests(
        &self,
        caller: &UserId,
    ) -> Result<Vec<RequestView>, RequestServiceError> {
        let profile = self.caller_profile(caller)?;
        policy::authorize(&profile, RequiredRole::Administrator)?;

        let mut records = self.requests.list_all()?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records.iter().map(RequestRecord::view).collect())
    }

    /// Requests whose document was generated inside the recent window,
    /// newest generations first.
    pub fn list_recent_generated(
        &self,
        caller: &UserId,
    ) -> Result<Vec<RequestView>, RequestServiceError> {
        let profile = self.caller_profile(caller)?;
        policy::authorize(&profile, RequiredRole::Administrator)?;

        let cutoff = self.clock.now() - Duration::days(RECENT_GENERATION_WINDOW_DAYS);
        let mut records = self.requests.list_generated_since(cutoff)?;
        records.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        Ok(records.iter().map(RequestRecord::view).collect())
    }

    /// Submit a new request for the caller, starting in `Pending`.
    pub fn create_request(
        &self,
        caller: &UserId,
        declaration: &DeclarationId,
    ) -> Result<RequestView, RequestServiceError> {
        let profile = self.caller_profile(caller)?;
        policy::authorize(&profile, RequiredRole::Requester)?;

        self.templates
            .find_declaration(declaration)?
            .ok_or(RepositoryError::NotFound)?;

        let record = RequestRecord {
            id: next_request_id(),
            user_id: profile.id,
            declaration_id: declaration.clone(),
            status: RequestStatus::Pending,
            created_at: self.clock.now(),
            generated_at: None,
            document_url: None,
            attendant_id: None,
        };

        let stored = self.requests.insert(record)?;
        Ok(stored.view())
    }

    /// The caller's own requests with the declaration title and attendant
    /// name resolved, newest submissions first.
    pub fn list_own_requests(
        &self,
        caller: &UserId,
    ) -> Result<Vec<OwnRequestView>, RequestServiceError> {
        let profile = self.caller_profile(caller)?;
        policy::authorize(&profile, RequiredRole::Requester)?;

        let mut records = self.requests.list_for_user(&profile.id)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let declaration_title = self
                .templates
                .find_declaration(&record.declaration_id)?
                .map(|declaration| declaration.title)
                .unwrap_or_default();
            let attendant_name = match &record.attendant_id {
                Some(id) => self
                    .directory
                    .find_user(id)?
                    .map(|attendant| attendant.name)
                    .unwrap_or_default(),
                None => String::new(),
            };
            views.push(record.own_view(declaration_title, attendant_name));
        }
        Ok(views)
    }

    /// Apply `target` to each eligible request and return the post-update
    /// views; ineligible ids are omitted, never reported as errors.
    ///
    /// Terminal records never move again, and a terminal target is only
    /// honored out of `Processing`.
    pub fn update_status(
        &self,
        caller: &UserId,
        ids: &[RequestId],
        target: RequestStatus,
    ) -> Result<Vec<RequestView>, RequestServiceError> {
        let profile = self.caller_profile(caller)?;
        policy::authorize(&profile, RequiredRole::Administrator)?;

        let mut updated = Vec::new();
        for id in ids {
            let Some(record) = self.requests.fetch(id)? else {
                debug!(request = %id.0, "status update skipped: request not found");
                continue;
            };
            if record.status.is_terminal() {
                continue;
            }
            if target.is_terminal() && record.status != RequestStatus::Processing {
                continue;
            }
            let stored = self.requests.update(id, RequestUpdate::status(target))?;
            updated.push(stored.view());
        }
        Ok(updated)
    }
}

/// Error raised by the lifecycle service facade.
#[derive(Debug, thiserror::Error)]
pub enum RequestServiceError {
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
