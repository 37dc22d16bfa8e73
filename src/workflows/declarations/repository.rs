use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Declaration, DeclarationId, RequestId, RequestStatus, UserId, UserProfile};

/// Persistent record for one declaration request.
///
/// `document_url` and `generated_at` are only populated together, when the
/// generation pipeline moves the request out of `Pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: RequestId,
    pub user_id: UserId,
    pub declaration_id: DeclarationId,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub generated_at: Option<DateTime<Utc>>,
    pub document_url: Option<String>,
    pub attendant_id: Option<UserId>,
}

impl RequestRecord {
    /// Administrative snapshot for listings and batch results.
    pub fn view(&self) -> RequestView {
        RequestView {
            request_id: self.id.clone(),
            user_id: self.user_id.clone(),
            declaration_id: self.declaration_id.clone(),
            status: self.status.label(),
            created_at: self.created_at,
            generated_at: self.generated_at,
            document_url: self.document_url.clone(),
            attendant_id: self.attendant_id.clone(),
        }
    }

    /// Requester-facing snapshot with human labels resolved by the service.
    pub fn own_view(&self, declaration_title: String, attendant_name: String) -> OwnRequestView {
        OwnRequestView {
            request_id: self.id.clone(),
            declaration_title,
            status: self.status.label(),
            created_at: self.created_at,
            document_url: self.document_url.clone(),
            attendant_name,
        }
    }
}

/// Field set applied by a single atomic update-by-id.
///
/// `None` leaves the stored value untouched; updates are last-writer-wins.
#[derive(Debug, Clone, Default)]
pub struct RequestUpdate {
    pub status: Option<RequestStatus>,
    pub document_url: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
    pub attendant_id: Option<UserId>,
}

impl RequestUpdate {
    pub fn status(status: RequestStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Administrative snapshot of a request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub request_id: RequestId,
    pub user_id: UserId,
    pub declaration_id: DeclarationId,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendant_id: Option<UserId>,
}

/// Requester-facing snapshot including the declaration title and the name of
/// the attendant who generated the document (empty until one is assigned).
#[derive(Debug, Clone, Serialize)]
pub struct OwnRequestView {
    pub request_id: RequestId,
    pub declaration_title: String,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    pub attendant_name: String,
}

/// Storage abstraction for request records.
///
/// `insert` owns the "at most one pending request per (user, declaration)
/// pair" constraint and reports a violation as [`RepositoryError::Conflict`],
/// so concurrent submitters race on the constraint rather than on a stale
/// existence check.
pub trait RequestRepository: Send + Sync {
    fn insert(&self, record: RequestRecord) -> Result<RequestRecord, RepositoryError>;
    fn update(
        &self,
        id: &RequestId,
        changes: RequestUpdate,
    ) -> Result<RequestRecord, RepositoryError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<RequestRecord>, RepositoryError>;
    fn list_all(&self) -> Result<Vec<RequestRecord>, RepositoryError>;
    fn list_for_user(&self, user: &UserId) -> Result<Vec<RequestRecord>, RepositoryError>;
    /// Records with a published document whose generation timestamp is
    /// strictly after `cutoff`. Ordering is the caller's concern.
    fn list_generated_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<RequestRecord>, RepositoryError>;
}

/// Error enumeration for repository and lookup failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("a pending request already exists for this user and declaration")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read-only directory resolving user ids to profiles.
pub trait DirectoryStore: Send + Sync {
    fn find_user(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;
}

/// Read-only store of declaration templates.
pub trait TemplateStore: Send + Sync {
    fn find_declaration(&self, id: &DeclarationId)
        -> Result<Option<Declaration>, RepositoryError>;
}

/// Time-limited link granting retrieval access to a published artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedArtifact {
    pub signed_url: String,
}

/// Outbound blob store accepting named byte buffers.
pub trait BlobPublisher: Send + Sync {
    fn publish(
        &self,
        namespace: &str,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<PublishedArtifact, PublishError>;
}

/// Blob publication failure.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("blob upload failed: {0}")]
    Backend(String),
    #[error("publisher runtime unavailable: {0}")]
    Runtime(String),
}
