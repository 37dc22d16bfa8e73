//! Declaration request intake, administrative review, and batch document
//! generation.
//!
//! The lifecycle service owns the request state machine (pending →
//! processing → completed/rejected); the generation orchestrator turns
//! pending requests into published PDF letters. External collaborators
//! (directory, template store, blob store) are traits in [`repository`].

pub mod domain;
pub mod drive;
pub mod generation;
pub mod policy;
pub mod render;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Declaration, DeclarationId, IdentityDocuments, PostalAddress, RequestId, RequestStatus,
    UserId, UserProfile,
};
pub use drive::DriveBlobPublisher;
pub use generation::{
    BatchGenerationOrchestrator, BatchGenerationReport, BatchItemOutcome, BatchOutcome,
};
pub use policy::{authorize, PolicyViolation, RequiredRole};
pub use render::{Letter, LetterRenderer, PageLayout, RenderError};
pub use repository::{
    BlobPublisher, DirectoryStore, OwnRequestView, PublishError, PublishedArtifact,
    RepositoryError, RequestRecord, RequestRepository, RequestUpdate, RequestView, TemplateStore,
};
pub use router::{declaration_router, DeclarationState, CALLER_HEADER};
pub use service::{Clock, RequestLifecycleService, RequestServiceError, SystemClock};
