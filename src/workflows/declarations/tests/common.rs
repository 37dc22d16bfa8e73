use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::infra::{
    demo_admin, demo_enrollment_declaration, demo_requester, demo_templates, MemoryBlobPublisher,
    MemoryDirectory, MemoryRequestRepository, MemoryTemplates,
};
use crate::workflows::declarations::domain::{
    DeclarationId, IdentityDocuments, PostalAddress, RequestId, RequestStatus, UserId,
    UserProfile,
};
use crate::workflows::declarations::generation::BatchGenerationOrchestrator;
use crate::workflows::declarations::repository::{
    BlobPublisher, PublishError, PublishedArtifact, RequestRecord,
};
use crate::workflows::declarations::service::{Clock, RequestLifecycleService};

pub(super) const NAMESPACE: &str = "declarations";

pub(super) fn admin() -> UserProfile {
    demo_admin()
}

pub(super) fn requester() -> UserProfile {
    demo_requester()
}

pub(super) fn second_requester() -> UserProfile {
    UserProfile {
        id: UserId("usr-000391".to_string()),
        name: "Carla Menezes".to_string(),
        address: PostalAddress {
            street: "Rua Padre Eustáquio".to_string(),
            house_number: "1020".to_string(),
            complement: None,
            neighborhood: "Carlos Prates".to_string(),
            city: "Belo Horizonte".to_string(),
            state: "MG".to_string(),
            postal_code: "30710-580".to_string(),
        },
        documents: IdentityDocuments {
            rg: "MG-5.432.109".to_string(),
            cpf: "321.654.987-00".to_string(),
            issuing_agency: "SSP-MG".to_string(),
        },
        is_admin: false,
    }
}

pub(super) fn enrollment_id() -> DeclarationId {
    demo_enrollment_declaration().id
}

pub(super) fn base_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0)
        .single()
        .expect("valid instant")
}

/// Adjustable clock so window and timestamp assertions are deterministic.
pub(super) struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(super) fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub(super) fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock mutex poisoned") = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub(super) struct Fixture {
    pub(super) requests: Arc<MemoryRequestRepository>,
    pub(super) directory: Arc<MemoryDirectory>,
    pub(super) templates: Arc<MemoryTemplates>,
    pub(super) publisher: Arc<MemoryBlobPublisher>,
    pub(super) clock: Arc<FixedClock>,
    pub(super) lifecycle:
        Arc<RequestLifecycleService<MemoryRequestRepository, MemoryDirectory, MemoryTemplates>>,
    pub(super) generator: Arc<
        BatchGenerationOrchestrator<
            MemoryRequestRepository,
            MemoryDirectory,
            MemoryTemplates,
            MemoryBlobPublisher,
        >,
    >,
}

pub(super) fn fixture() -> Fixture {
    let requests = Arc::new(MemoryRequestRepository::default());
    let directory = Arc::new(MemoryDirectory::with_users([
        admin(),
        requester(),
        second_requester(),
    ]));
    let templates = Arc::new(demo_templates());
    let publisher = Arc::new(MemoryBlobPublisher::default());
    let clock = FixedClock::at(base_instant());

    let lifecycle = Arc::new(RequestLifecycleService::with_clock(
        requests.clone(),
        directory.clone(),
        templates.clone(),
        clock.clone(),
    ));
    let generator = Arc::new(BatchGenerationOrchestrator::with_clock(
        requests.clone(),
        directory.clone(),
        templates.clone(),
        publisher.clone(),
        NAMESPACE,
        clock.clone(),
    ));

    Fixture {
        requests,
        directory,
        templates,
        publisher,
        clock,
        lifecycle,
        generator,
    }
}

/// Pending record inserted behind the service's back, for shaping edge cases
/// the facade refuses to create (e.g. an orphaned declaration reference).
pub(super) fn pending_record(
    id: &str,
    user: &UserId,
    declaration: &DeclarationId,
    created_at: DateTime<Utc>,
) -> RequestRecord {
    RequestRecord {
        id: RequestId(id.to_string()),
        user_id: user.clone(),
        declaration_id: declaration.clone(),
        status: RequestStatus::Pending,
        created_at,
        generated_at: None,
        document_url: None,
        attendant_id: None,
    }
}

/// Publisher that refuses uploads whose file name starts with a marker,
/// delegating everything else to an in-memory publisher.
pub(super) struct SelectivePublisher {
    pub(super) inner: MemoryBlobPublisher,
    pub(super) fail_prefix: String,
}

impl BlobPublisher for SelectivePublisher {
    fn publish(
        &self,
        namespace: &str,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<PublishedArtifact, PublishError> {
        if file_name.starts_with(&self.fail_prefix) {
            return Err(PublishError::Backend("storage unavailable".to_string()));
        }
        self.inner.publish(namespace, file_name, bytes, content_type)
    }
}
