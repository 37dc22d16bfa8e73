use chrono::Duration;

use super::common::*;
use crate::workflows::declarations::domain::{DeclarationId, RequestId, RequestStatus, UserId};
use crate::workflows::declarations::policy::PolicyViolation;
use crate::workflows::declarations::repository::{
    RepositoryError, RequestRepository, RequestUpdate,
};
use crate::workflows::declarations::service::RequestServiceError;

#[test]
fn create_request_rejects_admin_callers() {
    let fixture = fixture();

    match fixture
        .lifecycle
        .create_request(&admin().id, &enrollment_id())
    {
        Err(RequestServiceError::Policy(PolicyViolation::RequesterOnly)) => {}
        other => panic!("expected requester-only violation, got {other:?}"),
    }
}

#[test]
fn create_request_requires_existing_declaration() {
    let fixture = fixture();
    let missing = DeclarationId("decl-ghost".to_string());

    match fixture.lifecycle.create_request(&requester().id, &missing) {
        Err(RequestServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn create_request_starts_pending_without_artifact() {
    let fixture = fixture();

    let view = fixture
        .lifecycle
        .create_request(&requester().id, &enrollment_id())
        .expect("request created");

    assert_eq!(view.status, RequestStatus::Pending.label());
    assert!(view.document_url.is_none());
    assert!(view.generated_at.is_none());
    assert!(view.attendant_id.is_none());

    let stored = fixture
        .requests
        .fetch(&view.request_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, RequestStatus::Pending);
    assert!(stored.document_url.is_none() && stored.generated_at.is_none());
}

#[test]
fn create_request_conflicts_on_duplicate_pending_pair() {
    let fixture = fixture();

    fixture
        .lifecycle
        .create_request(&requester().id, &enrollment_id())
        .expect("first request created");

    match fixture
        .lifecycle
        .create_request(&requester().id, &enrollment_id())
    {
        Err(RequestServiceError::Repository(RepositoryError::Conflict)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn unknown_callers_are_not_found() {
    let fixture = fixture();
    let ghost = UserId("usr-ghost".to_string());

    match fixture.lifecycle.list_own_requests(&ghost) {
        Err(RequestServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn list_all_requires_admin() {
    let fixture = fixture();

    match fixture.lifecycle.list_all_requests(&requester().id) {
        Err(RequestServiceError::Policy(PolicyViolation::AdministratorOnly)) => {}
        other => panic!("expected administrator-only violation, got {other:?}"),
    }
}

#[test]
fn list_all_orders_newest_submissions_first() {
    let fixture = fixture();

    let first = fixture
        .lifecycle
        .create_request(&requester().id, &enrollment_id())
        .expect("first request created");
    fixture.clock.set(base_instant() + Duration::minutes(5));
    let second = fixture
        .lifecycle
        .create_request(&second_requester().id, &enrollment_id())
        .expect("second request created");

    let listed = fixture
        .lifecycle
        .list_all_requests(&admin().id)
        .expect("admin listing succeeds");

    let ids: Vec<RequestId> = listed.into_iter().map(|view| view.request_id).collect();
    assert_eq!(ids, vec![second.request_id, first.request_id]);
}

#[test]
fn list_own_requires_non_admin() {
    let fixture = fixture();

    match fixture.lifecycle.list_own_requests(&admin().id) {
        Err(RequestServiceError::Policy(PolicyViolation::RequesterOnly)) => {}
        other => panic!("expected requester-only violation, got {other:?}"),
    }
}

#[test]
fn list_own_resolves_labels_and_defaults_attendant_to_empty() {
    let fixture = fixture();

    fixture
        .lifecycle
        .create_request(&requester().id, &enrollment_id())
        .expect("request created");

    let own = fixture
        .lifecycle
        .list_own_requests(&requester().id)
        .expect("own listing succeeds");

    assert_eq!(own.len(), 1);
    assert_eq!(own[0].declaration_title, "Declaração de Matrícula");
    assert_eq!(own[0].attendant_name, "");
    assert_eq!(own[0].status, RequestStatus::Pending.label());
}

#[test]
fn update_status_requires_admin() {
    let fixture = fixture();

    match fixture
        .lifecycle
        .update_status(&requester().id, &[], RequestStatus::Completed)
    {
        Err(RequestServiceError::Policy(PolicyViolation::AdministratorOnly)) => {}
        other => panic!("expected administrator-only violation, got {other:?}"),
    }
}

#[test]
fn update_status_completes_processing_requests() {
    let fixture = fixture();

    let view = fixture
        .lifecycle
        .create_request(&requester().id, &enrollment_id())
        .expect("request created");
    let ids = vec![view.request_id.clone()];

    let moved = fixture
        .lifecycle
        .update_status(&admin().id, &ids, RequestStatus::Processing)
        .expect("pending moves to processing");
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].status, RequestStatus::Processing.label());

    let completed = fixture
        .lifecycle
        .update_status(&admin().id, &ids, RequestStatus::Completed)
        .expect("processing moves to completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].status, RequestStatus::Completed.label());
}

#[test]
fn update_status_blocks_pending_to_terminal() {
    let fixture = fixture();

    let view = fixture
        .lifecycle
        .create_request(&requester().id, &enrollment_id())
        .expect("request created");
    let ids = vec![view.request_id.clone()];

    let result = fixture
        .lifecycle
        .update_status(&admin().id, &ids, RequestStatus::Rejected)
        .expect("call succeeds");
    assert!(result.is_empty(), "pending request must not jump to terminal");

    let stored = fixture
        .requests
        .fetch(&view.request_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, RequestStatus::Pending);
}

#[test]
fn update_status_is_idempotent_on_terminal_requests() {
    let fixture = fixture();

    let view = fixture
        .lifecycle
        .create_request(&requester().id, &enrollment_id())
        .expect("request created");
    let ids = vec![view.request_id.clone()];

    fixture
        .lifecycle
        .update_status(&admin().id, &ids, RequestStatus::Processing)
        .expect("moves to processing");
    fixture
        .lifecycle
        .update_status(&admin().id, &ids, RequestStatus::Rejected)
        .expect("moves to rejected");

    let retried = fixture
        .lifecycle
        .update_status(&admin().id, &ids, RequestStatus::Completed)
        .expect("call succeeds");
    assert!(retried.is_empty(), "terminal request must be omitted");

    let stored = fixture
        .requests
        .fetch(&view.request_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, RequestStatus::Rejected);
}

#[test]
fn update_status_skips_unknown_ids() {
    let fixture = fixture();

    let result = fixture
        .lifecycle
        .update_status(
            &admin().id,
            &[RequestId("req-ghost".to_string())],
            RequestStatus::Processing,
        )
        .expect("call succeeds");
    assert!(result.is_empty());
}

#[test]
fn list_recent_generated_applies_seven_day_window() {
    let fixture = fixture();
    let now = base_instant();

    let inside = fixture
        .lifecycle
        .create_request(&requester().id, &enrollment_id())
        .expect("inside-window request created");
    let outside = fixture
        .lifecycle
        .create_request(&second_requester().id, &enrollment_id())
        .expect("outside-window request created");

    fixture
        .requests
        .update(
            &inside.request_id,
            RequestUpdate {
                status: Some(RequestStatus::Processing),
                document_url: Some("https://files.internal/declarations/a.pdf".to_string()),
                generated_at: Some(now - Duration::days(6)),
                attendant_id: Some(admin().id),
            },
        )
        .expect("inside record updated");
    fixture
        .requests
        .update(
            &outside.request_id,
            RequestUpdate {
                status: Some(RequestStatus::Processing),
                document_url: Some("https://files.internal/declarations/b.pdf".to_string()),
                generated_at: Some(now - Duration::days(7) - Duration::seconds(1)),
                attendant_id: Some(admin().id),
            },
        )
        .expect("outside record updated");

    let recent = fixture
        .lifecycle
        .list_recent_generated(&admin().id)
        .expect("recent listing succeeds");

    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].request_id, inside.request_id);
}

#[test]
fn list_recent_generated_requires_admin() {
    let fixture = fixture();

    match fixture.lifecycle.list_recent_generated(&requester().id) {
        Err(RequestServiceError::Policy(PolicyViolation::AdministratorOnly)) => {}
        other => panic!("expected administrator-only violation, got {other:?}"),
    }
}
