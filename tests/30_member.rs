mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use common::{member, Harness, SeenAuth};
use matchmaker_portal::api::ProfileCompletion;
use matchmaker_portal::routes::{Destination, Navigator};
use matchmaker_portal::session::ApprovalStatus;
use matchmaker_portal::PortalError;

fn form() -> ProfileCompletion {
    ProfileCompletion {
        pwd: String::new(),
        name: "Kim".into(),
        phone_number: "010-1234-5678".into(),
        gender: "FEMALE".into(),
        company: "Acme".into(),
    }
}

/// Completion endpoint that answers `status` and counts hits.
fn completion_route(status: StatusCode, hits: Arc<AtomicUsize>) -> Router {
    Router::new().route(
        "/member/detail/:id",
        post(move |headers: HeaderMap, body: String| async move {
            hits.fetch_add(1, Ordering::SeqCst);
            let multipart = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("multipart/form-data"));
            if !multipart || !body.contains("memberDetailRequestDto") || !body.contains("\"phoneNumber\"") {
                return StatusCode::BAD_REQUEST;
            }
            status
        }),
    )
}

#[tokio::test]
async fn accepted_submission_moves_none_to_pending() -> Result<()> {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = common::spawn_backend(completion_route(StatusCode::OK, hits.clone())).await?;
    let h = Harness::with_session(&base, member(ApprovalStatus::None))?;

    let session = h.client.complete_profile(&form()).await?;
    assert_eq!(session.approval_status, ApprovalStatus::Pending);
    assert_eq!(h.ctx.session()?, Some(session));
    assert_eq!(h.nav.current(), Some(Destination::PendingApproval));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn failed_submission_keeps_status() -> Result<()> {
    let hits = Arc::new(AtomicUsize::new(0));
    let base =
        common::spawn_backend(completion_route(StatusCode::INTERNAL_SERVER_ERROR, hits)).await?;
    let h = Harness::with_session(&base, member(ApprovalStatus::None))?;

    let err = h.client.complete_profile(&form()).await.unwrap_err();
    assert!(matches!(err, PortalError::Http { .. }));
    assert_eq!(
        h.ctx.session()?.map(|s| s.approval_status),
        Some(ApprovalStatus::None)
    );
    assert_eq!(h.nav.current(), None);
    Ok(())
}

#[tokio::test]
async fn invalid_form_is_never_sent() -> Result<()> {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = common::spawn_backend(completion_route(StatusCode::OK, hits.clone())).await?;
    let h = Harness::with_session(&base, member(ApprovalStatus::None))?;

    let bad = ProfileCompletion {
        pwd: "short".into(),
        company: String::new(),
        ..form()
    };
    match h.client.complete_profile(&bad).await {
        Err(PortalError::Validation { fields }) => {
            assert!(fields.contains_key("pwd"));
            assert!(fields.contains_key("company"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(
        h.ctx.session()?.map(|s| s.approval_status),
        Some(ApprovalStatus::None)
    );
    Ok(())
}

#[tokio::test]
async fn approved_member_update_does_not_regress_status() -> Result<()> {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = common::spawn_backend(completion_route(StatusCode::OK, hits)).await?;
    let h = Harness::with_session(&base, member(ApprovalStatus::Approved))?;

    let session = h.client.complete_profile(&form()).await?;
    assert_eq!(session.approval_status, ApprovalStatus::Approved);
    assert_eq!(
        h.ctx.session()?.map(|s| s.approval_status),
        Some(ApprovalStatus::Approved)
    );
    Ok(())
}

#[tokio::test]
async fn anonymous_cannot_submit() -> Result<()> {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = common::spawn_backend(completion_route(StatusCode::OK, hits.clone())).await?;
    let h = Harness::anonymous(&base)?;

    let err = h.client.complete_profile(&form()).await.unwrap_err();
    assert!(matches!(err, PortalError::Anonymous));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn own_profile_is_fetched_by_member_id() -> Result<()> {
    let seen = SeenAuth::default();
    let recorder = seen.clone();
    let routes = Router::new().route(
        "/member/detail/me",
        get(
            move |headers: HeaderMap,
                  axum::extract::Query(query): axum::extract::Query<
                std::collections::HashMap<String, String>,
            >| async move {
                recorder.record(&headers);
                let id: i64 = query.get("memberId").and_then(|v| v.parse().ok()).unwrap_or(0);
                Json(json!({
                    "data": { "id": id, "email": "kim@example.com", "name": "Kim" }
                }))
            },
        ),
    );
    let base = common::spawn_backend(routes).await?;
    let h = Harness::with_session(&base, member(ApprovalStatus::Approved))?;

    let profile = h.client.my_profile().await?;
    assert_eq!(profile.id, 5);
    assert_eq!(profile.email, "kim@example.com");
    assert_eq!(seen.all(), vec![Some("Bearer member-token".to_string())]);
    Ok(())
}
