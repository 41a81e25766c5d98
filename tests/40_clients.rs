mod common;

use std::time::Duration;

use anyhow::Result;
use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use common::{member, Harness};
use matchmaker_portal::routes::Destination;
use matchmaker_portal::screen::Screen;
use matchmaker_portal::session::ApprovalStatus;

#[derive(Deserialize)]
struct PageQuery {
    page: u32,
}

fn listing_route(body: Value) -> Router {
    Router::new().route(
        "/client",
        get(move |Query(query): Query<PageQuery>| async move {
            let mut body = body;
            if let Some(obj) = body.as_object_mut() {
                obj.insert("requestedPage".into(), json!(query.page));
            }
            Json(body)
        }),
    )
}

fn rows() -> Value {
    json!([
        { "clientId": 1, "clientName": "Park", "age": "31" },
        { "clientId": 2, "clientName": "Choi" }
    ])
}

#[tokio::test]
async fn every_listing_shape_decodes() -> Result<()> {
    let shapes = [
        (json!({ "data": { "content": rows(), "totalPages": 3 } }), 3),
        (json!({ "content": rows(), "totalPages": 2 }), 2),
        (json!({ "data": rows() }), 1),
        (rows(), 1),
    ];

    for (body, total_pages) in shapes {
        let base = common::spawn_backend(listing_route(body)).await?;
        let h = Harness::with_session(&base, member(ApprovalStatus::Approved))?;

        let page = h.client.list_clients(0).await?;
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.content[0].client_name, "Park");
        assert_eq!(page.total_pages, total_pages);
    }
    Ok(())
}

#[tokio::test]
async fn unexpected_listing_is_empty() -> Result<()> {
    let base = common::spawn_backend(listing_route(json!({ "data": { "rows": [] } }))).await?;
    let h = Harness::with_session(&base, member(ApprovalStatus::Approved))?;

    let page = h.client.list_clients(4).await?;
    assert!(page.content.is_empty());
    assert_eq!(page.total_pages, 1);
    Ok(())
}

#[tokio::test]
async fn leaving_the_screen_drops_the_late_response() -> Result<()> {
    let routes = Router::new().route(
        "/client",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(rows())
        }),
    );
    let base = common::spawn_backend(routes).await?;
    let h = Harness::with_session(&base, member(ApprovalStatus::Approved))?;

    let screen = Screen::activate(&h.ctx, Destination::ClientList).expect("approved member");
    let client = h.client.clone();
    let pending = screen.spawn(async move { client.list_clients(0).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    screen.leave();

    assert!(pending.await?.is_none());
    Ok(())
}

#[tokio::test]
async fn screen_effects_finish_while_active() -> Result<()> {
    let base = common::spawn_backend(listing_route(json!({ "content": rows(), "totalPages": 1 }))).await?;
    let h = Harness::with_session(&base, member(ApprovalStatus::Approved))?;

    let screen = Screen::activate(&h.ctx, Destination::ClientList).expect("approved member");
    let page = screen.run(h.client.list_clients(0)).await.expect("screen still active")?;
    assert_eq!(page.content.len(), 2);
    Ok(())
}
