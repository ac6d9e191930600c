use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use immo_core::config::{ConfigOverrides, LoadOptions};
use immo_core::selection::SelectionMode;
use immo_db::{migrations, DbPool, DemoListings};
use immo_server::{app_router, bootstrap::bootstrap};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct Harness {
    router: Router,
    pool: DbPool,
    _store: TempDir,
}

/// Router over a file-backed store so every pooled connection sees the same demo rows.
async fn seeded_router(mode: SelectionMode) -> Harness {
    let store = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", store.path().join("immo.db").display());
    let app = bootstrap(LoadOptions {
        overrides: ConfigOverrides {
            database_url: Some(url),
            selection_mode: Some(mode),
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    })
    .await
    .expect("bootstrap");

    migrations::run_pending(&app.db_pool).await.expect("migrations");
    DemoListings::load(&app.db_pool).await.expect("demo listings");

    Harness { router: app_router(&app), pool: app.db_pool.clone(), _store: store }
}

async fn post_webhook(router: &Router, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post("/webhook")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("router response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn webhook_runs_city_filter_and_records_result_ids() {
    let Harness { router, pool, _store } = seeded_router(SelectionMode::Ordinal).await;

    let (status, body) = post_webhook(
        &router,
        json!({
            "next_action": "action_filter_houses_by_city",
            "sender_id": "visitor-42",
            "tracker": {"sender_id": "visitor-42", "slots": {"city": "paris"}}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let text = body["responses"][0]["text"].as_str().expect("text");
    assert!(text.starts_with("Maisons disponibles à Paris :\n1- Studio Montmartre"));
    assert_eq!(
        body["events"],
        json!([{"event": "slot", "timestamp": null, "name": "listing_result_ids", "value": [4, 5]}])
    );

    pool.close().await;
}

#[tokio::test]
async fn webhook_selection_follows_rendered_order() {
    let Harness { router, pool, _store } = seeded_router(SelectionMode::Ordinal).await;

    let (status, body) = post_webhook(
        &router,
        json!({
            "next_action": "action_select_house",
            "tracker": {"slots": {"listing_result_ids": [4, 5], "house_choice": "2"}}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let events = body["events"].as_array().expect("events");
    assert_eq!(events.len(), 5);
    assert_eq!(events[0]["name"], "selected_house_id");
    assert_eq!(events[0]["value"], 5);
    assert_eq!(events[1]["value"], "Appartement T3 Bastille");

    pool.close().await;
}

#[tokio::test]
async fn webhook_invalid_room_count_resets_slot() {
    let Harness { router, pool, _store } = seeded_router(SelectionMode::PrimaryKey).await;

    let (status, body) = post_webhook(
        &router,
        json!({
            "next_action": "action_filter_by_house_size",
            "tracker": {"slots": {"num_rooms": "quelques"}}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["responses"],
        json!([{"text": "Veuillez spécifier un nombre valide de chambres."}])
    );
    assert_eq!(
        body["events"],
        json!([{"event": "slot", "timestamp": null, "name": "num_rooms", "value": null}])
    );

    pool.close().await;
}

#[tokio::test]
async fn webhook_unknown_action_is_not_found() {
    let Harness { router, pool, _store } = seeded_router(SelectionMode::Ordinal).await;

    let (status, body) =
        post_webhook(&router, json!({"next_action": "action_book_visit", "sender_id": "v-1"}))
            .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No registered action found for name 'action_book_visit'.");
    assert_eq!(body["action_name"], "action_book_visit");
    assert_eq!(body["correlation_id"], "v-1");

    pool.close().await;
}

#[tokio::test]
async fn webhook_rejects_blank_action_name() {
    let Harness { router, pool, _store } = seeded_router(SelectionMode::Ordinal).await;

    let (status, body) = post_webhook(&router, json!({"next_action": "  "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["correlation_id"].as_str().expect("correlation id").starts_with("anon-"));

    pool.close().await;
}

#[tokio::test]
async fn actions_route_lists_registered_names() {
    let Harness { router, pool, _store } = seeded_router(SelectionMode::Ordinal).await;

    let response = router
        .clone()
        .oneshot(Request::get("/actions").body(Body::empty()).expect("request"))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    let names = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|entry| entry["name"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(names.len(), 7);
    assert!(names.contains(&"action_list_houses_for_sale"));

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);

    pool.close().await;
}
