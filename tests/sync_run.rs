mod helpers;

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roster_sync::error::SyncError;
use roster_sync::graph::GraphError;
use roster_sync::sync::{SyncContext, run_once};

use helpers::{FailingStore, MemoryRosterStore};

fn context<S>(server: &MockServer, store: S) -> SyncContext<S> {
    SyncContext {
        config: Arc::new(helpers::test_config(server)),
        http: reqwest::Client::new(),
        store,
    }
}

async fn mount_graph(server: &MockServer) {
    helpers::mount_token(server).await;
    Mock::given(method("GET"))
        .and(path(helpers::MEMBERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(helpers::page(
            vec![helpers::member("u2", "Grace"), helpers::member("u1", "Ada")],
            Some(helpers::page_link(server, 2)),
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(helpers::page(
            vec![helpers::member("u3", "Linus"), helpers::member("u1", "Ada L.")],
            None,
        )))
        .mount(server)
        .await;
    helpers::mount_department(server, "u1", Some("Engineering")).await;
    helpers::mount_department(server, "u2", Some("Research")).await;
    Mock::given(method("GET"))
        .and(path("/users/u3"))
        .respond_with(ResponseTemplate::new(503))
        .mount(server)
        .await;
    helpers::mount_install(server, "u1", 201).await;
    helpers::mount_install(server, "u2", 403).await;
    helpers::mount_install(server, "u3", 201).await;
}

#[tokio::test]
async fn full_run_persists_and_installs() {
    let server = MockServer::start().await;
    mount_graph(&server).await;
    let store = MemoryRosterStore::default();
    let ctx = context(&server, store.clone());

    let summary = run_once(&ctx).await.unwrap();

    assert_eq!(summary.members, 3);
    assert_eq!(summary.with_department, 2);
    assert_eq!(summary.rows_written, 3);
    assert_eq!(summary.install.installed, 2);
    assert_eq!(summary.install.forbidden, 1);
    assert_eq!(summary.forbidden.len(), 1);
    assert_eq!(summary.forbidden[0].user_id.as_str(), "u2");
    assert_eq!(summary.forbidden[0].display_name, "Grace");

    let rows = store.rows();
    let ids: Vec<_> = rows.iter().map(|r| r.user_id.as_str()).collect();
    assert_eq!(ids, ["u1", "u2", "u3"]);
    assert_eq!(rows[0].display_name, "Ada L.");
    assert_eq!(rows[0].department.as_deref(), Some("Engineering"));
    assert_eq!(rows[2].department, None);
}

#[tokio::test]
async fn repeated_runs_produce_identical_roster() {
    let server = MockServer::start().await;
    mount_graph(&server).await;
    let store = MemoryRosterStore::default();
    let ctx = context(&server, store.clone());

    let first = run_once(&ctx).await.unwrap();
    let first_rows = store.rows();
    let second = run_once(&ctx).await.unwrap();
    let second_rows = store.rows();

    assert_eq!(first_rows, second_rows);
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.install, second.install);
}

#[tokio::test]
async fn token_failure_aborts_before_roster_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(helpers::TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"error":"invalid_client"}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryRosterStore::default();
    let err = run_once(&context(&server, store.clone())).await.unwrap_err();

    assert!(
        matches!(err, SyncError::Auth(GraphError::Status { status: 401, .. })),
        "unexpected error: {err:?}"
    );
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn first_page_failure_writes_nothing() {
    let server = MockServer::start().await;
    helpers::mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(helpers::MEMBERS_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/u1/teamwork/installedApps"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryRosterStore::default();
    let err = run_once(&context(&server, store.clone())).await.unwrap_err();

    assert!(matches!(err, SyncError::FatalFetch(_)));
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn persistence_failure_skips_installation() {
    let server = MockServer::start().await;
    helpers::mount_token(&server).await;
    helpers::mount_page(
        &server,
        helpers::MEMBERS_PATH,
        helpers::page(vec![helpers::member("u1", "Ada")], None),
    )
    .await;
    helpers::mount_department(&server, "u1", Some("Engineering")).await;
    Mock::given(method("POST"))
        .and(path("/users/u1/teamwork/installedApps"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = run_once(&context(&server, FailingStore)).await.unwrap_err();
    assert!(matches!(err, SyncError::Persistence(_)));
}
