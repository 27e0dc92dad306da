#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roster_sync::config::Config;
use roster_sync::graph::{AccessToken, GraphClient};
use roster_sync::roster::{ChannelScope, MemberRecord};
use roster_sync::store::RosterStore;

pub const TOKEN: &str = "test-token";
pub const TEAM_ID: &str = "team-1";
pub const CHANNEL_ID: &str = "chan-1";
pub const APP_ID: &str = "app-1";
pub const TENANT_ID: &str = "tenant-1";
pub const MEMBERS_PATH: &str = "/teams/team-1/channels/chan-1/members";
pub const TOKEN_PATH: &str = "/tenant-1/oauth2/v2.0/token";

/// In-process store holding the last written roster.
#[derive(Debug, Clone, Default)]
pub struct MemoryRosterStore {
    rows: Arc<Mutex<Vec<MemberRecord>>>,
}

impl MemoryRosterStore {
    pub fn rows(&self) -> Vec<MemberRecord> {
        self.rows.lock().unwrap().clone()
    }
}

impl RosterStore for MemoryRosterStore {
    async fn replace_all(&self, members: &[MemberRecord]) -> Result<u64, sqlx::Error> {
        let mut rows = self.rows.lock().unwrap();
        *rows = members.to_vec();
        Ok(rows.len() as u64)
    }
}

/// Store that refuses every write, as a database in the middle of a failover would.
pub struct FailingStore;

impl RosterStore for FailingStore {
    async fn replace_all(&self, _members: &[MemberRecord]) -> Result<u64, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }
}

/// Config pointing both Graph and the login endpoint at `server`.
pub fn test_config(server: &MockServer) -> Config {
    let vars = HashMap::from([
        ("TENANT_ID", TENANT_ID.to_owned()),
        ("CLIENT_ID", "client-1".to_owned()),
        ("CLIENT_SECRET", "secret-1".to_owned()),
        ("TEAM_ID", TEAM_ID.to_owned()),
        ("CHANNEL_ID", CHANNEL_ID.to_owned()),
        ("TEAMS_APP_ID", APP_ID.to_owned()),
        ("GRAPH_BASE_URL", server.uri()),
        ("LOGIN_BASE_URL", server.uri()),
        ("SYNC_WORKERS", "10".to_owned()),
    ]);
    Config::from_lookup(|name| vars.get(name).cloned()).expect("test config")
}

pub fn scope() -> ChannelScope {
    ChannelScope {
        team_id: TEAM_ID.into(),
        channel_id: CHANNEL_ID.into(),
    }
}

pub fn graph_client(server: &MockServer) -> GraphClient {
    graph_client_with(server, reqwest::Client::new())
}

pub fn graph_client_with(server: &MockServer, http: reqwest::Client) -> GraphClient {
    GraphClient::new(
        http,
        Url::parse(&server.uri()).expect("mock server uri"),
        AccessToken::new(TOKEN),
    )
}

pub fn member(user_id: &str, display_name: &str) -> Value {
    json!({
        "@odata.type": "#microsoft.graph.aadUserConversationMember",
        "id": format!("membership-{user_id}"),
        "roles": [],
        "userId": user_id,
        "displayName": display_name,
        "email": format!("{user_id}@contoso.example"),
    })
}

pub fn page(members: Vec<Value>, next_link: Option<String>) -> Value {
    let mut body = json!({ "value": members });
    if let Some(link) = next_link {
        body["@odata.nextLink"] = Value::String(link);
    }
    body
}

/// Continuation link served by the mock server at `/pages/{n}`.
pub fn page_link(server: &MockServer, n: u32) -> String {
    format!("{}/pages/{n}?$skiptoken=token-{n}", server.uri())
}

/// Mount a `GET {path}` answering `body`, expected exactly once.
pub async fn mount_page(server: &MockServer, at: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_department(server: &MockServer, user_id: &str, department: Option<&str>) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{user_id}")))
        .and(wiremock::matchers::query_param("$select", "department"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "department": department })),
        )
        .mount(server)
        .await;
}

pub async fn mount_install(server: &MockServer, user_id: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(format!("/users/{user_id}/teamwork/installedApps")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(wiremock::matchers::body_string_contains(
            "grant_type=client_credentials",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": TOKEN,
        })))
        .mount(server)
        .await;
}
