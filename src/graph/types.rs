use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Channel members (roster source)
// ---------------------------------------------------------------------------

/// One page of `GET /teams/{team}/channels/{channel}/members`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberPage {
    #[serde(default)]
    pub value: Vec<ChannelMember>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// A conversation member. Only user members carry a `userId`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMember {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// User lookup (attribute source)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct UserDepartment {
    #[serde(default)]
    pub department: Option<String>,
}

// ---------------------------------------------------------------------------
// App installation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct InstallAppRequest<'a> {
    #[serde(rename = "teamsApp@odata.bind")]
    pub teams_app_bind: &'a str,
}

/// Raw answer to an install request; classification happens in `install`.
#[derive(Debug, Clone)]
pub struct InstallResponse {
    pub status: reqwest::StatusCode,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Token endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
