pub mod auth;
pub mod error;
pub mod types;

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

pub use auth::AccessToken;
pub use error::GraphError;

use crate::roster::UserId;
use types::{InstallAppRequest, InstallResponse, MemberPage, UserDepartment};

/// Build the shared HTTP client. No timeout unless one is configured.
pub fn http_client(timeout: Option<Duration>) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Microsoft Graph client bound to one access token.
///
/// Cheap to clone: the HTTP client and token are reference counted, so each
/// pooled task takes its own copy.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
    token: AccessToken,
}

impl GraphClient {
    pub fn new(http: reqwest::Client, base_url: Url, token: AccessToken) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// `{base}/seg/seg/...`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn members_url(&self, team_id: &str, channel_id: &str) -> Url {
        self.endpoint(&["teams", team_id, "channels", channel_id, "members"])
    }

    /// Value for the `teamsApp@odata.bind` field of an install request.
    pub fn app_catalog_bind(&self, app_id: &str) -> String {
        self.endpoint(&["appCatalogs", "teamsApps", app_id]).into()
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GraphError> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(self.token.secret())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GraphError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| GraphError::Decode(e.to_string()))
    }

    /// Fetch one roster page. `link` is either the collection URL or an
    /// opaque continuation link returned by a previous page.
    pub async fn member_page(&self, link: &str) -> Result<MemberPage, GraphError> {
        let url = Url::parse(link).map_err(|e| GraphError::InvalidLink {
            link: link.to_owned(),
            reason: e.to_string(),
        })?;
        self.get_json(url).await
    }

    /// Look up one user's department. `Ok(None)` when the user has none set.
    pub async fn user_department(&self, user_id: &UserId) -> Result<Option<String>, GraphError> {
        let mut url = self.endpoint(&["users", user_id.as_str()]);
        url.query_pairs_mut().append_pair("$select", "department");
        let user: UserDepartment = self.get_json(url).await?;
        Ok(user.department)
    }

    /// Install an app for a user. Any HTTP answer is returned for the caller
    /// to classify; only transport failures are errors.
    pub async fn install_app(
        &self,
        user_id: &UserId,
        app_bind: &str,
    ) -> Result<InstallResponse, GraphError> {
        let url = self.endpoint(&["users", user_id.as_str(), "teamwork", "installedApps"]);
        let resp = self
            .http
            .post(url)
            .bearer_auth(self.token.secret())
            .json(&InstallAppRequest {
                teams_app_bind: app_bind,
            })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Ok(InstallResponse { status, body })
    }
}
