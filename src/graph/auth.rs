use std::fmt;
use std::sync::Arc;

use url::form_urlencoded;

use super::error::GraphError;
use super::types::TokenResponse;
use crate::config::Config;

/// Bearer token used as-is for every Graph request of one run.
#[derive(Clone)]
pub struct AccessToken(Arc<str>);

impl AccessToken {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Run the client-credential grant against `{login}/{tenant}/oauth2/v2.0/token`.
///
/// One call per sync run; there is no caching or refresh.
#[tracing::instrument(skip_all, fields(tenant_id = %config.tenant_id), err)]
pub async fn acquire_token(
    http: &reqwest::Client,
    config: &Config,
) -> Result<AccessToken, GraphError> {
    let mut url = config.login_base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend([config.tenant_id.as_str(), "oauth2", "v2.0", "token"]);
    }

    let form = form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", &config.client_id)
        .append_pair("client_secret", &config.client_secret)
        .append_pair("scope", &config.token_scope)
        .append_pair("grant_type", "client_credentials")
        .finish();

    let resp = http
        .post(url)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(form)
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

    let token: TokenResponse = resp
        .json()
        .await
        .map_err(|e| GraphError::Decode(e.to_string()))?;
    tracing::debug!(expires_in = token.expires_in, "access token acquired");

    Ok(AccessToken::new(token.access_token))
}
