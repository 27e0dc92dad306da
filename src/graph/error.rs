#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid link {link:?}: {reason}")]
    InvalidLink { link: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        let err = GraphError::Status {
            status: 403,
            body: "Forbidden".into(),
        };
        assert_eq!(err.to_string(), "HTTP 403: Forbidden");
    }

    #[test]
    fn invalid_link_display() {
        let err = GraphError::InvalidLink {
            link: "not a url".into(),
            reason: "relative URL without a base".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"invalid link "not a url": relative URL without a base"#
        );
    }
}
