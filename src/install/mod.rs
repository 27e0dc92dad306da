pub mod installer;

use reqwest::StatusCode;

pub use installer::install_for_all;

use crate::roster::UserId;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of one install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(UserId),
    /// Non-error status other than `201 Created`. Not counted as success.
    UnexpectedStatus(UserId, u16),
    Forbidden(UserId),
    /// The request could not complete, or the server answered with an error
    /// status other than 403.
    TransportError(UserId, String),
}

impl InstallOutcome {
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Installed(id)
            | Self::UnexpectedStatus(id, _)
            | Self::Forbidden(id)
            | Self::TransportError(id, _) => id,
        }
    }

    /// One progress line for this attempt.
    pub fn describe(&self, display_name: &str) -> String {
        match self {
            Self::Installed(id) => format!("App installed for user {id}"),
            Self::UnexpectedStatus(_, code) => {
                format!("Unexpected status code: {code} for user {display_name}")
            }
            Self::Forbidden(_) => {
                format!("HTTP error occurred for user {display_name}: 403 Forbidden")
            }
            Self::TransportError(_, message) => {
                format!("An error occurred for user {display_name}: {message}")
            }
        }
    }
}

/// Classify an answered install request.
pub fn classify(user_id: UserId, status: StatusCode, body: &str) -> InstallOutcome {
    if status == StatusCode::CREATED {
        InstallOutcome::Installed(user_id)
    } else if status == StatusCode::FORBIDDEN {
        InstallOutcome::Forbidden(user_id)
    } else if status.is_client_error() || status.is_server_error() {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        };
        InstallOutcome::TransportError(user_id, message)
    } else {
        InstallOutcome::UnexpectedStatus(user_id, status.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Member denied installation; needs the install permission granted by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenMember {
    pub user_id: UserId,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallCounts {
    pub installed: usize,
    pub unexpected: usize,
    pub forbidden: usize,
    pub failed: usize,
}

impl InstallCounts {
    pub fn total(&self) -> usize {
        self.installed + self.unexpected + self.forbidden + self.failed
    }
}

/// Everything one install phase produced, in completion order.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub outcomes: Vec<InstallOutcome>,
    pub responses: Vec<String>,
    pub forbidden: Vec<ForbiddenMember>,
    pub counts: InstallCounts,
}

impl InstallReport {
    /// Record one attempt: exactly one response line, and a forbidden entry
    /// for 403s.
    pub fn record(&mut self, outcome: InstallOutcome, display_name: &str) {
        match &outcome {
            InstallOutcome::Installed(_) => self.counts.installed += 1,
            InstallOutcome::UnexpectedStatus(..) => self.counts.unexpected += 1,
            InstallOutcome::Forbidden(id) => {
                self.counts.forbidden += 1;
                self.forbidden.push(ForbiddenMember {
                    user_id: id.clone(),
                    display_name: display_name.to_owned(),
                });
            }
            InstallOutcome::TransportError(..) => self.counts.failed += 1,
        }
        self.responses.push(outcome.describe(display_name));
        self.outcomes.push(outcome);
    }
}
