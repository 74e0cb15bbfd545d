use thiserror::Error;

/// Failure reported by a source or mirror client.
///
/// `NotFound` is the only variant callers recover from; everything else is
/// fatal to a sync run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("{operation} failed with status {status}: {body}")]
    Api {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response while {operation}: {detail}")]
    Parse { operation: String, detail: String },

    #[error("authentication failed: {0}")]
    Auth(String),
}

impl SourceError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        SourceError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn parse(operation: impl Into<String>, detail: impl ToString) -> Self {
        SourceError::Parse {
            operation: operation.into(),
            detail: detail.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }

    /// Structured status code, when the failure came from an HTTP response
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::NotFound { .. } => Some(404),
            SourceError::Api { status, .. } => Some(*status),
            SourceError::Http(e) => e.status().map(|s| s.as_u16()),
            SourceError::Parse { .. } | SourceError::Auth(_) => None,
        }
    }
}

/// Classify a non-success response. 404 becomes `NotFound`.
pub(crate) async fn check_response(
    response: reqwest::Response,
    operation: &str,
    resource: &str,
) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(SourceError::not_found(resource));
    }
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Api {
        operation: operation.to_string(),
        status: status.as_u16(),
        body,
    })
}
