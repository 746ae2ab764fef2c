pub mod client;

pub use client::StationApiClient;

/// Failures talking to a vendor API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unparseable response: {0}")]
    Parse(String),

    #[error("API returned an HTML page instead of data")]
    HtmlPage,
}

impl ApiError {
    /// Upstream HTTP status, if the vendor answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Looks for an [`ApiError`] anywhere in the chain
pub fn api_error(err: &anyhow::Error) -> Option<&ApiError> {
    err.chain().find_map(|e| e.downcast_ref::<ApiError>())
}

pub fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start().get(..16).unwrap_or(body.trim_start());
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_detection() {
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(looks_like_html("  <HTML><body>error</body>"));
        assert!(!looks_like_html("<?xml version=\"1.0\"?><A/>"));
        assert!(!looks_like_html("[]"));
        assert!(!looks_like_html(""));
    }

    #[test]
    fn finds_api_error_through_context() {
        let err = anyhow::Error::from(ApiError::Status {
            status: 503,
            body: "down".into(),
        })
        .context("fetching closures");
        assert_eq!(api_error(&err).and_then(|e| e.status()), Some(503));
    }
}
