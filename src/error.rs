// src/error.rs
use thiserror::Error;

/// Failure talking to a search API or competitor page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Request failed for {url}: {reason}")]
    Transport { url: String, reason: String, timeout: bool },

    #[error("Unreadable response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Worth another attempt: network trouble, throttling, server-side errors.
    /// Auth failures, blocks and missing pages are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            FetchError::Decode { .. } => false,
        }
    }

    pub(crate) fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return FetchError::Status { status: status.as_u16(), url: s!(url) };
        }
        if e.is_decode() {
            return FetchError::Decode { url: s!(url), reason: e.to_string() };
        }
        FetchError::Transport { url: s!(url), reason: e.to_string(), timeout: e.is_timeout() }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("Invalid config {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
}

#[derive(Debug, Error)]
pub enum BrandsError {
    #[error("brands file must include a 'brand' column")]
    MissingBrandColumn,

    #[error("Unsupported brands file '{0}' (expected .csv or .xlsx)")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] calamine::XlsxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> FetchError {
        FetchError::Status { status: code, url: s!("https://x.test") }
    }

    #[test]
    fn retryable_classification() {
        assert!(status(429).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!status(403).is_retryable());
        assert!(!status(404).is_retryable());
        let t = FetchError::Transport { url: s!("u"), reason: s!("reset"), timeout: false };
        assert!(t.is_retryable());
        assert_eq!(t.status(), None);
    }
}
