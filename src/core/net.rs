// src/core/net.rs
//
// Blocking HTTP for search APIs and competitor pages.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::config::consts::HTTP_TIMEOUT_SECS;
use crate::error::FetchError;

/// Anything that can turn a URL into page HTML.
/// The runner only talks to this trait, so tests can feed canned pages.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::from_reqwest("<client>", e))?;
        Ok(Self { client })
    }

    fn send(&self, url: &str, query: &[(&str, String)]) -> Result<Response, FetchError> {
        let resp = self.client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: s!(url) });
        }
        Ok(resp)
    }

    /// GET and return the body as text.
    pub fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.send(url, &[])?
            .text()
            .map_err(|e| FetchError::Decode { url: s!(url), reason: e.to_string() })
    }

    /// GET with query parameters and decode a JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T, FetchError> {
        self.send(url, query)?
            .json::<T>()
            .map_err(|e| FetchError::Decode { url: s!(url), reason: e.to_string() })
    }
}

impl PageFetcher for HttpClient {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.get_text(url)
    }
}
