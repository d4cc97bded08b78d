// src/discovery.rs
//
// Search-API discovery of competitor product URLs.

use std::collections::HashSet;
use std::env;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::config::consts::{
    ENV_GOOGLE_CSE_CX, ENV_GOOGLE_CSE_KEY, ENV_SERPAPI_KEY, GOOGLE_CSE_URL, SEARCH_QUERIES,
    SERPAPI_URL,
};
use crate::core::net::HttpClient;
use crate::error::FetchError;
use crate::policy::{Category, Gender};

/// Google CSE refuses `num` above this.
const CSE_MAX_NUM: usize = 10;

pub trait UrlDiscovery: Send + Sync {
    fn discover(&self, query: &str, max_results: usize) -> Result<Vec<String>, FetchError>;
}

/// Expand the query templates for one brand/cell/competitor domain.
pub fn build_queries(brand: &str, gender: Gender, category: Category, domain: &str) -> Vec<String> {
    let gender = gender.as_str().to_lowercase();
    let category = category.as_str().to_lowercase();
    SEARCH_QUERIES
        .iter()
        .map(|t| {
            t.replace("{brand}", brand)
                .replace("{gender}", &gender)
                .replace("{category}", &category)
                .replace("{domain}", domain)
        })
        .collect()
}

/// Human-readable banner text plus whether any provider has credentials.
pub fn search_api_status() -> (String, bool) {
    status_for(&Credentials::from_env())
}

fn status_for(creds: &Credentials) -> (String, bool) {
    if creds.serpapi_key.is_some() {
        (s!("Search API: configured (SerpAPI)"), true)
    } else if creds.cse.is_some() {
        (s!("Search API: configured (Google CSE)"), true)
    } else {
        (s!("Search API: not configured → inference only"), false)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub serpapi_key: Option<String>,
    /// (api key, engine id); both are required
    pub cse: Option<(String, String)>,
}

impl Credentials {
    pub fn from_env() -> Self {
        let var = |k: &str| env::var(k).ok().filter(|v| !v.trim().is_empty());
        let cse = match (var(ENV_GOOGLE_CSE_KEY), var(ENV_GOOGLE_CSE_CX)) {
            (Some(key), Some(cx)) => Some((key, cx)),
            _ => None,
        };
        Self { serpapi_key: var(ENV_SERPAPI_KEY), cse }
    }
}

// ---------- provider payloads ----------

#[derive(Debug, Default, Deserialize)]
struct LinkItem {
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<LinkItem>,
}

#[derive(Debug, Default, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<LinkItem>,
}

fn take_links(items: Vec<LinkItem>, max_results: usize) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|i| i.link.filter(|l| !l.is_empty()))
        .take(max_results)
        .collect()
}

// ---------- rate limiting ----------

/// Minimum spacing between requests made through one client.
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self { last_request: Mutex::new(None), min_interval }
    }

    fn wait(&self) {
        let Ok(mut last) = self.last_request.lock() else { return };
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

// ---------- client ----------

/// SerpAPI first, Google CSE to top up. Providers without credentials are skipped.
pub struct SearchClient {
    http: HttpClient,
    creds: Credentials,
    limiter: RateLimiter,
}

impl SearchClient {
    pub fn new(http: HttpClient, creds: Credentials, min_interval: Duration) -> Self {
        Self { http, creds, limiter: RateLimiter::new(min_interval) }
    }

    pub fn from_env(http: HttpClient, min_interval: Duration) -> Self {
        Self::new(http, Credentials::from_env(), min_interval)
    }

    pub fn is_configured(&self) -> bool {
        status_for(&self.creds).1
    }

    fn serpapi(&self, query: &str, max_results: usize) -> Result<Vec<String>, FetchError> {
        let Some(key) = &self.creds.serpapi_key else { return Ok(Vec::new()) };
        self.limiter.wait();
        let params = [
            ("engine", s!("google")),
            ("api_key", key.clone()),
            ("q", s!(query)),
        ];
        let resp: SerpApiResponse = self.http.get_json(SERPAPI_URL, &params)?;
        Ok(take_links(resp.organic_results, max_results))
    }

    fn google_cse(&self, query: &str, max_results: usize) -> Result<Vec<String>, FetchError> {
        let Some((key, cx)) = &self.creds.cse else { return Ok(Vec::new()) };
        self.limiter.wait();
        let params = [
            ("key", key.clone()),
            ("cx", cx.clone()),
            ("q", s!(query)),
            ("num", max_results.min(CSE_MAX_NUM).to_string()),
        ];
        let resp: CseResponse = self.http.get_json(GOOGLE_CSE_URL, &params)?;
        Ok(take_links(resp.items, max_results))
    }
}

impl UrlDiscovery for SearchClient {
    fn discover(&self, query: &str, max_results: usize) -> Result<Vec<String>, FetchError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        let mut urls = self.serpapi(query, max_results)?;
        if urls.len() < max_results {
            let more = self.google_cse(query, max_results - urls.len())?;
            urls.extend(more);
        }
        let urls = dedup_capped(urls, max_results);
        logd!("Discovery: {} url(s) for '{}'", urls.len(), query);
        Ok(urls)
    }
}

/// Drop repeats (first occurrence wins) and keep at most `max`.
pub fn dedup_capped(urls: Vec<String>, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|u| seen.insert(u.clone()))
        .take(max)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_template_lowercases_cell() {
        let q = build_queries("Tory Burch", Gender::Women, Category::Shoes, "farfetch.com");
        assert_eq!(q, vec![s!("Tory Burch women shoes site:farfetch.com sale")]);
    }

    #[test]
    fn dedup_keeps_order_and_caps() {
        let urls = ["a", "b", "a", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(dedup_capped(urls, 3), vec!["a", "b", "c"]);
    }

    #[test]
    fn serpapi_payload_tolerates_missing_links() {
        let json = r#"{"organic_results":[{"link":"https://x/1"},{"title":"no link"},{"link":"https://x/2"}]}"#;
        let resp: SerpApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(take_links(resp.organic_results, 6), vec!["https://x/1", "https://x/2"]);

        let resp: CseResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.items.is_empty());
    }

    #[test]
    fn status_prefers_serpapi() {
        let both = Credentials {
            serpapi_key: Some(s!("k")),
            cse: Some((s!("k"), s!("cx"))),
        };
        assert_eq!(status_for(&both), (s!("Search API: configured (SerpAPI)"), true));

        let cse = Credentials { serpapi_key: None, cse: Some((s!("k"), s!("cx"))) };
        assert!(status_for(&cse).0.contains("Google CSE"));

        let (msg, ok) = status_for(&Credentials::default());
        assert!(!ok);
        assert!(msg.ends_with("inference only"));
    }

    #[test]
    fn rate_limiter_spaces_calls() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.wait();
        limiter.wait();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
