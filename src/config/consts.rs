// src/config/consts.rs

// Net config
pub const USER_AGENT: &str = "LFYDiscountResearcher/1.0";
pub const HTTP_TIMEOUT_SECS: u64 = 30;
pub const SERPAPI_URL: &str = "https://serpapi.com/search.json";
pub const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";

// Credentials (environment)
pub const ENV_SERPAPI_KEY: &str = "SERPAPI_API_KEY";
pub const ENV_GOOGLE_CSE_KEY: &str = "GOOGLE_CSE_API_KEY";
pub const ENV_GOOGLE_CSE_CX: &str = "GOOGLE_CSE_CX";

// Competitors: (display name, domain)
pub const COMPETITORS: &[(&str, &str)] = &[
    ("Net-a-Porter", "net-a-porter.com"),
    ("MyTheresa", "mytheresa.com"),
    ("Farfetch", "farfetch.com"),
];

pub const SEARCH_QUERIES: &[&str] = &[
    "{brand} {gender} {category} site:{domain} sale",
];

// Run defaults
pub const MAX_BRANDS: usize = 300;
pub const BATCH_SIZE: usize = 10;
pub const MAX_URLS_PER_COMBO: usize = 6;
pub const REQUEST_DELAY_MS: u64 = 2000; // be polite
pub const MAX_RETRIES: u32 = 1;

// Concurrency
pub const WORKERS: usize = 2;

// Local run store
pub const RUNS_DIR: &str = "runs";
pub const DEBUG_LOG_FILE: &str = "debug.log";
pub const RUN_LOG_BANNER: &str = "LFY US Discount Researcher run log";

// Config files, later overrides earlier
pub const CONFIG_FILES: &[&str] = &["config.toml", "config.local.toml"];

// Export
pub const FINAL_OUTPUT_STEM: &str = "us_discount_policy";
pub const PARTIAL_OUTPUT_STEM: &str = "output_partial";
pub const POLICY_SHEET_NAME: &str = "us_discount_policy";
