use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const DEFAULT_BOOKING_BASE_URL: &str = "https://bookings.thewave.com/twb_b2c";
const DEFAULT_OUTPUT_PATH: &str = "./currentSurfData.json";
// Each slot fetch gets its own browser session, so this caps the number of
// simultaneous browser processes.
const DEFAULT_MAX_CONCURRENT_SESSIONS: usize = 4;

/// The env vars recognised for scraping. All optional; see the defaults above.
#[derive(Debug, Deserialize)]
struct ScrapeEnv {
    webdriver_url: Option<String>,
    booking_base_url: Option<String>,
    output_path: Option<String>,
    headless: Option<bool>,
    max_concurrent_sessions: Option<usize>,
}

/// Resolved runtime configuration, passed into every scraper instead of
/// module-level globals.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub webdriver_url: String,
    pub booking_base_url: String,
    pub output_path: String,
    pub headless: bool,
    pub max_concurrent_sessions: usize,
}

impl ScrapeConfig {
    pub fn new() -> anyhow::Result<Self> {
        let scrape_env = ScrapeEnv::load_from_env()?;
        Ok(Self {
            webdriver_url: scrape_env
                .webdriver_url
                .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string()),
            booking_base_url: scrape_env
                .booking_base_url
                .unwrap_or_else(|| DEFAULT_BOOKING_BASE_URL.to_string()),
            output_path: scrape_env
                .output_path
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            headless: scrape_env.headless.unwrap_or(true),
            max_concurrent_sessions: scrape_env
                .max_concurrent_sessions
                .unwrap_or(DEFAULT_MAX_CONCURRENT_SESSIONS)
                .max(1),
        })
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
