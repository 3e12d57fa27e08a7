//! Client configuration

/// Connection settings for the remote table endpoint
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL of the table API, e.g. `https://example.test/rest/v1`
    pub base_url: String,
    /// API key, sent as both `apikey` and bearer token when present
    pub api_key: Option<String>,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Read the configuration from `TASKPAD_API_URL` / `TASKPAD_API_KEY`
    ///
    /// Returns `None` when no API URL is configured, which callers treat as
    /// "run against local storage only".
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("TASKPAD_API_URL").ok()?;
        let api_key = std::env::var("TASKPAD_API_KEY").ok();
        Some(Self { base_url, api_key })
    }
}
