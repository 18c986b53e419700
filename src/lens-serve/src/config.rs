use std::env;

pub const DEFAULT_PORT: u16 = 5000;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Settings for the remote label endpoint. Absent entirely when no
/// endpoint is configured, in which case detection uses the mock path.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: String,
    pub region: String,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn new(endpoint: &str) -> Self {
        ProviderConfig {
            endpoint: endpoint.to_owned(),
            api_key: String::new(),
            region: DEFAULT_REGION.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Process configuration, read once from the environment at startup and
/// passed into the server rather than kept global.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub debug: bool,
    pub provider: Option<ProviderConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let debug = env::var("APP_ENV")
            .map(|v| v == "development")
            .unwrap_or(false);

        let provider = env::var("LABEL_API_ENDPOINT").ok().map(|endpoint| {
            let mut provider = ProviderConfig::new(&endpoint);

            if let Ok(key) = env::var("LABEL_API_KEY") {
                provider.api_key = key;
            }
            if let Ok(region) = env::var("LABEL_API_REGION") {
                provider.region = region;
            }
            if let Some(timeout) = env::var("LABEL_API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
            {
                provider.timeout_secs = timeout;
            }

            provider
        });

        Config {
            port,
            debug,
            provider,
        }
    }
}
