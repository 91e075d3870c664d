use anyhow::Context;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.138 Safari/537.36 OPR/68.0.3618.206";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub nse: NseConfig,
}

/// Outbound option-chain endpoint settings
#[derive(Clone)]
pub struct NseConfig {
    pub base_url: String,
    pub symbol: String,
    pub user_agent: String,
    pub cookie: Option<String>,
    pub timeout: Duration,
}

// Keeps the session cookie out of logs
impl fmt::Debug for NseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NseConfig")
            .field("base_url", &self.base_url)
            .field("symbol", &self.symbol)
            .field("user_agent", &self.user_agent)
            .field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Read configuration from the process environment (after `.env` has been loaded)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => 5000,
        };

        let timeout_secs = match lookup("NSE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("NSE_TIMEOUT_SECS must be whole seconds, got '{}'", raw))?,
            None => 30,
        };

        let nse = NseConfig {
            base_url: lookup("NSE_BASE_URL")
                .unwrap_or_else(|| "https://www.nseindia.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            symbol: lookup("NSE_SYMBOL").unwrap_or_else(|| "NIFTY".to_string()),
            user_agent: lookup("NSE_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            cookie: lookup("NSE_COOKIE").filter(|c| !c.trim().is_empty()),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self { host, port, nse })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
