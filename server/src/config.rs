//! Launcher configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ServerError;

pub const DEFAULT_PORT: u16 = 50505;
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_STATIC_DIR: &str = "client/dist";
pub const DEFAULT_BROWSER_DELAY_MS: u64 = 2000;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub host: IpAddr,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Where `POST /conversation` is relayed. `None` answers 503.
    pub upstream: Option<String>,
    pub browser_delay: Duration,
    pub open_browser: bool,
    pub upstream_connect_timeout: Duration,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            upstream: None,
            browser_delay: Duration::from_millis(DEFAULT_BROWSER_DELAY_MS),
            open_browser: true,
            upstream_connect_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

impl LauncherConfig {
    /// Build typed launcher config from environment variables.
    ///
    /// Optional:
    /// - `HOST`: default `127.0.0.1`
    /// - `PORT`: default 50505
    /// - `STATIC_DIR`: default `client/dist`
    /// - `CHAT_API_UPSTREAM`: chat backend URL for `/conversation`
    /// - `BROWSER_DELAY_MS`: default 2000
    /// - `NO_BROWSER`: truthy to skip opening a browser
    /// - `UPSTREAM_TIMEOUT_SECS`: upstream connect timeout, default 10
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidConfig`] when a set variable does not
    /// parse.
    pub fn from_env() -> Result<Self, ServerError> {
        let defaults = Self::default();
        let host = env_parse("HOST")?.unwrap_or(defaults.host);
        let port = env_parse("PORT")?.unwrap_or(defaults.port);
        let static_dir = non_empty_var("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from);
        let upstream = non_empty_var("CHAT_API_UPSTREAM").map(|u| u.trim_end_matches('/').to_owned());
        let browser_delay = env_parse::<u64>("BROWSER_DELAY_MS")?.map_or(defaults.browser_delay, Duration::from_millis);
        let open_browser = !env_bool("NO_BROWSER").unwrap_or(false);
        let upstream_connect_timeout = env_parse::<u64>("UPSTREAM_TIMEOUT_SECS")?
            .map_or(defaults.upstream_connect_timeout, Duration::from_secs);

        Ok(Self { host, port, static_dir, upstream, browser_delay, open_browser, upstream_connect_timeout })
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// URL the browser is pointed at. Wildcard binds are opened via loopback.
    #[must_use]
    pub fn browser_url(&self) -> String {
        let host = if self.host.is_unspecified() { DEFAULT_HOST } else { self.host };
        format!("http://{}/", SocketAddr::new(host, self.port))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ServerError> {
    let Some(raw) = non_empty_var(key) else {
        return Ok(None);
    };
    raw.parse().map(Some).map_err(|_| ServerError::InvalidConfig { var: key, value: raw })
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}
