//! Configuration parsing and validation for the relay server
//!
//! This module handles command-line argument parsing using clap. It defines
//! the main configuration structure used by the binary entry point.
use anyhow::anyhow;
use axum::http::HeaderValue;
use clap::Parser;
use claude_relay::{ANTHROPIC_MESSAGES_URL, RelaySettings};
use url::Url;

#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// The port on which the relay server will listen.
    #[arg(short = 'p', long, env = "CLAUDE_RELAY_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Value sent in the Access-Control-Allow-Origin header. Pin this to the
    /// hosting site's origin in production.
    #[arg(long, env = "CLAUDE_RELAY_CORS_ORIGIN", default_value = "*")]
    pub cors_origin: String,

    /// The messages endpoint completion requests are forwarded to.
    #[arg(long, env = "CLAUDE_RELAY_UPSTREAM", default_value = ANTHROPIC_MESSAGES_URL)]
    pub upstream: Url,

    /// Maximum number of idle HTTP connections to keep alive to the upstream.
    #[arg(long, default_value_t = 100)]
    pub pool_max_idle_per_host: usize,

    /// How long (in seconds) to keep idle HTTP connections alive.
    #[arg(long, default_value_t = 90)]
    pub pool_idle_timeout_secs: u64,
}

impl Config {
    pub fn settings(&self) -> Result<RelaySettings, anyhow::Error> {
        let allow_origin = HeaderValue::from_str(&self.cors_origin)
            .map_err(|_| anyhow!("Invalid CORS origin '{}'", self.cors_origin))?;
        if self.upstream.host_str().is_none() {
            return Err(anyhow!("Upstream URL '{}' has no host", self.upstream));
        }
        Ok(RelaySettings {
            upstream: self.upstream.clone(),
            allow_origin,
        })
    }
}
