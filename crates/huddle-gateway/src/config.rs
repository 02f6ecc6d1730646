use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use huddle_common::{Error, Result};

/// Default configuration values
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_OUTBOX_CAPACITY: usize = 128;
pub const DEFAULT_HUB_CAPACITY: usize = 1024;
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 64 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(name = "huddle-gateway")]
#[command(about = "Huddle gateway - presence and call signaling for browser peers")]
pub struct GatewayConfig {
    /// Interface to bind
    #[arg(long, env = "HUDDLE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port for HTTP and WebSocket traffic
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory holding the browser client
    #[arg(long, env = "HUDDLE_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Messages buffered per connection before new ones are dropped
    #[arg(long, env = "HUDDLE_OUTBOX_CAPACITY", default_value_t = DEFAULT_OUTBOX_CAPACITY)]
    pub outbox_capacity: usize,

    /// Commands buffered for the signaling hub
    #[arg(long, env = "HUDDLE_HUB_CAPACITY", default_value_t = DEFAULT_HUB_CAPACITY)]
    pub hub_capacity: usize,

    /// Largest accepted WebSocket message
    #[arg(long, env = "HUDDLE_MAX_MESSAGE_BYTES", default_value_t = DEFAULT_MAX_MESSAGE_BYTES)]
    pub max_message_bytes: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl GatewayConfig {
    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.outbox_capacity == 0 {
            return Err(Error::config("outbox capacity must be at least 1"));
        }
        if self.hub_capacity == 0 {
            return Err(Error::config("hub capacity must be at least 1"));
        }
        if self.max_message_bytes == 0 {
            return Err(Error::config("max message size must be at least 1 byte"));
        }
        self.bind_addr().map(|_| ())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .map_err(|err| Error::config(format!("invalid host {:?}: {}", self.host, err)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Page served at `/call`.
    pub fn index_file(&self) -> PathBuf {
        self.public_dir.join("index.html")
    }
}
