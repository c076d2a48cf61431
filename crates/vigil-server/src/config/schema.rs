use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;
use vigil_core::error::{Result, VigilError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(VigilError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.listen_addr()?;

        Ok(())
    }

    /// Socket address to bind, from `server.host` and `server.port`.
    /// IPv6 hosts may be written bare (`::`) or bracketed (`[::1]`).
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let host = self.server.host.trim();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let ip: IpAddr = host.parse().map_err(|e| {
            VigilError::BadConfig(format!(
                "server.host {:?} is not an IP address: {e}",
                self.server.host
            ))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            greeting: default_greeting(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(VigilError::BadConfig("server.port must not be 0".into()));
        }
        if self.host.trim().is_empty() {
            return Err(VigilError::BadConfig("server.host must not be empty".into()));
        }
        if self.greeting.is_empty() {
            return Err(VigilError::BadConfig(
                "server.greeting must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}
fn default_greeting() -> String {
    "Hello! Welcome to the DevOps Masterclass v2.0".into()
}
