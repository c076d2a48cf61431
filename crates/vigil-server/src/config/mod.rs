//! Server config loader (strict parsing).
//!
//! Sources, in order: `vigil.yaml` (or the path in `VIGIL_CONFIG`) when the
//! file exists, built-in defaults otherwise; then `PORT` overrides the port.

pub mod schema;

use std::fs;
use std::path::Path;

use vigil_core::error::{Result, VigilError};

pub use schema::{ServerConfig, ServerSection};

pub const DEFAULT_CONFIG_PATH: &str = "vigil.yaml";

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| VigilError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| VigilError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Replace `server.port` with an externally supplied value.
pub fn apply_port_override(cfg: &mut ServerConfig, port: Option<&str>) -> Result<()> {
    let Some(raw) = port else {
        return Ok(());
    };
    let port: u16 = raw
        .trim()
        .parse()
        .map_err(|e| VigilError::BadConfig(format!("PORT={raw:?} is not a port number: {e}")))?;
    if port == 0 {
        return Err(VigilError::BadConfig("PORT must not be 0".into()));
    }
    cfg.server.port = port;
    Ok(())
}

/// Resolve the effective config from the process environment. Read once at startup.
pub fn load() -> Result<ServerConfig> {
    let explicit = std::env::var("VIGIL_CONFIG").ok();
    let path = explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

    let mut cfg = if explicit.is_some() || Path::new(path).exists() {
        tracing::info!(%path, "loading config file");
        load_from_file(path)?
    } else {
        ServerConfig::default()
    };

    apply_port_override(&mut cfg, std::env::var("PORT").ok().as_deref())?;
    Ok(cfg)
}
