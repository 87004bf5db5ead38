use crate::error::ServerError;
use std::net::SocketAddr;

pub const BIND_ADDR_VAR: &str = "TIMETABLE_BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Service settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerError> {
        let addr = std::env::var(BIND_ADDR_VAR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        Self::parse(&addr)
    }

    pub fn parse(addr: &str) -> Result<Self, ServerError> {
        let bind_addr = addr.parse().map_err(|source| ServerError::BindAddress {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Self { bind_addr })
    }
}
