use std::net::{IpAddr, SocketAddr, TcpListener};
use std::ops::RangeInclusive;

use thiserror::Error;

pub const SERVER_PORT_ENV: &str = "SERVER_PORT";
pub const BIND_HOST_ENV: &str = "MD2DOCX_BIND_HOST";
pub const DEFAULT_BIND_HOST: &str = "127.0.0.1";
pub const FALLBACK_PORT_RANGE: RangeInclusive<u16> = 8080..=8090;

#[derive(Debug, Error)]
pub enum PortSelectionError {
    #[error("invalid bind host '{0}'")]
    InvalidHost(String),
    #[error("no listening port could be allocated: {0}")]
    Unavailable(std::io::Error),
}

pub fn bind_host_from_env() -> Result<IpAddr, PortSelectionError> {
    let raw = std::env::var(BIND_HOST_ENV).ok();
    parse_bind_host(raw.as_deref())
}

fn parse_bind_host(raw: Option<&str>) -> Result<IpAddr, PortSelectionError> {
    let host = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_BIND_HOST);
    host.parse()
        .map_err(|_| PortSelectionError::InvalidHost(host.to_string()))
}

/// Positive port from `SERVER_PORT`, if set and well-formed.
pub fn port_override_from_env() -> Option<u16> {
    parse_port_override(std::env::var(SERVER_PORT_ENV).ok().as_deref())
}

fn parse_port_override(raw: Option<&str>) -> Option<u16> {
    raw.map(str::trim)
        .and_then(|v| v.parse::<u16>().ok())
        .filter(|port| *port > 0)
}

/// Picks the preferred port when it is free, otherwise the first free port in
/// [`FALLBACK_PORT_RANGE`], otherwise whatever the OS assigns.
pub fn select_listen_port(host: IpAddr, preferred: u16) -> Result<u16, PortSelectionError> {
    if preferred != 0 && is_port_available(host, preferred) {
        return Ok(preferred);
    }
    if let Some(port) = FALLBACK_PORT_RANGE.find(|port| is_port_available(host, *port)) {
        return Ok(port);
    }

    let listener =
        TcpListener::bind(SocketAddr::new(host, 0)).map_err(PortSelectionError::Unavailable)?;
    listener
        .local_addr()
        .map(|addr| addr.port())
        .map_err(PortSelectionError::Unavailable)
}

pub fn is_port_available(host: IpAddr, port: u16) -> bool {
    TcpListener::bind(SocketAddr::new(host, port)).is_ok()
}
