use crate::domain::{TransportError, TransportResult};

/// Check that a gateway URL is a plain `ws://host[:port][/path]` endpoint
///
/// # Examples
/// ```
/// use ingestion_worker::validate_websocket_url;
///
/// assert!(validate_websocket_url("ws://localhost:8080").is_ok());
/// assert!(validate_websocket_url("http://localhost:8080").is_err());
/// ```
pub fn validate_websocket_url(url: &str) -> TransportResult<()> {
    let rest = url.strip_prefix("ws://").ok_or_else(|| {
        TransportError::InvalidUrl(format!("expected ws:// scheme in '{}'", url))
    })?;

    let authority = rest.split('/').next().unwrap_or_default();
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    };

    if host.is_empty() {
        return Err(TransportError::InvalidUrl(format!(
            "missing host in '{}'",
            url
        )));
    }

    if let Some(port) = port {
        port.parse::<u16>().map_err(|_| {
            TransportError::InvalidUrl(format!("invalid port '{}' in '{}'", port, url))
        })?;
    }

    Ok(())
}
