//! Host facts used as member defaults.
//!
//! Facts are resolved once, before any request is built, and passed
//! explicitly. Manifest overrides win over discovery.

use std::net::UdpSocket;

use crate::config::schema::FactsConfig;

/// Address used only to select the outbound interface. Connecting a UDP
/// socket sends no packet.
const PROBE_ADDRESS: &str = "192.0.2.1:9";

/// Hostname and primary address of the evaluating host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostFacts {
    hostname: Option<String>,
    ipaddress: Option<String>,
}

impl HostFacts {
    pub fn new(hostname: impl Into<String>, ipaddress: impl Into<String>) -> Self {
        Self {
            hostname: Some(hostname.into()),
            ipaddress: Some(ipaddress.into()),
        }
    }

    /// Resolves facts, taking overrides first and asking the system for the
    /// rest. A fact that cannot be found stays unset.
    pub fn discover(overrides: &FactsConfig) -> Self {
        let hostname = overrides.hostname.clone().or_else(system_hostname);
        let ipaddress = overrides.ipaddress.clone().or_else(primary_address);

        tracing::debug!(
            hostname = hostname.as_deref().unwrap_or("<unknown>"),
            ipaddress = ipaddress.as_deref().unwrap_or("<unknown>"),
            "Host facts resolved"
        );

        Self { hostname, ipaddress }
    }

    /// Short hostname (domain stripped).
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn ipaddress(&self) -> Option<&str> {
        self.ipaddress.as_deref()
    }
}

fn system_hostname() -> Option<String> {
    match hostname::get() {
        Ok(name) => {
            let name = name.into_string().ok()?;
            let short = name.split('.').next().unwrap_or_default();
            (!short.is_empty()).then(|| short.to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Unable to read system hostname");
            None
        }
    }
}

fn primary_address() -> Option<String> {
    let outbound = || -> std::io::Result<std::net::IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(PROBE_ADDRESS)?;
        Ok(socket.local_addr()?.ip())
    };

    match outbound() {
        Ok(ip) if !ip.is_unspecified() => Some(ip.to_string()),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Unable to determine primary address");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win() {
        let overrides = FactsConfig {
            hostname: Some("lb01".into()),
            ipaddress: Some("10.0.0.5".into()),
        };

        assert_eq!(HostFacts::discover(&overrides), HostFacts::new("lb01", "10.0.0.5"));
    }

    #[test]
    fn discovered_hostname_is_short() {
        let overrides = FactsConfig {
            hostname: None,
            ipaddress: Some("10.0.0.5".into()),
        };

        if let Some(hostname) = HostFacts::discover(&overrides).hostname() {
            assert!(!hostname.contains('.'));
            assert!(!hostname.is_empty());
        }
    }
}
