//! Manifest schema definitions.
//!
//! This module defines the complete manifest structure. All types derive
//! Serde traits for deserialization from TOML.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::fragment::OrderKey;
use crate::member::{Ensure, OneOrMany};

/// Root of a manifest file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ManifestConfig {
    /// Assembled file and reload settings.
    pub output: OutputConfig,

    /// Host fact overrides.
    pub facts: FactsConfig,

    /// Export/collect registry settings.
    pub registry: RegistryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Static fragments (headers, listen blocks) assembled alongside members.
    #[serde(rename = "fragment")]
    pub fragments: Vec<FragmentConfig>,

    /// Balancer members declared on this host.
    #[serde(rename = "balancermember")]
    pub balancermembers: Vec<BalancerMemberConfig>,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the assembled configuration file.
    pub target: PathBuf,

    /// Command run after the target changed (argv, empty for none).
    pub reload_command: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target: PathBuf::from("/etc/haproxy/haproxy.cfg"),
            reload_command: Vec::new(),
        }
    }
}

/// Explicit host facts. Unset facts are discovered from the system.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FactsConfig {
    pub hostname: Option<String>,
    pub ipaddress: Option<String>,
}

/// Registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RegistryConfig {
    /// Root directory of the shared registry.
    pub path: Option<PathBuf>,

    /// Listening services whose exported members are collected into the
    /// target.
    pub collect: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Opaque text placed into the target at `order`. Exactly one of `content`
/// and `source` must be set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FragmentConfig {
    /// Fragment identifier, unique per target.
    pub name: String,

    #[serde(default)]
    pub order: OrderKey,

    /// Inline text.
    pub content: Option<String>,

    /// File to read the text from.
    pub source: Option<PathBuf>,
}

/// One `[[balancermember]]` declaration. Required parameters are optional
/// here so that their absence is reported per resource by validation.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BalancerMemberConfig {
    pub name: String,

    pub listening_service: Option<String>,

    pub balancer_port: Option<PortValue>,

    #[serde(default)]
    pub order: OrderKey,

    /// Defaults to the host's hostname.
    pub server_name: Option<OneOrMany<String>>,

    /// Defaults to the host's address.
    pub balancer_ip: Option<OneOrMany<String>>,

    #[serde(default)]
    pub balancermember_options: OneOrMany<String>,

    #[serde(default)]
    pub define_cookies: bool,

    #[serde(default)]
    pub ensure: Ensure,
}

/// A port written as a number or a string:
///
/// ```toml
/// balancer_port = 8140
/// balancer_port = "8140"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(i64),
    Text(String),
}

impl PortValue {
    /// The port, if it lies in `1..=65535`.
    pub fn to_port(&self) -> Option<u16> {
        let port = match self {
            PortValue::Number(number) => u16::try_from(*number).ok()?,
            PortValue::Text(text) => text.trim().parse::<u16>().ok()?,
        };
        (port != 0).then_some(port)
    }
}

impl fmt::Display for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortValue::Number(number) => write!(f, "{}", number),
            PortValue::Text(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_values() {
        assert_eq!(PortValue::Number(8140).to_port(), Some(8140));
        assert_eq!(PortValue::Text(" 8140 ".into()).to_port(), Some(8140));
        assert_eq!(PortValue::Number(0).to_port(), None);
        assert_eq!(PortValue::Number(-1).to_port(), None);
        assert_eq!(PortValue::Text("http".into()).to_port(), None);
    }
}
