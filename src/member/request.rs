//! Balancer-member requests.
//!
//! # Responsibilities
//! - Hold one declared member with every default resolved
//! - Check required parameters before anything is expanded
//! - Substitute host facts for missing `server_name` / `balancer_ip`

use serde::{Deserialize, Serialize};

use super::MemberError;
use crate::config::schema::BalancerMemberConfig;
use crate::facts::HostFacts;
use crate::fragment::OrderKey;

/// A parameter that may be written either as a single value or as a list:
///
/// ```toml
/// server_name = "server01"
/// server_name = ["server01", "server02"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn one(value: impl Into<T>) -> Self {
        Self::One(value.into())
    }

    pub fn many<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        Self::Many(values.into_iter().map(Into::into).collect())
    }

    /// Length of the list, or `None` for a single value.
    pub fn list_len(&self) -> Option<usize> {
        match self {
            Self::One(_) => None,
            Self::Many(values) => Some(values.len()),
        }
    }

    /// Value for position `index`. A single value, or a list holding exactly
    /// one element, answers every index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds of a longer list.
    pub fn at(&self, index: usize) -> &T {
        match self {
            Self::One(value) => value,
            Self::Many(values) if values.len() == 1 => &values[0],
            Self::Many(values) => &values[index],
        }
    }
}

impl<T: Default> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::One(T::default())
    }
}

/// Whether a member should be present in the assembled file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

/// One balancer-member declaration with all defaults resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancerMemberRequest {
    /// Free-form identifier, only used to make the fragment id unique.
    pub name: String,

    /// Listening-service block this member belongs to.
    pub listening_service: String,

    /// Port shared by every record of this request.
    pub balancer_port: u16,

    /// Position of the fragment in the assembled file.
    #[serde(default)]
    pub order: OrderKey,

    pub server_name: OneOrMany<String>,

    /// Paired positionally with `server_name`.
    pub balancer_ip: OneOrMany<String>,

    #[serde(default)]
    pub balancermember_options: OneOrMany<String>,

    /// Emit `cookie <server_name>` on every line.
    #[serde(default)]
    pub define_cookies: bool,

    #[serde(default)]
    pub ensure: Ensure,
}

impl BalancerMemberRequest {
    /// Creates a present request with default order, empty options and
    /// empty member lists. Callers set `server_name` and `balancer_ip`.
    pub fn new(name: impl Into<String>, listening_service: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            listening_service: listening_service.into(),
            balancer_port: port,
            order: OrderKey::default(),
            server_name: OneOrMany::Many(Vec::new()),
            balancer_ip: OneOrMany::Many(Vec::new()),
            balancermember_options: OneOrMany::default(),
            define_cookies: false,
            ensure: Ensure::Present,
        }
    }

    pub fn with_order(mut self, order: impl Into<OrderKey>) -> Self {
        self.order = order.into();
        self
    }

    pub fn with_server_name(mut self, server_name: OneOrMany<String>) -> Self {
        self.server_name = server_name;
        self
    }

    pub fn with_balancer_ip(mut self, balancer_ip: OneOrMany<String>) -> Self {
        self.balancer_ip = balancer_ip;
        self
    }

    pub fn with_options(mut self, options: OneOrMany<String>) -> Self {
        self.balancermember_options = options;
        self
    }

    pub fn with_cookies(mut self, define_cookies: bool) -> Self {
        self.define_cookies = define_cookies;
        self
    }

    pub fn with_ensure(mut self, ensure: Ensure) -> Self {
        self.ensure = ensure;
        self
    }

    /// Builds a request from its manifest declaration, falling back to
    /// `facts` for `server_name` and `balancer_ip`.
    pub fn from_config(config: &BalancerMemberConfig, facts: &HostFacts) -> Result<Self, MemberError> {
        let (listening_service, balancer_port) = required_parameters(config)?;

        // Absent members are never rendered, so they need no facts.
        let absent = config.ensure == Ensure::Absent;

        let server_name = match &config.server_name {
            Some(value) => value.clone(),
            None if absent => OneOrMany::Many(Vec::new()),
            None => OneOrMany::One(fact(&config.name, "hostname", facts.hostname())?),
        };

        let balancer_ip = match &config.balancer_ip {
            Some(value) => value.clone(),
            None if absent => OneOrMany::Many(Vec::new()),
            None => OneOrMany::One(fact(&config.name, "ipaddress", facts.ipaddress())?),
        };

        Ok(Self {
            name: config.name.clone(),
            listening_service,
            balancer_port,
            order: config.order.clone(),
            server_name,
            balancer_ip,
            balancermember_options: config.balancermember_options.clone(),
            define_cookies: config.define_cookies,
            ensure: config.ensure,
        })
    }

    /// Re-checks the required parameters of a request that did not come
    /// through [`from_config`](Self::from_config), such as one read back
    /// from a registry.
    pub fn check(&self) -> Result<(), MemberError> {
        if self.listening_service.trim().is_empty() {
            return Err(MemberError::MissingRequiredParameter {
                resource: self.name.clone(),
                parameter: "listening_service",
            });
        }

        if self.balancer_port == 0 {
            return Err(MemberError::InvalidPort {
                resource: self.name.clone(),
                value: self.balancer_port.to_string(),
            });
        }

        Ok(())
    }
}

/// Checks the parameters a declaration cannot do without and returns
/// `(listening_service, balancer_port)`.
pub fn required_parameters(config: &BalancerMemberConfig) -> Result<(String, u16), MemberError> {
    let listening_service = config
        .listening_service
        .as_deref()
        .map(str::trim)
        .filter(|service| !service.is_empty())
        .ok_or_else(|| MemberError::MissingRequiredParameter {
            resource: config.name.clone(),
            parameter: "listening_service",
        })?;

    let port = config
        .balancer_port
        .as_ref()
        .ok_or_else(|| MemberError::MissingRequiredParameter {
            resource: config.name.clone(),
            parameter: "balancer_port",
        })?;

    let port = port.to_port().ok_or_else(|| MemberError::InvalidPort {
        resource: config.name.clone(),
        value: port.to_string(),
    })?;

    Ok((listening_service.to_string(), port))
}

fn fact(resource: &str, fact: &'static str, value: Option<&str>) -> Result<String, MemberError> {
    value.map(str::to_string).ok_or_else(|| MemberError::MissingFact {
        resource: resource.to_string(),
        fact,
    })
}
