//! Balancer-member fragments for load-balancer configuration files.
//!
//! A balancer member declares one or more `server` lines for a listening
//! service. Members are expanded from parallel parameter lists, rendered,
//! and assembled with other fragments into a single configuration file,
//! either locally or after being exported by other hosts and collected
//! through a shared registry.

pub mod catalog;
pub mod config;
pub mod error;
pub mod facts;
pub mod fragment;
pub mod member;
pub mod observability;
pub mod registry;

pub use catalog::Catalog;
pub use config::ManifestConfig;
pub use error::Error;
pub use facts::HostFacts;
pub use fragment::Concat;
pub use member::{BalancerMemberRequest, MemberError};
