//! Balancer-member expansion and rendering.
//!
//! # Data Flow
//! ```text
//! BalancerMemberConfig (manifest) + HostFacts
//!     → request.rs (defaults resolved, required parameters checked)
//!     → expand.rs (parallel arrays → records)
//!     → render.rs (records → server lines)
//!     → Fragment { id, order, body }
//!     → submit() into a FragmentSink
//! ```
//!
//! # Design Decisions
//! - Evaluation is a pure function of the request; no state survives it
//! - Nothing is submitted unless expansion succeeds
//! - Fragment identity is derived from listening service and name only

pub mod expand;
pub mod render;
pub mod request;

use std::path::Path;

use thiserror::Error;

use crate::fragment::{AssemblyError, Fragment, FragmentSink};

pub use expand::{expand, BalancerMemberRecord};
pub use render::{render, render_line, LineFormat};
pub use request::{BalancerMemberRequest, Ensure, OneOrMany};

/// Errors raised while evaluating a single balancer-member request.
///
/// Every variant carries the name of the offending resource so the failure
/// can be traced back to its declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberError {
    /// `server_name` and `balancer_ip` are both lists of different lengths.
    #[error(
        "Balancermember[{resource}]: server_name has {server_names} entries but balancer_ip has {balancer_ips}"
    )]
    MismatchedArrayLength {
        resource: String,
        server_names: usize,
        balancer_ips: usize,
    },

    /// `listening_service` or `balancer_port` was not given.
    #[error("Balancermember[{resource}]: missing required parameter '{parameter}'")]
    MissingRequiredParameter {
        resource: String,
        parameter: &'static str,
    },

    /// `balancermember_options` is a list whose length matches neither 1 nor
    /// the member count.
    #[error(
        "Balancermember[{resource}]: balancermember_options has {options} entries, expected 1 or {members}"
    )]
    InvalidOptionsArrayLength {
        resource: String,
        options: usize,
        members: usize,
    },

    /// `balancer_port` is not a port in `1..=65535`.
    #[error("Balancermember[{resource}]: invalid balancer_port '{value}'")]
    InvalidPort { resource: String, value: String },

    /// Another fragment of the same target already uses this request's id
    /// with a different body.
    #[error("Balancermember[{resource}]: fragment '{fragment_id}' is already declared with different content")]
    DuplicateFragment { resource: String, fragment_id: String },

    /// A default needed a host fact that could not be resolved.
    #[error("Balancermember[{resource}]: no value given and host fact '{fact}' is unavailable")]
    MissingFact {
        resource: String,
        fact: &'static str,
    },
}

/// Stable fragment identity for a request. Re-evaluating the same request
/// always yields the same id, so the assembler replaces the old fragment.
pub fn fragment_id(listening_service: &str, name: &str) -> String {
    format!("{listening_service}_balancermember_{name}")
}

/// Expands and renders a request into the fragment it contributes.
///
/// Returns `Ok(None)` for requests with `ensure = "absent"`.
pub fn evaluate(request: &BalancerMemberRequest) -> Result<Option<Fragment>, MemberError> {
    if request.ensure == Ensure::Absent {
        tracing::debug!(resource = %request.name, "Member is absent, no fragment emitted");
        return Ok(None);
    }

    request.check()?;
    let records = expand(request)?;
    if records.is_empty() {
        tracing::warn!(
            resource = %request.name,
            listening_service = %request.listening_service,
            "Member expanded to zero records"
        );
    }

    let format = LineFormat {
        define_cookies: request.define_cookies,
    };

    Ok(Some(Fragment {
        id: fragment_id(&request.listening_service, &request.name),
        order: request.order.clone(),
        body: render(&records, format),
    }))
}

/// Hands a rendered fragment to the assembler owning `target`.
pub fn submit<S>(sink: &mut S, target: &Path, fragment: &Fragment) -> Result<(), AssemblyError>
where
    S: FragmentSink + ?Sized,
{
    tracing::debug!(
        target = %target.display(),
        fragment = %fragment.id,
        order = %fragment.order,
        "Submitting fragment"
    );
    sink.register_fragment(target, &fragment.id, &fragment.order, &fragment.body)
}
