//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use balancermember::member::{BalancerMemberRequest, OneOrMany};

/// A single-server request for `puppet00` on port 8140.
pub fn member(name: &str, server_name: &str, balancer_ip: &str, order: &str) -> BalancerMemberRequest {
    BalancerMemberRequest::new(name, "puppet00", 8140)
        .with_order(order)
        .with_server_name(OneOrMany::one(server_name))
        .with_balancer_ip(OneOrMany::one(balancer_ip))
}

/// Writes a manifest into `dir` and returns its path. `{dir}` in `body` is
/// replaced with the directory path.
pub fn write_manifest(dir: &Path, file_name: &str, body: &str) -> PathBuf {
    let path = dir.join(file_name);
    let body = body.replace("{dir}", &dir.display().to_string());
    fs::write(&path, body).unwrap();
    path
}
