//! Members exported by several hosts and collected by a load balancer
//! through a shared directory registry.

use std::fs;

use balancermember::catalog::{export, Catalog};
use balancermember::config::load_config;
use balancermember::registry::{DirectoryRegistry, Registry};
use balancermember::HostFacts;

mod common;

const PRODUCER: &str = r#"
[registry]
path = "{dir}/registry"

[[balancermember]]
name = "{host}"
listening_service = "puppet00"
balancer_port = 8140
balancermember_options = "check"
"#;

const COLLECTOR: &str = r#"
[output]
target = "{dir}/haproxy.cfg"

[registry]
path = "{dir}/registry"
collect = ["puppet00"]

[[fragment]]
name = "listen-puppet00"
order = 10
content = "listen puppet00\n  bind 0.0.0.0:8140\n"
"#;

fn export_from(dir: &std::path::Path, host: &str, ip: &str, body: &str) {
    let path = common::write_manifest(dir, &format!("{host}.toml"), &body.replace("{host}", host));
    let manifest = load_config(&path).unwrap();
    let mut registry = DirectoryRegistry::new(manifest.registry.path.clone().unwrap());
    export(&manifest, &HostFacts::new(host, ip), &mut registry).unwrap();
}

#[test]
fn collected_members_reach_the_target() {
    let dir = tempfile::tempdir().unwrap();

    export_from(dir.path(), "node02", "10.0.0.12", PRODUCER);
    export_from(dir.path(), "node01", "10.0.0.11", PRODUCER);

    let path = common::write_manifest(dir.path(), "collector.toml", COLLECTOR);
    let manifest = load_config(&path).unwrap();
    let registry = DirectoryRegistry::new(manifest.registry.path.clone().unwrap());
    let catalog = Catalog::compile(&manifest, &HostFacts::new("lb01", "10.0.0.1"), Some(&registry)).unwrap();

    catalog.apply_to_target().unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("haproxy.cfg")).unwrap(),
        "listen puppet00\n  bind 0.0.0.0:8140\n\
         server node01 10.0.0.11:8140 check\n\
         server node02 10.0.0.12:8140 check\n"
    );
}

#[test]
fn absent_member_is_withdrawn_from_collection() {
    let dir = tempfile::tempdir().unwrap();

    export_from(dir.path(), "node01", "10.0.0.11", PRODUCER);
    export_from(dir.path(), "node02", "10.0.0.12", PRODUCER);
    export_from(
        dir.path(),
        "node02",
        "10.0.0.12",
        &format!("{PRODUCER}ensure = \"absent\"\n"),
    );

    let registry = DirectoryRegistry::new(dir.path().join("registry"));
    let names: Vec<String> = registry
        .query_all("puppet00")
        .unwrap()
        .into_iter()
        .map(|member| member.request.name)
        .collect();

    assert_eq!(names, vec!["node01"]);
}
