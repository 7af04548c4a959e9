//! Registry backed by a shared directory.
//!
//! Layout: `<root>/<selector>/<name>.json`, one JSON document per member.
//! Path components are percent-encoded so any selector or name maps to a
//! single file inside the root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{ExportedMember, Registry, RegistryError};

pub(super) const EXTENSION: &str = "json";

/// Registry storing members as files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    root: PathBuf,
}

impl DirectoryRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn selector_dir(&self, selector: &str) -> PathBuf {
        self.root.join(encode_component(selector))
    }

    fn member_path(&self, selector: &str, name: &str) -> PathBuf {
        self.selector_dir(selector)
            .join(format!("{}.{}", encode_component(name), EXTENSION))
    }
}

impl Registry for DirectoryRegistry {
    fn publish(&mut self, selector: &str, member: ExportedMember) -> Result<(), RegistryError> {
        let dir = self.selector_dir(selector);
        fs::create_dir_all(&dir).map_err(|source| RegistryError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = self.member_path(selector, &member.request.name);
        let document = serde_json::to_string_pretty(&member).map_err(|source| RegistryError::Json {
            path: path.clone(),
            source,
        })?;

        let temp = path.with_extension("json.tmp");
        fs::write(&temp, document).map_err(|source| RegistryError::Io {
            path: temp.clone(),
            source,
        })?;
        fs::rename(&temp, &path).map_err(|source| RegistryError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(selector = %selector, path = %path.display(), "Member published");
        Ok(())
    }

    fn withdraw(&mut self, selector: &str, name: &str) -> Result<bool, RegistryError> {
        let path = self.member_path(selector, name);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(selector = %selector, path = %path.display(), "Member withdrawn");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(RegistryError::Io { path, source }),
        }
    }

    fn query_all(&self, selector: &str) -> Result<Vec<ExportedMember>, RegistryError> {
        let dir = self.selector_dir(selector);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(RegistryError::Io { path: dir, source }),
        };

        let mut members = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| RegistryError::Io {
                    path: dir.clone(),
                    source,
                })?
                .path();

            // Skips in-flight temp files and anything foreign.
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }

            let document = fs::read_to_string(&path).map_err(|source| RegistryError::Io {
                path: path.clone(),
                source,
            })?;
            let member: ExportedMember =
                serde_json::from_str(&document).map_err(|source| RegistryError::Json { path, source })?;
            members.push(member);
        }

        members.sort_by(|a, b| a.request.name.cmp(&b.request.name));
        tracing::debug!(selector = %selector, count = members.len(), "Members collected");
        Ok(members)
    }
}

/// Everything outside `[A-Za-z0-9_.-]`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Percent-encodes one path component. A leading dot is encoded as well, so
/// `.` and `..` can never escape the root.
pub(super) fn encode_component(raw: &str) -> String {
    match raw.strip_prefix('.') {
        Some(rest) => format!("%2E{}", utf8_percent_encode(rest, COMPONENT)),
        None => utf8_percent_encode(raw, COMPONENT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{BalancerMemberRequest, OneOrMany};

    fn member(name: &str) -> ExportedMember {
        let request = BalancerMemberRequest::new(name, "puppet00", 8140)
            .with_server_name(OneOrMany::one("node01"))
            .with_balancer_ip(OneOrMany::one("10.0.0.1"))
            .with_options(OneOrMany::one("check"));
        ExportedMember::new("node01", request)
    }

    #[test]
    fn publish_then_query() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = DirectoryRegistry::new(dir.path());

        registry.publish("puppet00", member("web02")).unwrap();
        registry.publish("puppet00", member("web01")).unwrap();

        let members = registry.query_all("puppet00").unwrap();
        assert_eq!(members, vec![member("web01"), member("web02")]);
    }

    #[test]
    fn withdraw_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = DirectoryRegistry::new(dir.path());

        registry.publish("puppet00", member("web01")).unwrap();
        assert!(registry.withdraw("puppet00", "web01").unwrap());
        assert!(!registry.withdraw("puppet00", "web01").unwrap());
        assert!(registry.query_all("puppet00").unwrap().is_empty());
    }

    #[test]
    fn missing_selector_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DirectoryRegistry::new(dir.path());
        assert!(registry.query_all("nothing-here").unwrap().is_empty());
    }

    #[test]
    fn malformed_entry_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DirectoryRegistry::new(dir.path());
        fs::create_dir_all(dir.path().join("puppet00")).unwrap();
        fs::write(dir.path().join("puppet00/broken.json"), "{").unwrap();

        assert!(matches!(
            registry.query_all("puppet00"),
            Err(RegistryError::Json { .. })
        ));
    }

    #[test]
    fn names_cannot_escape_root() {
        assert_eq!(encode_component(".."), "%2E.");
        assert_eq!(encode_component("a/b"), "a%2Fb");
        assert_eq!(encode_component("."), "%2E");
        assert_eq!(encode_component(".hidden.d"), "%2Ehidden.d");
        assert_eq!(encode_component("web01.example.com"), "web01.example.com");
        assert_eq!(encode_component("zürich 1"), "z%C3%BCrich%201");
    }

    #[test]
    fn dotted_names_stay_inside_selector_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = DirectoryRegistry::new(dir.path().join("registry"));

        registry.publish("..", member("..")).unwrap();

        assert!(dir.path().join("registry/%2E./%2E..json").is_file());
        assert_eq!(registry.query_all("..").unwrap(), vec![member("..")]);
    }
}
