//! Manifest compilation and application.
//!
//! # Responsibilities
//! - Turn a validated manifest into fragments: static fragments, local
//!   members, members collected from the registry
//! - Evaluate every request before submitting anything
//! - Submit fragments and sync the target file
//! - Publish local members for collection elsewhere
//!
//! # Design Decisions
//! - A compile either yields every fragment or fails with every evaluation
//!   error; the target is left untouched on failure
//! - Two fragments with the same id must be identical; otherwise the compile
//!   fails instead of letting one silently replace the other
//! - Each apply starts from an empty assembler, so the target reflects the
//!   current manifest and registry only

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{FragmentConfig, ManifestConfig};
use crate::error::{Error, Result};
use crate::facts::HostFacts;
use crate::fragment::{AssemblyError, Concat, Fragment, FragmentSink, ReloadCommand, SyncOutcome};
use crate::member::{self, BalancerMemberRequest, Ensure, MemberError};
use crate::registry::{ExportedMember, Registry};

/// Fragments compiled from one manifest, ready to be assembled.
#[derive(Debug, Clone)]
pub struct Catalog {
    target: PathBuf,
    reload: Option<ReloadCommand>,
    fragments: Vec<Fragment>,
}

impl Catalog {
    /// Compiles `manifest`. `registry` is required when the manifest collects
    /// listening services.
    pub fn compile(
        manifest: &ManifestConfig,
        facts: &HostFacts,
        registry: Option<&dyn Registry>,
    ) -> Result<Self> {
        let mut fragments = manifest
            .fragments
            .iter()
            .map(static_fragment)
            .collect::<Result<Vec<_>>>()?;

        let mut failures = Vec::new();
        let mut requests = Vec::new();

        for config in &manifest.balancermembers {
            match BalancerMemberRequest::from_config(config, facts) {
                Ok(request) => requests.push(request),
                Err(e) => failures.push(e),
            }
        }

        if !manifest.registry.collect.is_empty() {
            let registry = registry.ok_or(Error::NoRegistry)?;
            for selector in &manifest.registry.collect {
                let collected = registry.query_all(selector)?;
                tracing::info!(
                    listening_service = %selector,
                    count = collected.len(),
                    "Collected exported members"
                );
                requests.extend(collected.into_iter().map(|exported| exported.request));
            }
        }

        // Fragment id -> index into `fragments`.
        let mut seen: HashMap<String, usize> = fragments
            .iter()
            .enumerate()
            .map(|(index, fragment)| (fragment.id.clone(), index))
            .collect();

        for request in &requests {
            match member::evaluate(request) {
                Ok(Some(fragment)) => match seen.get(&fragment.id) {
                    Some(&index) if fragments[index] == fragment => {
                        tracing::debug!(fragment = %fragment.id, "Identical fragment declared twice, keeping one");
                    }
                    Some(_) => failures.push(MemberError::DuplicateFragment {
                        resource: request.name.clone(),
                        fragment_id: fragment.id,
                    }),
                    None => {
                        seen.insert(fragment.id.clone(), fragments.len());
                        fragments.push(fragment);
                    }
                },
                Ok(None) => {}
                Err(e) => failures.push(e),
            }
        }

        if !failures.is_empty() {
            for failure in &failures {
                tracing::error!(error = %failure, "Member evaluation failed");
            }
            return Err(Error::Evaluation(failures));
        }

        tracing::debug!(
            target = %manifest.output.target.display(),
            fragments = fragments.len(),
            "Catalog compiled"
        );

        Ok(Self {
            target: manifest.output.target.clone(),
            reload: ReloadCommand::from_argv(&manifest.output.reload_command),
            fragments,
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Submits every fragment to `sink` for this catalog's target.
    pub fn apply<S>(&self, sink: &mut S) -> std::result::Result<(), AssemblyError>
    where
        S: FragmentSink + ?Sized,
    {
        for fragment in &self.fragments {
            member::submit(sink, &self.target, fragment)?;
        }
        Ok(())
    }

    /// Assembled content of the target, without touching the filesystem.
    pub fn render(&self) -> Result<String> {
        let concat = self.assemble()?;
        Ok(concat.assemble(&self.target).unwrap_or_default())
    }

    /// Writes the target if its content changed and runs the reload command
    /// after a write.
    pub fn apply_to_target(&self) -> Result<SyncOutcome> {
        let concat = self.assemble()?;
        let outcome = concat.sync(&self.target, self.reload.as_ref())?;
        tracing::info!(target = %self.target.display(), outcome = ?outcome, "Target synced");
        Ok(outcome)
    }

    fn assemble(&self) -> Result<Concat> {
        let mut concat = Concat::new();
        self.apply(&mut concat)?;
        Ok(concat)
    }
}

/// Counts reported by [`export`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub published: usize,
    pub withdrawn: usize,
}

/// Publishes the manifest's present members under their listening service
/// and withdraws absent ones. Every member is evaluated first; nothing is
/// published if any of them fails.
pub fn export(manifest: &ManifestConfig, facts: &HostFacts, registry: &mut dyn Registry) -> Result<ExportSummary> {
    let mut requests = Vec::new();
    let mut failures = Vec::new();

    for config in &manifest.balancermembers {
        let checked = BalancerMemberRequest::from_config(config, facts)
            .and_then(|request| member::evaluate(&request).map(|_| request));

        match checked {
            Ok(request) => requests.push(request),
            Err(e) => failures.push(e),
        }
    }

    if !failures.is_empty() {
        return Err(Error::Evaluation(failures));
    }

    let exported_by = facts.hostname().unwrap_or("unknown").to_string();
    let mut summary = ExportSummary::default();

    for request in requests {
        let selector = request.listening_service.clone();
        match request.ensure {
            Ensure::Present => {
                tracing::info!(listening_service = %selector, resource = %request.name, "Exporting member");
                registry.publish(&selector, ExportedMember::new(exported_by.clone(), request))?;
                summary.published += 1;
            }
            Ensure::Absent => {
                if registry.withdraw(&selector, &request.name)? {
                    tracing::info!(listening_service = %selector, resource = %request.name, "Withdrew member");
                    summary.withdrawn += 1;
                }
            }
        }
    }

    Ok(summary)
}

fn static_fragment(config: &FragmentConfig) -> Result<Fragment> {
    let body = match (&config.content, &config.source) {
        (Some(content), _) => content.clone(),
        (None, Some(path)) => fs::read_to_string(path).map_err(|source| Error::FragmentSource {
            path: path.clone(),
            source,
        })?,
        (None, None) => String::new(),
    };

    Ok(Fragment {
        id: config.name.clone(),
        order: config.order.clone(),
        body,
    })
}
