//! balancermember command line.
//!
//! ```text
//! render  → compile manifest, print assembled file
//! apply   → compile, write target if changed, reload
//! export  → publish local members to the shared registry
//! watch   → apply, then re-apply on every manifest or registry change
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use balancermember::catalog::{self, Catalog};
use balancermember::config::{load_config, watcher::ConfigWatcher, ManifestConfig};
use balancermember::error::Error;
use balancermember::facts::HostFacts;
use balancermember::observability::logging;
use balancermember::registry::{DirectoryRegistry, RegistryWatcher};

#[derive(Parser)]
#[command(name = "balancermember")]
#[command(about = "Assemble load-balancer member fragments into a configuration file", long_about = None)]
struct Cli {
    /// Path to the manifest.
    #[arg(short, long, global = true, default_value = "/etc/balancermember/manifest.toml")]
    config: PathBuf,

    /// Overrides observability.log_level from the manifest.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the assembled file without writing it
    Render,
    /// Write the target file if it changed and reload the consumer
    Apply,
    /// Publish this host's members to the registry
    Export,
    /// Apply, then re-apply whenever the manifest or collected members change
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let manifest = load_config(&cli.config)?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| manifest.observability.log_level.clone());
    logging::init(&level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        manifest = %cli.config.display(),
        "balancermember starting"
    );

    match cli.command {
        Commands::Render => {
            let catalog = compile(&manifest)?;
            print!("{}", catalog.render()?);
        }
        Commands::Apply => {
            apply(&manifest)?;
        }
        Commands::Export => {
            let path = manifest.registry.path.as_ref().ok_or(Error::NoRegistry)?;
            let mut registry = DirectoryRegistry::new(path);
            let facts = HostFacts::discover(&manifest.facts);
            let summary = catalog::export(&manifest, &facts, &mut registry)?;
            tracing::info!(
                published = summary.published,
                withdrawn = summary.withdrawn,
                "Export complete"
            );
        }
        Commands::Watch => watch(&cli.config, manifest).await?,
    }

    Ok(())
}

fn compile(manifest: &ManifestConfig) -> Result<Catalog, Error> {
    let facts = HostFacts::discover(&manifest.facts);
    let registry = manifest.registry.path.as_ref().map(DirectoryRegistry::new);
    Catalog::compile(
        manifest,
        &facts,
        registry.as_ref().map(|r| r as &dyn balancermember::registry::Registry),
    )
}

fn apply(manifest: &ManifestConfig) -> Result<(), Error> {
    let catalog = compile(manifest)?;
    catalog.apply_to_target()?;
    Ok(())
}

async fn watch(path: &Path, mut manifest: ManifestConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = apply(&manifest) {
        tracing::error!(error = %e, "Initial apply failed");
    }

    let (watcher, mut updates) = ConfigWatcher::new(path);
    let _watcher = watcher.run()?;
    let (mut _registry_watcher, mut registry_changes) = watch_registry(&manifest)?;

    loop {
        tokio::select! {
            Some(update) = updates.recv() => {
                manifest = update;
                match watch_registry(&manifest) {
                    Ok(registry) => (_registry_watcher, registry_changes) = registry,
                    Err(e) => tracing::error!(error = %e, "Failed to watch registry"),
                }
                if let Err(e) = apply(&manifest) {
                    tracing::error!(error = %e, "Apply failed, target left unchanged");
                }
            }
            Some(()) = registry_changes.recv() => {
                if let Err(e) = apply(&manifest) {
                    tracing::error!(error = %e, "Apply failed, target left unchanged");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
        }
    }

    Ok(())
}

/// Watches the collected selectors of the manifest's registry. Without a
/// registry or anything to collect, the receiver never yields.
fn watch_registry(
    manifest: &ManifestConfig,
) -> Result<(Option<RecommendedWatcher>, mpsc::UnboundedReceiver<()>), notify::Error> {
    match &manifest.registry.path {
        Some(root) if !manifest.registry.collect.is_empty() => {
            let (watcher, changes) = RegistryWatcher::new(root, &manifest.registry.collect);
            Ok((Some(watcher.run()?), changes))
        }
        _ => {
            let (_, changes) = mpsc::unbounded_channel();
            Ok((None, changes))
        }
    }
}
