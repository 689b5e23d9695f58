//! snare-operator - Snare deception operator
//!
//! This binary runs the rotation engine over a population of decoy
//! credentials and canary tokens, seeding the store from an optional
//! provisioning manifest and rotating until interrupted.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use snare_audit::{AuditEvent, AuditLogger, TracingAuditLogger};
use snare_rotation::RotationEngine;
use snare_secrets::{SecretKind, SecretName, SecretObject, synthesize};
use snare_store::{MemoryStore, ObjectStore};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{Manifest, Profile, engine_config};

#[derive(Parser)]
#[command(name = "snare-operator")]
#[command(about = "Snare deception operator - decoy credential and canary token rotation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the rotation engine
    Run {
        /// Resource profile
        #[arg(long, value_enum, default_value_t = Profile::Medium)]
        profile: Profile,

        /// Path to a provisioning manifest to seed the store from
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Override the profile's worker count
        #[arg(long)]
        workers: Option<usize>,

        /// Override the profile's resync cadence (e.g. 30s, 5m)
        #[arg(long, value_parser = humantime::parse_duration)]
        resync: Option<Duration>,
    },

    /// Write a sample provisioning manifest
    SeedManifest {
        /// Path to write the manifest to
        #[arg(short, long, default_value = "decoys.json")]
        output: PathBuf,
    },

    /// Synthesize one payload and print its shape (values redacted)
    Synthesize {
        /// Kind to synthesize (ssh, database, api, aws, generic, canary-token)
        #[arg(long)]
        kind: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            profile,
            manifest,
            workers,
            resync,
        } => {
            run_engine(profile, manifest, workers, resync).await?;
        }

        Commands::SeedManifest { output } => {
            let json = serde_json::to_string_pretty(&Manifest::sample())?;
            std::fs::write(&output, json)
                .with_context(|| format!("writing {}", output.display()))?;
            info!(path = %output.display(), "wrote sample manifest");
        }

        Commands::Synthesize { kind } => {
            synthesize_once(&kind)?;
        }
    }

    Ok(())
}

async fn run_engine(
    profile: Profile,
    manifest: Option<PathBuf>,
    workers: Option<usize>,
    resync: Option<Duration>,
) -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let audit: Arc<dyn AuditLogger> = Arc::new(TracingAuditLogger::new());

    if let Some(path) = manifest {
        let manifest = Manifest::load(&path)?;
        let seeded = seed(&store, audit.as_ref(), &manifest).await?;
        info!(path = %path.display(), seeded, "provisioned decoys from manifest");
    } else {
        warn!("no manifest given; the store starts empty and only rotates externally created objects");
    }

    let config = engine_config(profile, workers, resync);
    info!(profile = ?profile, workers = config.workers, resync = ?config.resync_interval, "starting engine");

    let engine = RotationEngine::new(Arc::clone(&store), audit, config);
    let handle = engine.start().await?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("interrupt received");

    handle.shutdown().await;
    Ok(())
}

/// Creates every manifest entry in the store, standing in for the external
/// provisioner.
async fn seed(
    store: &MemoryStore,
    audit: &dyn AuditLogger,
    manifest: &Manifest,
) -> anyhow::Result<usize> {
    let mut seeded = 0usize;
    for entry in &manifest.decoys {
        let name = SecretName::new(&entry.namespace, &entry.name)
            .with_context(|| format!("manifest entry {}/{}", entry.namespace, entry.name))?;
        let interval = entry.interval();

        let object = if entry.kind == SecretKind::CanaryToken {
            SecretObject::canary_token(name.clone(), interval)?
        } else {
            SecretObject::decoy_credential(name.clone(), entry.kind, interval)?
        };

        store
            .insert(object)
            .await
            .with_context(|| format!("seeding {name}"))?;
        audit.log(&AuditEvent::secret_created(
            name.to_string(),
            entry.kind.as_str(),
        ));
        seeded += 1;
    }
    Ok(seeded)
}

/// Prints the field shape of one synthesized payload without revealing the
/// generated values.
fn synthesize_once(kind: &str) -> anyhow::Result<()> {
    let kind = match kind {
        "ssh" => SecretKind::Ssh,
        "database" => SecretKind::Database,
        "api" => SecretKind::Api,
        "aws" => SecretKind::Aws,
        "generic" => SecretKind::Generic,
        "canary-token" => SecretKind::CanaryToken,
        other => bail!("unknown kind: {other}"),
    };

    let payload = synthesize(kind)?;
    println!("kind: {kind}");
    for (field, value) in &payload {
        println!("  {field}: <{} bytes>", value.len());
    }
    Ok(())
}
