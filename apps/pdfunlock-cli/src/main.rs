//! pdfunlock: batch client for the PDF unlock endpoint
//!
//! Sends each file with its password to the decryption endpoint (or unlocks
//! it in-process with `--local`), writes `unlocked_<name>` for every success
//! and prints a summary. Exits with status 1 when any file failed and 2 when
//! no file was given.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use pdfunlock_batch::{
    BatchDriver, BatchOptions, DirectorySink, DownloadSink, HttpTransport, InProcessTransport,
    PasswordPolicy, SourceFile, Transport, ZipSink,
};
use pdfunlock_core::LopdfCapability;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod prompt;
mod report;

use cli::Cli;
use prompt::{StderrNotifier, StdinPrompt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pdfunlock=debug,pdfunlock_batch=debug,pdfunlock_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let transport: Arc<dyn Transport> = if cli.local {
        Arc::new(InProcessTransport::new(LopdfCapability::new()))
    } else {
        let http = HttpTransport::new(cli.endpoint.as_str(), Duration::from_secs(cli.timeout_secs))?;
        info!(endpoint = http.endpoint(), timeout_secs = cli.timeout_secs, "using remote endpoint");
        Arc::new(http)
    };

    tokio::fs::create_dir_all(&cli.output_dir)
        .await
        .with_context(|| format!("could not create {}", cli.output_dir.display()))?;

    let bundle = cli.zip.then(|| Arc::new(ZipSink::new()));
    let sink: Arc<dyn DownloadSink> = match &bundle {
        Some(zip) => zip.clone(),
        None => Arc::new(DirectorySink::new(&cli.output_dir)),
    };

    let driver = BatchDriver::new(transport, sink)
        .with_notifier(Arc::new(StderrNotifier))
        .with_options(BatchOptions {
            concurrency: usize::from(cli.concurrency),
        });

    let files: Vec<SourceFile> = cli.files.iter().map(SourceFile::from_path).collect();
    let policy = resolve_policy(&cli, !files.is_empty()).await;

    let outcome = match driver.run(files, &policy).await {
        Ok(outcome) => outcome,
        // The driver has already shown the notice
        Err(_) => return Ok(ExitCode::from(2)),
    };

    if let Some(zip) = &bundle {
        if !zip.is_empty() {
            let path = zip.write_bundle(&cli.output_dir).await?;
            info!(path = %path.display(), files = zip.len(), "wrote bundle");
            println!("Bundle: {}", path.display());
        }
    }

    println!("{}", report::summary(&outcome));

    Ok(if outcome.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Without `--password` or `--per-file`, ask once for a shared password
async fn resolve_policy(cli: &Cli, has_files: bool) -> PasswordPolicy {
    if cli.per_file {
        return PasswordPolicy::PerFile(Box::new(StdinPrompt));
    }
    match &cli.password {
        Some(password) => PasswordPolicy::Uniform(password.clone()),
        None if has_files => {
            let password = StdinPrompt
                .read_password("Password for all files: ")
                .await
                .unwrap_or_default();
            PasswordPolicy::Uniform(password)
        }
        None => PasswordPolicy::Uniform(String::new()),
    }
}
