mod cli;

use clap::Parser;
use cli::{Cli, Commands, ShareArgs};
use quickshare::bundle::InputFile;
use quickshare::config::Config;
use quickshare::humanize;
use quickshare::observability;
use quickshare::pipeline::{self, ShareError, ShareOptions, ShareOutcome};
use quickshare::providers::ProviderRegistry;
use quickshare::qr::QrStyle;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, BoxError> {
    let config = Config::load_with(cli.config.as_deref())?;

    match cli.command {
        Commands::Share(args) => share(&config, args, cli.verbose).await,
        Commands::Providers => {
            list_providers(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn share(config: &Config, args: ShareArgs, verbose: u8) -> Result<ExitCode, BoxError> {
    let registry = ProviderRegistry::from_config(config)?;
    let name = args
        .provider
        .as_deref()
        .unwrap_or(config.default_provider.as_str());
    let provider = registry.get(name)?;

    let options = ShareOptions {
        archive_name: config.bundle.archive_name.clone(),
        qr: QrStyle::default(),
    };

    let result = match read_inputs(&args.files).await {
        Ok(files) => match pipeline::prepare(&files, provider.as_ref(), &options) {
            Ok(bundle) => {
                eprintln!(
                    "Uploading {} ({}) to {}...",
                    bundle.filename,
                    bundle.size(),
                    provider.name()
                );
                pipeline::publish(&bundle, provider.as_ref(), &options).await
            }
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            present(&outcome);
            if let Some(path) = &args.save_qr {
                tokio::fs::write(path, &outcome.qr_png)
                    .await
                    .map_err(|e| format!("failed to save QR code to {}: {e}", path.display()))?;
                eprintln!("QR code saved to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            report(&e, verbose);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn read_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>, ShareError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(InputFile::read(path).await?);
    }
    Ok(files)
}

fn present(outcome: &ShareOutcome) {
    println!("{}", outcome.qr_text);
    println!();
    println!("{}", outcome.url);
    println!();
    match outcome.expires_at() {
        Some(at) => println!(
            "{} (until {})",
            outcome.retention.notice,
            at.format("%Y-%m-%d %H:%M")
        ),
        None => println!("{}", outcome.retention.notice),
    }
}

fn report(err: &ShareError, verbose: u8) {
    error!(error = %err, kind = ?err.failure_kind(), "Share failed");
    eprintln!("error: {err}");

    if let ShareError::Upload(upload) = err {
        if let Some(body) = upload.body().filter(|_| verbose > 0) {
            eprintln!("--- response body ---\n{body}");
        }
    }
}

fn list_providers(config: &Config) -> Result<(), BoxError> {
    let registry = ProviderRegistry::from_config(config)?;

    for provider in registry.iter() {
        let marker = if provider.name() == config.default_provider {
            "*"
        } else {
            " "
        };
        let limit = provider
            .max_upload_bytes()
            .map(|b| format!(", limit {b}"))
            .unwrap_or_default();
        println!(
            "{marker} {:<12} {} (kept {}{limit})",
            provider.name(),
            provider.endpoint(),
            humanize::duration(provider.retention().window),
        );
    }

    Ok(())
}
