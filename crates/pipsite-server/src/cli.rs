use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pipsite_catalog::{CatalogError, CheckReport};
use pipsite_config::{Config, LoadOptions};
use pipsite_core::PipSite;

use crate::telemetry::init_tracing;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();

    let mut options = LoadOptions::default();
    if let Some(path) = &cli.config {
        options = options.with_override_path(path);
    }
    let mut config = Config::load(options)?;
    init_tracing(&config.logging)?;

    let command = cli.command.unwrap_or(Command::Serve(ServeArgs::default()));
    if let Command::Serve(args) = &command {
        if let Some(bind) = args.bind {
            config.server.bind = bind;
        }
    }
    let site = PipSite::bootstrap(config)?;

    match command {
        Command::Serve(_) => handle_serve(site),
        Command::Check => handle_check(&site),
        Command::Render(args) => handle_render(&site, args),
        Command::List => handle_list(&site),
    }
}

fn handle_serve(site: PipSite) -> Result<i32> {
    let bind = site.config().server.bind;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(bind)
            .await
            .with_context(|| format!("failed to bind {bind}"))?;
        crate::serve(listener, site).await
    })?;
    Ok(0)
}

fn handle_check(site: &PipSite) -> Result<i32> {
    let report = site.documents().check()?;
    print_check(site, &report);
    Ok(if report.is_healthy() { 0 } else { 1 })
}

fn print_check(site: &PipSite, report: &CheckReport) {
    let settings = site.documents().settings();
    for number in &report.duplicates {
        println!("warning: PIP {number} is declared more than once; the first entry is served");
    }
    for missing in &report.missing {
        println!("error: PIP {} has no body at {}", missing.number, missing.key);
    }
    if !report.rpc_present {
        println!("warning: RPC document {} is missing", settings.rpc_document);
    }
    println!(
        "checked {} documents from {}: {} missing, {} duplicate numbers",
        report.documents,
        settings.index,
        report.missing.len(),
        report.duplicates.len()
    );
}

fn handle_render(site: &PipSite, args: RenderArgs) -> Result<i32> {
    match site.documents().get_document(args.number) {
        Ok(document) => {
            emit(&document.html);
            Ok(0)
        }
        Err(CatalogError::NotFound { number }) => {
            eprintln!("PIP {number} not found");
            Ok(2)
        }
        Err(err) => Err(err.into()),
    }
}

fn handle_list(site: &PipSite) -> Result<i32> {
    for record in site.documents().list_documents()? {
        println!("{}\t{}", record.number, record.title);
    }
    Ok(0)
}

fn emit(content: &str) {
    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "PIP documentation site",
    propagate_version = true
)]
struct Cli {
    /// Configuration file layered over `.pipsite.toml`
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    /// Verify the PIP index against the document store
    Check,
    /// Print one PIP rendered to HTML
    Render(RenderArgs),
    /// List PIPs in display order
    List,
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Override `[server] bind`
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,
}

#[derive(Args)]
struct RenderArgs {
    /// PIP number
    number: u32,
}
