use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use config::{RegistryConfig, UpdateOptions};
use npm_registry::{HttpTransport, MetadataGateway};
use tracing::{error, info};

mod config;
mod controller;
mod entity;
mod usecase;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    ///packages to update, `name` or `name@spec`
    #[arg(value_delimiter = ',')]
    packages: Vec<String>,
    ///update every package declared in package.json
    #[arg(long)]
    all: bool,
    ///use the "next" dist-tag instead of "latest"
    #[arg(long)]
    next: bool,
    ///continue even when peer dependencies would break
    #[arg(long)]
    force: bool,
    ///with --all, skip packages the registry does not know
    #[arg(long)]
    best_effort: bool,
    ///only run the migrations of one installed package
    #[arg(long)]
    migrate_only: bool,
    ///version to migrate from, requires --migrate-only
    #[arg(long, requires = "migrate_only")]
    from: Option<String>,
    ///version to migrate to, defaults to the installed version
    #[arg(long, requires = "from")]
    to: Option<String>,
    ///registry url, overrides .npmrc
    #[arg(long)]
    registry: Option<String>,
    ///project directory containing package.json
    #[arg(long, default_value = ".")]
    root: PathBuf,
    ///print the plan as JSON instead of applying it
    #[arg(long)]
    dry_run: bool,
    ///do not run npm install after updating package.json
    #[arg(long)]
    skip_install: bool,
    ///log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> UpdateOptions {
        UpdateOptions {
            all: self.all,
            next: self.next,
            force: self.force,
            best_effort: self.best_effort,
            migrate_only: self.migrate_only,
            from: self.from.clone(),
            to: self.to.clone(),
            dry_run: self.dry_run,
            skip_install: self.skip_install,
            ..Default::default()
        }
        .with_packages(&self.packages)
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = RegistryConfig::load(&args.root, args.registry.as_deref())?;
    info!("using registry {}", config.registry);

    let transport = HttpTransport::new(config.registry, config.auth_token)?;
    let gateway = MetadataGateway::new(Arc::new(transport));

    controller::update(&args.root, &args.options(), &gateway).await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    //logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // reqwest is built without a default crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
