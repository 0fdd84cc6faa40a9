use clap::Parser;
use dom_walker::report::build_report;
use dom_walker::{HtmlScope, Settings, Strategy};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Run selector handlers over an HTML document and print a JSON report.
#[derive(Parser, Debug)]
#[command(name = "dom-walker", version)]
struct Args {
    /// HTML document to walk
    file: PathBuf,

    /// CSS selector to visit; repeat for several, visited in the given order
    #[arg(short, long = "selector", required = true)]
    selectors: Vec<String>,

    /// sequential or concurrent
    #[arg(long)]
    strategy: Option<Strategy>,

    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => match Settings::from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("failed to load settings from {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => Settings::default(),
    };
    if let Some(strategy) = args.strategy {
        settings.strategy = strategy;
    }
    if args.pretty {
        settings.output.pretty = true;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(settings.log.ansi)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args, &settings).await {
        error!("walk failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: &Args, settings: &Settings) -> dom_walker::Result<()> {
    let scope = HtmlScope::from_file(&args.file)?;
    info!(
        file = %args.file.display(),
        strategy = %settings.strategy,
        selectors = args.selectors.len(),
        "walking document"
    );

    let report = build_report(settings.strategy, scope, &args.selectors, &settings.output).await?;
    println!("{}", report.to_json(settings.output.pretty)?);
    Ok(())
}
