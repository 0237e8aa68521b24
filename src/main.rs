use anyhow::{Context, Result};
use clap::Parser;
use portsweep::cli::Args;
use portsweep::config::Settings;
use portsweep::output::{self, LiveReporter};
use portsweep::report::write_report;
use portsweep::scanner::{run_scan, ScanJob, TcpProber};
use portsweep::types::ScanTarget;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("portsweep={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref()).context("loading settings")?;
    let options = args.resolve_options(&settings)?;

    let target = ScanTarget::resolve(&args.host).await?;

    let plain = !args.json;
    if plain && !args.quiet {
        output::print_scan_header(&target, &options);
    }

    let prober = Arc::new(TcpProber::new(
        target.ip,
        options.timeout,
        options.grab_banners,
    ));
    let job = ScanJob::new(options.ports.clone())
        .with_concurrency(options.concurrency)
        .with_deadline(options.deadline);

    let reporter = LiveReporter::new(options.ports.len(), !args.quiet, plain);
    let results = run_scan(prober, &target, job, |event| reporter.handle(event)).await?;
    reporter.finish();

    if plain {
        if !args.quiet {
            output::print_summary(&results);
        }
    } else {
        output::print_json(&results).context("printing results")?;
    }

    if let Some(path) = &args.output {
        write_report(&results, path)?;
        if plain && !args.quiet {
            output::print_info(&format!("Report saved -> {}", path.display()));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
