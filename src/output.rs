//! Terminal output for scans.
//!
//! Plain rendering uses `console` styling and an `indicatif` progress bar;
//! `--json` prints the final results as one JSON object instead.

use crate::cli::ScanOptions;
use crate::scanner::{OpenPort, ScanEvent, ScanResults};
use crate::types::ScanTarget;
use chrono::Local;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;

const RULE: &str = "═══════════════════════════════════════════════════════";
const PROGRESS_TEMPLATE: &str = "  [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";
const BANNER_PREVIEW_CHARS: usize = 50;

/// Renders scan events as they arrive.
pub struct LiveReporter {
    progress: ProgressBar,
    show_open: bool,
}

impl LiveReporter {
    /// `show_progress` draws the bar; `show_open` prints a line per open port.
    pub fn new(total: usize, show_progress: bool, show_open: bool) -> Self {
        let progress = if show_progress {
            let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>.");
            ProgressBar::new(total as u64).with_style(style)
        } else {
            ProgressBar::hidden()
        };

        Self {
            progress,
            show_open,
        }
    }

    pub fn handle(&self, event: ScanEvent) {
        match event {
            ScanEvent::Open(open) => {
                if !self.show_open {
                    return;
                }
                let line = format_open_line(&open);
                if self.progress.is_hidden() {
                    println!("{}", line);
                } else {
                    self.progress.println(line);
                }
            }
            ScanEvent::Progress { completed, .. } => {
                self.progress.set_position(completed as u64);
            }
        }
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }
}

/// One `[OPEN]` line with the first banner line as a hint.
pub fn format_open_line(open: &OpenPort) -> String {
    let mut line = format!(
        "  {}  {}  {}",
        style("[OPEN]").green(),
        style(format!("{:>5}/tcp", open.port)).bold(),
        style(format!("{:<15}", open.service)).yellow()
    );

    let preview = banner_preview(&open.banner);
    if !preview.is_empty() {
        line.push_str(&format!("  -> {}", style(preview).cyan()));
    }
    line
}

fn banner_preview(banner: &str) -> String {
    banner
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(BANNER_PREVIEW_CHARS)
        .collect()
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &ScanTarget, options: &ScanOptions) {
    let span = match (options.ports.first(), options.ports.last()) {
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => "none".to_string(),
    };

    println!();
    println!("{}", style(RULE).cyan().bold());
    println!("  {}", style("portsweep").cyan().bold());
    println!("{}", style(RULE).cyan().bold());
    println!(
        "  Target   : {} ({})",
        style(&target.original).yellow(),
        target.ip
    );
    println!("  Ports    : {} ({} total)", span, options.ports.len());
    println!("  Threads  : {}", options.concurrency);
    println!("  Timeout  : {}s", options.timeout.as_secs_f64());
    println!(
        "  Banners  : {}",
        if options.grab_banners { "Yes" } else { "No" }
    );
    if let Some(deadline) = options.deadline {
        println!("  Deadline : {}s", deadline.as_secs_f64());
    }
    println!(
        "  Started  : {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}", style(RULE).cyan());
    println!();
}

/// Print the closing summary of a plain-text run.
pub fn print_summary(results: &ScanResults) {
    println!();
    println!("{}", style(RULE).cyan());
    println!(
        "  Scan complete. {} found.",
        style(format!("{} open port(s)", results.open_ports.len())).green()
    );
    if !results.complete {
        print_warning(&format!(
            "deadline reached after {} of {} ports; results are partial",
            results.ports_completed, results.ports_scanned
        ));
    }
    println!(
        "  Finished : {}",
        results
            .finished_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}", style(RULE).cyan());
    println!();
}

/// Print results in JSON format.
pub fn print_json(results: &ScanResults) -> io::Result<()> {
    let json = serde_json::to_string_pretty(results).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}

/// Print an informational message.
pub fn print_info(msg: &str) {
    println!("  {} {}", style("[+]").yellow(), msg);
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}
