use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use recap_core::{
    BackendConfig, FileDownloadSink, HttpBackend, RequestController, RequestState,
    backend::DEFAULT_BASE_URL, offer_document,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod status;
mod view;

type Controller = RequestController<HttpBackend>;

#[derive(Parser)]
#[command(name = "recap")]
#[command(
    about = "Summarize videos with an AI analysis service and export the summary as markdown"
)]
struct Cli {
    /// Video URL. Omit to enter URLs one per line.
    url: Option<String>,

    /// Base URL of the analysis service
    #[arg(short, long, default_value = DEFAULT_BASE_URL)]
    backend: String,

    /// Report language (e.g., "en", "zh-CN"). Defaults to the service's choice.
    #[arg(short, long)]
    lang: Option<String>,

    /// Save the summary as markdown after a successful analysis
    #[arg(short, long)]
    download: bool,

    /// Directory for saved summaries. Defaults to the downloads folder.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

fn create_spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")?,
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

/// Runs one submission to completion and renders the outcome. Returns whether
/// it succeeded.
async fn analyze(
    controller: &Controller,
    url: &str,
    sink: Option<&FileDownloadSink>,
) -> Result<bool> {
    let pending = match controller.begin(url) {
        Ok(pending) => pending,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            return Ok(false);
        }
    };

    // No new submission is read until this one resolves.
    let spinner = create_spinner("Analyzing video...")?;
    pending.resolve().await;
    spinner.finish_and_clear();

    let state = controller.state();
    println!("{}", view::render_state(&state));

    if !matches!(state, RequestState::Succeeded(_)) {
        return Ok(false);
    }
    if let Some(sink) = sink {
        save(controller, sink).await?;
    }
    Ok(true)
}

async fn save(controller: &Controller, sink: &FileDownloadSink) -> Result<()> {
    let document = controller.export(chrono::Local::now().date_naive())?;
    offer_document(sink, &document).await?;
    tracing::debug!(filename = %document.suggested_filename, "summary exported");
    println!(
        "\n{} {}",
        style("Saved:").dim(),
        style(sink.path_for(&document.suggested_filename).display()).cyan()
    );
    Ok(())
}

async fn interactive(controller: &Controller, sink: &FileDownloadSink) -> Result<()> {
    println!(
        "{}",
        style("Enter a video URL, :save to export the last summary, :quit to exit.").dim()
    );
    let status_printer = status::print_when_resolved(controller.subscribe_backend_status());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" | ":q" => break,
            ":save" => {
                if let Err(e) = save(controller, sink).await {
                    eprintln!("{} {}", style("Error:").red().bold(), e);
                }
            }
            "" => {}
            url => {
                analyze(controller, url, None).await?;
            }
        }
    }
    status_printer.abort();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let backend = HttpBackend::new(BackendConfig::new(cli.backend));
    let controller = RequestController::with_language(backend, cli.lang);
    let sink = FileDownloadSink::new(cli.out_dir.unwrap_or_else(FileDownloadSink::default_dir));

    println!(
        "\n{}  {}\n",
        style("recap").cyan().bold(),
        style("Video Summarizer").dim()
    );

    // Runs alongside the analysis; only the status footer depends on it.
    tokio::spawn({
        let controller = controller.clone();
        async move { controller.check_backend_health().await }
    });

    let Some(url) = cli.url else {
        interactive(&controller, &sink).await?;
        return Ok(());
    };

    let sink = cli.download.then_some(&sink);
    let succeeded = analyze(&controller, &url, sink).await?;

    // A health check that has not answered yet must not hold the process open.
    println!(
        "\n{}",
        view::render_backend_status(&controller.backend_status())
    );

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
