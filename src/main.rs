use std::fs::File;

use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};

use mathscare::core::config::{self, CliOverrides, MathsCareConfig};
use mathscare::tui::{self, Prefill};

#[derive(Parser)]
#[command(name = "mathscare", about = "Terminal client for the MathsCare AI math tutor")]
struct Args {
    /// Backend base URL (overrides config file and MATHSCARE_BACKEND_URL)
    #[arg(long)]
    backend_url: Option<String>,

    /// YouTube URL to prefill in the video tab
    #[arg(long)]
    video: Option<String>,

    /// PDF path to prefill; also selects the document tab
    #[arg(long)]
    pdf: Option<String>,

    /// Milliseconds between revealed answer characters
    #[arg(long)]
    reveal_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Config errors are logged once the logger exists.
    let (file_config, config_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (MathsCareConfig::default(), Some(e)),
    };
    let cli = CliOverrides {
        backend_url: args.backend_url,
        reveal_interval_ms: args.reveal_interval_ms,
    };
    let resolved = config::resolve(&file_config, &cli);

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    if let Some(e) = config_error {
        log::warn!("Ignoring config file: {}", e);
    }
    log::info!(
        "MathsCare starting up (backend: {}, reveal interval: {:?})",
        resolved.backend_url,
        resolved.reveal_interval
    );

    let prefill = Prefill {
        video_url: args.video,
        pdf_path: args.pdf,
    };
    tui::run(resolved, prefill)
}
