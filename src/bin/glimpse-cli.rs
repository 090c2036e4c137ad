use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use glimpse::hosts::{JsonLinesHost, TerminalStatusLine};
use glimpse::{
    AnnouncementMessage, DisplayMode, FrameDiffClassifier, LiveRegionAnnouncer, Opts, Politeness,
    RawFrameSource, Session,
};

#[derive(Parser, Debug)]
#[command(name = "glimpse")]
#[command(about = "Announce motion in a raw RGBA video stream through screen-reader live regions")]
struct Params {
    /// Raw RGBA frame stream to read (`-` for stdin), e.g. from
    /// `ffmpeg -f v4l2 -i /dev/video0 -f rawvideo -pix_fmt rgba -`.
    #[arg(short = 'i', long = "input", default_value = "-")]
    input: String,

    /// Frame width in pixels.
    #[arg(short = 'W', long = "width")]
    width: u32,

    /// Frame height in pixels.
    #[arg(short = 'H', long = "height")]
    height: u32,

    /// Query string carrying a custom message, e.g. `?message=all+clear`.
    #[arg(short = 'q', long = "query")]
    query: Option<String>,

    /// Literal announcement text; takes precedence over `--query`.
    #[arg(short = 'm', long = "message")]
    message: Option<String>,

    /// JSON file with library options; flags below override it.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Minimum gap between announcements in milliseconds.
    #[arg(long = "debounce-ms")]
    debounce_ms: Option<u64>,

    /// Skip the visual status line and only announce.
    #[arg(long = "announce-only", default_value_t = false)]
    announce_only: bool,

    /// Live-region priority.
    #[arg(long = "politeness", value_enum)]
    politeness: Option<Politeness>,

    /// Luma difference for a pixel to count as changed.
    #[arg(long = "threshold")]
    threshold: Option<u8>,

    /// Changed-pixel count above which a frame is motion.
    #[arg(long = "min-pixels")]
    min_pixels: Option<usize>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    glimpse::init_logging();

    if let Err(err) = run().await {
        error!(error = ?err, "glimpse failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let params = Params::parse();
    let opts = build_opts(&params)?;

    let message = match params.message.as_deref() {
        Some(text) => AnnouncementMessage::new(text),
        None => AnnouncementMessage::resolve(params.query.as_deref()),
    };

    let input = open_input(&params.input)?;
    let source = RawFrameSource::spawn(input, params.width, params.height)
        .context("failed to start frame reader")?;

    let host = Arc::new(JsonLinesHost::new(io::stdout()));
    let announcer = LiveRegionAnnouncer::new(host)
        .with_politeness(opts.politeness)
        .with_timing(opts.announce_timing());

    let frame_diff = opts.frame_diff;
    let mut session = Session::new(opts, message, source, announcer)
        .context("invalid session options")?
        .with_status_surface(TerminalStatusLine::new(io::stderr()));

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let stats = session
        .run(async move { Ok(FrameDiffClassifier::new(frame_diff)) }, shutdown)
        .await
        .context("session failed")?;

    info!(stats = %serde_json::to_string(&stats)?, "done");
    Ok(())
}

fn build_opts(params: &Params) -> Result<Opts> {
    let mut opts = match &params.config {
        Some(path) => Opts::from_json_file(path)
            .with_context(|| format!("failed to load config from '{}'", path.display()))?,
        None if params.announce_only => Opts::announce_only(),
        None => Opts::default(),
    };

    if params.announce_only {
        opts.display_mode = DisplayMode::AnnounceOnly;
    }
    if let Some(ms) = params.debounce_ms {
        opts.debounce_interval_ms = ms;
    }
    if let Some(politeness) = params.politeness {
        opts.politeness = politeness;
    }
    if let Some(threshold) = params.threshold {
        opts.frame_diff.threshold = threshold;
    }
    if let Some(min_pixels) = params.min_pixels {
        opts.frame_diff.motion_pixel_count = min_pixels;
    }

    opts.validate()?;
    Ok(opts)
}

fn open_input(input: &str) -> Result<Box<dyn Read + Send>> {
    if input == "-" {
        return Ok(Box::new(io::stdin()));
    }
    let file = File::open(input).with_context(|| format!("failed to open input '{input}'"))?;
    Ok(Box::new(file))
}
