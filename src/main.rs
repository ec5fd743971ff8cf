use clap::{Parser, Subcommand};
use lightbox::animation::{ManualTicker, ThreadTicker, TickKind, Ticker, ZoomDirection};
use lightbox::config::{self, ViewerConfig};
use lightbox::imaging::{RustCodec, Viewport};
use lightbox::output;
use lightbox::session::{SessionSettings, ViewerEvent, ViewerSession};
use lightbox::siblings::SiblingSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound on ticks for one render, far beyond any converging animation.
const MAX_TICKS: usize = 100_000;
/// How long the realtime loop waits for a ticker before giving up.
const TICK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "lightbox")]
#[command(about = "Headless driver for the lightbox image viewer core")]
#[command(long_about = "\
Headless driver for the lightbox image viewer core

Opens an image the way the viewer does, applies zoom, rotation and color
adjustments, runs the zoom animation until it settles, and writes the
resulting viewport to a file.

Zoom animation:
  Every zoom request moves a target; each frame (~60 Hz) closes 20% of the
  remaining gap until it is under 0.001. Holding a zoom key (--hold-in N)
  multiplies the target by 1.05 on every hold tick (~20 Hz).

Run 'lightbox gen-config' to generate a documented lightbox.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./lightbox.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Image to open
    image: PathBuf,

    /// Output file for the final frame (format from extension)
    #[arg(short, long)]
    output: PathBuf,

    /// Viewport width (default: view.width)
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height (default: view.height)
    #[arg(long)]
    height: Option<u32>,

    /// Fit the image to the viewport
    #[arg(long, conflicts_with = "zoom")]
    fit: bool,

    /// Animate to this zoom level (0.1 to 5.0)
    #[arg(long)]
    zoom: Option<f32>,

    /// Quarter turns clockwise; negative turns counter-clockwise
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    rotate: i32,

    /// Brightness offset as a fraction of full scale (-1.0 to 1.0)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    brightness: f32,

    /// Contrast multiplier (0.0 to 4.0)
    #[arg(long, default_value_t = 1.0)]
    contrast: f32,

    /// Use the dark background
    #[arg(long)]
    dark: bool,

    /// Hold zoom-in for this many hold ticks
    #[arg(long, conflicts_with = "hold_out")]
    hold_in: Option<u32>,

    /// Hold zoom-out for this many hold ticks
    #[arg(long)]
    hold_out: Option<u32>,

    /// Also write every animation frame into this directory
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Drive the animation with real timer threads instead of synthetic ticks
    #[arg(long)]
    realtime: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Render an image through the viewer pipeline into a file
    Render(RenderArgs),
    /// List the images next to an image, in navigation order
    Siblings {
        /// Image whose directory to list
        image: PathBuf,
    },
    /// Show what the status bar would show for an image
    Status {
        image: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a copy of an image (format from the output extension)
    Save {
        image: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print a stock lightbox.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            render(&config, &args)?;
        }
        Command::Siblings { image } => {
            let siblings = SiblingSet::scan(&image);
            output::print_siblings(&siblings);
        }
        Command::Status { image, json } => {
            let config = load_config(cli.config.as_deref())?;
            let mut session = headless_session(&config, config.session_settings()?, None);
            session.handle(ViewerEvent::Open(image))?;
            if let Some(status) = session.status() {
                if json {
                    println!("{}", serde_json::to_string_pretty(&status)?);
                } else {
                    output::print_status(&status);
                }
            }
        }
        Command::Save { image, output } => {
            let config = load_config(cli.config.as_deref())?;
            let mut session = headless_session(&config, config.session_settings()?, None);
            session.handle(ViewerEvent::Open(image))?;
            session.handle(ViewerEvent::Save(output.clone()))?;
            println!("Saved {}", output.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `--config`, or `./lightbox.toml` if it exists, or stock defaults.
fn load_config(path: Option<&Path>) -> Result<ViewerConfig, config::ConfigError> {
    let path = path.unwrap_or(Path::new(config::DEFAULT_CONFIG_FILE));
    config::load_config(path)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn headless_session(
    config: &ViewerConfig,
    settings: SessionSettings,
    viewport: Option<Viewport>,
) -> ViewerSession<RustCodec, ManualTicker> {
    let viewport = viewport.unwrap_or(Viewport::new(config.view.width, config.view.height));
    ViewerSession::new(
        RustCodec::new(),
        ManualTicker::new(),
        ManualTicker::new(),
        viewport,
        settings,
    )
}

fn render(config: &ViewerConfig, args: &RenderArgs) -> Result<(), Box<dyn Error>> {
    let mut settings = config.session_settings()?;
    settings.fit_to_window |= args.fit;
    settings.dark_mode |= args.dark;
    let viewport = Viewport::new(
        args.width.unwrap_or(config.view.width),
        args.height.unwrap_or(config.view.height),
    );
    if let Some(dir) = &args.frames {
        std::fs::create_dir_all(dir)?;
    }

    if args.realtime {
        let (tx, rx) = std::sync::mpsc::channel();
        let session = ViewerSession::new(
            RustCodec::new(),
            ThreadTicker::new(TickKind::Frame, tx.clone()),
            ThreadTicker::new(TickKind::Hold, tx),
            viewport,
            settings,
        );
        run_render(session, args, |session| loop {
            let tick = rx.recv_timeout(TICK_TIMEOUT)?;
            if session.animator().accepts(tick) {
                return Ok(tick.kind);
            }
            log::trace!("dropping stale {tick:?}");
        })
    } else {
        let animation = settings.animation;
        let session = headless_session(config, settings, Some(viewport));
        let ticks = synthetic_ticks(animation.frame_interval, animation.hold_interval);
        run_render(session, args, ticks)
    }
}

/// Tick source for the manual tickers: frame ticks, with a hold tick
/// interleaved at the ratio the real intervals would produce.
fn synthetic_ticks(
    frame_interval: Duration,
    hold_interval: Duration,
) -> impl FnMut(&ViewerSession<RustCodec, ManualTicker>) -> Result<TickKind, Box<dyn Error>> {
    let ratio = (hold_interval.as_millis() / frame_interval.as_millis().max(1)).max(1) as usize;
    let mut since_hold = 0;
    move |session| {
        let animator = session.animator();
        let hold_due = animator.hold_ticker().is_running()
            && (since_hold >= ratio || !animator.frame_ticker().is_running());
        if hold_due {
            since_hold = 0;
            Ok(TickKind::Hold)
        } else {
            since_hold += 1;
            Ok(TickKind::Frame)
        }
    }
}

fn run_render<T: Ticker>(
    mut session: ViewerSession<RustCodec, T>,
    args: &RenderArgs,
    mut next_tick: impl FnMut(&ViewerSession<RustCodec, T>) -> Result<TickKind, Box<dyn Error>>,
) -> Result<(), Box<dyn Error>> {
    session.handle(ViewerEvent::Open(args.image.clone()))?;

    let turn = if args.rotate < 0 {
        ViewerEvent::RotateLeft
    } else {
        ViewerEvent::RotateRight
    };
    for _ in 0..args.rotate.unsigned_abs() {
        session.handle(turn.clone())?;
    }
    if args.brightness != 0.0 {
        session.handle(ViewerEvent::AdjustBrightness(args.brightness))?;
    }
    if args.contrast != 1.0 {
        session.handle(ViewerEvent::AdjustContrast(args.contrast - 1.0))?;
    }
    if let Some(zoom) = args.zoom {
        session.handle(ViewerEvent::ZoomTo(zoom))?;
    }

    let mut held = match (args.hold_in, args.hold_out) {
        (Some(n), _) if n > 0 => Some((ZoomDirection::In, n)),
        (_, Some(n)) if n > 0 => Some((ZoomDirection::Out, n)),
        _ => None,
    };
    if let Some((direction, _)) = held {
        session.handle(ViewerEvent::ZoomKeyDown(direction))?;
    }

    let mut frames = 0;
    let mut ticks = 0;
    while !session.is_idle() {
        ticks += 1;
        if ticks > MAX_TICKS {
            return Err("zoom animation did not settle".into());
        }
        let kind = next_tick(&session)?;
        if session.handle(ViewerEvent::Tick(kind))? {
            frames += 1;
            if let Some(dir) = &args.frames {
                session.save_display(&dir.join(format!("frame_{frames:04}.png")))?;
            }
        }
        if kind == TickKind::Hold {
            if let Some((direction, remaining)) = held {
                held = match remaining - 1 {
                    0 => {
                        session.handle(ViewerEvent::ZoomKeyUp(direction))?;
                        None
                    }
                    left => Some((direction, left)),
                };
            }
        }
    }
    log::debug!("animation settled after {ticks} ticks, {frames} frames");

    session.save_display(&args.output)?;
    if let Some(status) = session.status() {
        println!(
            "{}",
            output::format_render_summary(&status, &args.output, frames)
        );
    }
    Ok(())
}
