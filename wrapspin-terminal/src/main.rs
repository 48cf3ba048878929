/// wrapspin terminal demo: the chocolate bar in your terminal
///
/// Controls:
///   - Left-drag: rotate the bar
///   - Space / U: unwrap or re-wrap
///   - Q / ESC: quit
use clap::Parser;
use std::path::PathBuf;
use wrapspin_core::{ControllerConfig, ProjectionMode, Result};
use wrapspin_terminal::{AppOptions, TerminalApp};

#[derive(Parser, Debug)]
#[command(version, about = "Interactive 3D chocolate-bar unwrap demo for the terminal")]
struct Args {
    /// TOML file overriding controller tuning
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start with the wrapper already open
    #[arg(short, long)]
    unwrapped: bool,

    /// Target frames per second
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Use an orthographic camera instead of perspective
    #[arg(long)]
    orthographic: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Print the effective controller config as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ControllerConfig::load(path)?,
        None => ControllerConfig::default(),
    };
    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }
    log::info!("starting wrapspin terminal demo at {} fps", args.fps);

    let options = AppOptions {
        config,
        unwrapped: args.unwrapped,
        fps: args.fps,
        projection: if args.orthographic {
            ProjectionMode::Orthographic
        } else {
            ProjectionMode::Perspective
        },
        color: !args.no_color,
    };

    let mut app = TerminalApp::new(options)?;
    app.run()
}
