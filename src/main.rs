use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use hand_mouse_lib::core::config::{Config, Profile};
use hand_mouse_lib::core::diagnostics;
use hand_mouse_lib::models::capture::CameraSource;
use hand_mouse_lib::RunOptions;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "hand-mouse", version, about = "Control the mouse cursor with hand gestures")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Track the hand and drive the mouse (the default)
    Run(RunArgs),
    /// Download the hand landmarker model
    DownloadModel {
        #[arg(short, long, default_value = "hand_landmarker.task")]
        output: PathBuf,
        /// Download even if the file already exists
        #[arg(long)]
        force: bool,
    },
    /// Check that cameras, inference and input injection are available
    Doctor {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Inspect or reset the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Low-latency profile: no smoothing, gestures or preview
    #[arg(long)]
    fast: bool,
    /// Device index or http(s) stream URL
    #[arg(long)]
    camera: Option<CameraSource>,
    #[arg(long)]
    model: Option<PathBuf>,
    /// Log mouse actions instead of performing them
    #[arg(long)]
    dry_run: bool,
    /// Play back recorded landmarks instead of using the camera
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Capture frames on a separate thread
    #[arg(long)]
    threaded_capture: bool,
    #[arg(long)]
    no_preview: bool,
    /// Settings file to use instead of ~/.hand_mouse/settings.json
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Reset,
    Path,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run(args),
        Command::DownloadModel { output, force } => {
            hand_mouse_lib::download_model(&output, force).map_err(|e| anyhow!("{}", e))?;
            Ok(())
        }
        Command::Doctor { config } => {
            let config = load_config(config.as_deref())?;
            let results = diagnostics::run_checks(&config);
            if diagnostics::print_report(&results) {
                Ok(())
            } else {
                Err(anyhow!("dependency check failed"))
            }
        }
        Command::Config { action } => config_command(action),
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    if args.fast {
        config.apply_profile(Profile::Fast);
    }
    if let Some(camera) = args.camera {
        config.camera = camera;
    }
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if args.no_preview {
        config.preview = false;
    }

    config
        .validate()
        .map_err(|e| anyhow!("{}", e))
        .context("Invalid configuration")?;

    hand_mouse_lib::run(RunOptions {
        config,
        dry_run: args.dry_run,
        replay: args.replay,
        threaded_capture: args.threaded_capture,
    })
    .map_err(|e| anyhow!("{}", e))?;

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let loaded = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    loaded
        .map_err(|e| anyhow!("{}", e))
        .context("Failed to load configuration")
}

fn config_command(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(None)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            Config::reset()
                .map_err(|e| anyhow!("{}", e))
                .context("Failed to reset configuration")?;
            println!("✓ Configuration reset to defaults");
        }
        ConfigAction::Path => {
            let path = Config::get_config_path().map_err(|e| anyhow!("{}", e))?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
