//! Vintage Booth CLI - capture sessions and collage export.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use console::Term;
use serde::Serialize;
use tracing::{debug, info, warn};

use booth::capture::{CaptureSession, DirectoryCamera, TickOutcome, run_auto_snap};
use booth::cli::{self, Cli, Commands};
use booth::collage::CollageView;
use booth::config::BoothConfig;
use booth::error::{BoothError, Result, ResultExt};
use booth::export::{
    DirectorySink, DownloadSink, ExportOrchestrator, ImageRasterizer, Notice, RenderNode,
};
use booth::logging::init_logging;
use booth::output::{
    ArrangeReport, CaptureReport, ContrastReport, Output, OutputMode, StyleCatalog, VersionInfo,
};
use booth::session::{FileStore, Snapshot};

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> bool {
        option_env!("VERGEN_GIT_DIRTY") == Some("true")
    }

    pub fn build_date() -> &'static str {
        option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    let output = OutputMode::from_cli(&cli).into_output();
    match run(&cli, output.as_ref()) {
        Ok(code) => code,
        Err(e) => {
            output.error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, out: &dyn Output) -> Result<ExitCode> {
    match &cli.command {
        None => {
            print_quick_start(cli);
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Capture(args)) => cmd_capture(cli, out, args),
        Some(Commands::Arrange(args)) => cmd_arrange(cli, out, args),
        Some(Commands::Export(args)) => cmd_export(cli, out, args),
        Some(Commands::Contrast(args)) => {
            out.contrast(&ContrastReport::new(args.text, args.background));
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Styles) => {
            out.styles(&StyleCatalog::build());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Version) => {
            out.version_info(&version_info());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Completions(args)) => {
            clap_complete::generate(args.shell, &mut Cli::command(), "booth", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

// === Quick Start ===

#[derive(Serialize)]
struct RobotQuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    commands: [(&'static str, &'static str); 5],
    output_modes: [&'static str; 3],
}

fn print_quick_start(cli: &Cli) {
    let commands = [
        ("capture", "booth capture --from <DIR> --count 4"),
        ("arrange", "booth arrange --layout masonry"),
        ("export", "booth export --layout polaroid --output <DIR>"),
        ("contrast", "booth contrast '#fefefe' --background '#ffffff'"),
        ("styles", "booth styles"),
    ];
    if cli.use_json() {
        let help = RobotQuickStart {
            tool: "booth",
            version: build_info::VERSION,
            description: "Photo booth capture sessions and collage export",
            commands,
            output_modes: ["--format=text (default)", "--robot or --format=json", "--format=json-compact"],
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&help).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!("booth {} - vintage photo booth\n", build_info::VERSION);
        for (name, example) in commands {
            println!("  {name:<10} {example}");
        }
        println!("\nRun `booth --help` for all options.");
    }
}

// === Commands ===

fn load_config(cli: &Cli) -> Result<BoothConfig> {
    BoothConfig::load(cli.config.as_deref())
}

fn session_dir(cli: &Cli, config: &BoothConfig) -> Result<PathBuf> {
    match &cli.session_dir {
        Some(dir) => Ok(dir.clone()),
        None => config.session_dir(),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .with_context(|| "Failed to start async runtime")
}

/// Apply CLI style overrides, warning about replaced caption colors.
fn apply_overrides(view: &mut CollageView, style: &cli::StyleArgs, warn: &dyn Fn(&str)) {
    for event in style.events() {
        if let Some(check) = view.apply(event) {
            if check.was_substituted() {
                warn(&format!(
                    "Caption color is too close to the background; using {}",
                    check.color()
                ));
            }
        }
    }
}

fn cmd_capture(cli: &Cli, out: &dyn Output, args: &cli::CaptureArgs) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let mut settings = config.capture;
    if let Some(count) = args.count {
        settings.photo_count = count;
    }
    if let Some(timer) = args.timer {
        settings.timer_secs = timer;
    }
    if let Some(effect) = args.effect {
        settings.effect = effect;
    }
    if let Some(facing) = args.facing {
        settings.facing = Some(facing);
    }

    let camera = DirectoryCamera::open(&args.from)?;
    let mut session = CaptureSession::new(camera, settings)?;
    session.set_filter(args.filter.unwrap_or(config.style.filter));

    let tick = Duration::from_millis(args.tick_ms);
    let outcomes = runtime()?.block_on(run_auto_snap(&mut session, tick));
    let missed = outcomes
        .iter()
        .filter(|o| matches!(o, TickOutcome::Missed))
        .count();

    let mut shots = Vec::new();
    if let Some(shot_dir) = &args.save_shots {
        let sink = DirectorySink::new(shot_dir.clone());
        for index in 0..session.photos().len() {
            shots.push(session.download_photo(index, &sink)?);
        }
    }

    let dir = session_dir(cli, &config)?;
    let mut store = FileStore::open(&dir)?;
    let photos = session.photos().len();
    let view = session.finish(&mut store)?;
    info!(photos, missed, "Capture finished");

    out.capture_report(&CaptureReport {
        photos,
        requested: settings.photo_count,
        missed,
        filter: session.filter(),
        effect: settings.effect,
        facing: session.facing(),
        session_dir: dir,
        shots,
        next_view: view.path(),
    });
    Ok(ExitCode::SUCCESS)
}

fn cmd_arrange(cli: &Cli, out: &dyn Output, args: &cli::ArrangeArgs) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let mut view = match args.count {
        Some(count) => {
            debug!(count, "Arranging placeholder photos");
            let placeholders = (0..count)
                .map(|i| Snapshot::new(i, "image/png", Vec::<u8>::new()))
                .collect();
            CollageView::new(placeholders, config.style.to_style())
        }
        None => {
            let store = FileStore::open(session_dir(cli, &config)?)?;
            CollageView::load(&store, config.style.to_style())
        }
    };
    apply_overrides(&mut view, &args.style, &|message| out.warning(message));

    let placeholder = view.placeholder();
    out.arrangement(&ArrangeReport::new(view.arrangement().clone(), placeholder));
    Ok(ExitCode::SUCCESS)
}

fn cmd_export(cli: &Cli, out: &dyn Output, args: &cli::ExportArgs) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let store = FileStore::open(session_dir(cli, &config)?)?;
    let mut view = CollageView::load(&store, config.style.to_style());
    if args.copy {
        // stdout carries the image, so warnings go to the log.
        apply_overrides(&mut view, &args.style, &|message| warn!("{message}"));
    } else {
        apply_overrides(&mut view, &args.style, &|message| out.warning(message));
    }

    let mut settings = config.export.clone();
    if let Some(quality) = args.quality {
        settings.quality = quality;
    }
    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(scheme) = args.filename {
        settings.filename = scheme;
    }
    let dir = args.output.clone().unwrap_or_else(|| config.output_dir());

    let orchestrator = ExportOrchestrator::new(
        ImageRasterizer,
        DirectorySink::new(dir),
        config.product_name.as_str(),
        settings,
    )?;

    let node = view.render_node();
    node.decode_all();
    if args.copy {
        return copy_to_stdout(&orchestrator, &node);
    }
    let notice = runtime()?.block_on(orchestrator.handle_download(&node));
    out.notice(&notice);

    Ok(match notice {
        Notice::Saved { .. } => ExitCode::SUCCESS,
        Notice::NoPhotos | Notice::Busy | Notice::Failed { .. } => ExitCode::FAILURE,
    })
}

/// Write the clipboard rendition of `node` to stdout for piping.
fn copy_to_stdout<S: DownloadSink>(
    orchestrator: &ExportOrchestrator<ImageRasterizer, S>,
    node: &RenderNode,
) -> Result<ExitCode> {
    if Term::stdout().is_term() {
        return Err(BoothError::StdoutIsTerminal);
    }
    let copied = runtime()?.block_on(orchestrator.copy_collage(node))?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&copied.data)?;
    stdout.flush()?;
    info!(bytes = copied.data.len(), mime = copied.mime, sha256 = %copied.sha256, "Collage written to stdout");
    Ok(ExitCode::SUCCESS)
}

fn version_info() -> VersionInfo {
    VersionInfo {
        version: build_info::VERSION,
        git_sha: build_info::git_sha(),
        git_dirty: build_info::git_dirty(),
        build_date: build_info::build_date(),
        rustc_version: build_info::rustc_semver(),
        target: build_info::target(),
    }
}
