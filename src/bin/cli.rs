// CLI binary: exiting on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use lightdance_timeline::demo::create_demo_show;
use lightdance_timeline::engine::{EngineState, PartStatus, TimelineController};
use lightdance_timeline::error::EngineError;
use lightdance_timeline::export::{dancer_fiber_data, resolved_frame};
use lightdance_timeline::model::DancerName;
use lightdance_timeline::settings;
use lightdance_timeline::store::{save_snapshot, JsonDirSource};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "lightdance-cli", about = "Light-dance timeline resolver", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show data directory
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the show at a time in seconds
    Status {
        #[arg(long, allow_negative_numbers = true)]
        time: f64,
    },
    /// Jump to the start of a control frame (clamped into range)
    ControlIndex {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Jump to the start of a position frame (clamped into range)
    PosIndex {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Resolve a sequence of times against one state, as an editor scrub would
    Scrub {
        #[arg(required = true, allow_negative_numbers = true)]
        times: Vec<f64>,
    },
    /// Export one dancer's fiber keyframes with resolved colors
    ExportFiber {
        #[arg(long)]
        dancer: String,
    },
    /// Write the demo show into a directory
    Demo {
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the JSON schema of settings.json
    Schema,
}

// ── Helpers ──────────────────────────────────────────────────────

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_controller(data_dir: &Path) -> Result<(TimelineController, EngineState), EngineError> {
    let settings = settings::load_settings(data_dir)?;
    let controller = TimelineController::load(&JsonDirSource::new(data_dir), settings)?;
    let mut state = EngineState::new();
    controller.init_current_led_effect(&mut state);
    Ok((controller, state))
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn print_state(controller: &TimelineController, state: &EngineState, raw_json: bool) {
    if raw_json {
        print_json(&resolved_frame(state));
        return;
    }

    println!(
        "t={:.3}s  control #{}  position #{}{}",
        state.current_time(),
        state.current_control_index(),
        state.current_pos_index(),
        if state.current_fade() { "  (fade)" } else { "" }
    );
    for (dancer, parts) in state.current_status() {
        let pos = state
            .current_pos()
            .get(dancer)
            .map(|p| format!("({:.2}, {:.2}, {:.2})", p.x, p.y, p.z))
            .unwrap_or_else(|| "-".to_string());
        println!("  {dancer} @ {pos}");
        for (part, status) in parts {
            match status {
                PartStatus::Fiber(f) => {
                    println!("    {part:<16} rgb({:>3},{:>3},{:>3})  alpha {:.2}", f.0, f.1, f.2, f.3);
                }
                PartStatus::Led(l) => {
                    let playback = controller.led_playback(state, dancer, part).ok();
                    let queue = playback
                        .and_then(|p| p.effect())
                        .map(|e| format!("{} step {}", e.name, playback.map_or(0, |p| p.cursor())))
                        .unwrap_or_else(|| "idle".to_string());
                    println!("    {part:<16} src {:<10} alpha {:.2}  [{queue}]", l.src, l.alpha);
                }
            }
        }
    }
}

fn fail(e: &EngineError) -> ! {
    eprintln!("Error: {e}");
    process::exit(1);
}

// ── Main ─────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing();
    let raw = cli.json;

    match &cli.command {
        Commands::Demo { out } => {
            let show = create_demo_show().unwrap_or_else(|e| fail(&e));
            if let Err(e) = save_snapshot(&show, out) {
                fail(&EngineError::from(e));
            }
            if let Err(e) = settings::save_settings(out, &settings::EngineSettings::default()) {
                fail(&e);
            }
            println!("Demo show written to {}", out.display());
            return;
        }
        Commands::Schema => {
            print_json(&settings::settings_schema());
            return;
        }
        _ => {}
    }

    let (controller, mut state) = load_controller(&cli.data_dir).unwrap_or_else(|e| fail(&e));

    let result = match &cli.command {
        Commands::Status { time } => controller
            .set_current_time(&mut state, *time)
            .map(|()| print_state(&controller, &state, raw)),
        Commands::ControlIndex { index } => controller
            .set_current_control_index(&mut state, *index)
            .map(|()| print_state(&controller, &state, raw)),
        Commands::PosIndex { index } => controller
            .set_current_pos_index(&mut state, *index)
            .map(|()| print_state(&controller, &state, raw)),
        Commands::Scrub { times } => times.iter().try_for_each(|&t| {
            controller.set_current_time(&mut state, t)?;
            print_state(&controller, &state, raw);
            Ok::<(), EngineError>(())
        }),
        Commands::ExportFiber { dancer } => {
            dancer_fiber_data(controller.snapshot(), &DancerName::from(dancer.as_str()))
                .map(|frames| print_json(&frames))
        }
        Commands::Demo { .. } | Commands::Schema => Ok(()),
    };

    if let Err(e) = result {
        fail(&e);
    }
}
