// CLI entry point for a Hacktors game.
//
// Builds a world from the default (or a JSON) config, places a Human avatar
// driven by the terminal player controller near the middle of level 0, and
// runs the clock until the player quits or dies. Logs go to stderr through
// `tracing`; set `RUST_LOG` to see them (default: warn).
//
// Usage:
//   hacktors [OPTIONS]
//     --seed <N>          World seed (default: from config)
//     --step              Advance one cycle per key instead of in real time
//     --cycle-ms <MS>     Real-time cycle length (default: from config)
//     --config <PATH>     Load a JSON world config
//     --keys <KEYS>       Play a fixed key sequence headlessly (implies --step)
//     --print-config      Print the effective config as JSON and exit

use anyhow::Context;
use hacktors_cli::console::{Console, ScriptedConsole, TerminalConsole};
use hacktors_cli::player::PlayerController;
use hacktors_sim::World;
use hacktors_sim::block::Block;
use hacktors_sim::catalog::{ItemType, MobileType};
use hacktors_sim::clock::{ClockMode, StopReason};
use hacktors_sim::config::WorldConfig;
use hacktors_sim::item::Item;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Where the avatar starts.
const START: (i32, i32, i32) = (128, 128, 0);

const STARTING_GEAR: [ItemType; 4] = [ItemType::Sword, ItemType::DogEgg, ItemType::Meat, ItemType::Iron];

#[derive(Debug, Default)]
struct Args {
    seed: Option<u64>,
    step: bool,
    cycle_ms: Option<u64>,
    config: Option<String>,
    keys: Option<String>,
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args();
    init_tracing();

    let mut config = match &args.config {
        Some(path) => WorldConfig::load(path).with_context(|| format!("failed to load config {path}"))?,
        None => WorldConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(ms) = args.cycle_ms {
        config.cycle_duration_ms = ms;
    }
    if args.step || args.keys.is_some() {
        config.clock_mode = ClockMode::Step;
    }
    config.validate().context("invalid config")?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let console: Box<dyn Console> = match &args.keys {
        Some(keys) => Box::new(ScriptedConsole::new(keys)),
        None => Box::new(TerminalConsole::spawn()?),
    };

    let mut world = World::new(config);
    let (x, y, z) = START;
    world
        .get_or_create_chunk_at(x, y, z)?
        .set_block(x, y, Block::EMPTY)
        .context("failed to clear the starting tile")?;
    let controller = PlayerController::new(console, world.clock().stop_handle());
    let avatar = world
        .spawn_with(MobileType::Human, x, y, z, Box::new(controller))
        .context("failed to place the avatar")?;
    for kind in STARTING_GEAR {
        let item = Item::create(kind, world.rng_mut());
        world.give_item(avatar, item)?;
    }
    info!(seed = world.config().seed, %avatar, "game started");

    match world.run()? {
        StopReason::Failed(err) => Err(anyhow::Error::new(err).context("the simulation failed")),
        reason => {
            info!(?reason, cycle = world.clock().cycle(), "game over");
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Args {
    let mut parsed = Args::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                parsed.seed = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a number");
                    std::process::exit(1);
                }));
            }
            "--step" => parsed.step = true,
            "--cycle-ms" => {
                i += 1;
                parsed.cycle_ms = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--cycle-ms requires a number of milliseconds");
                    std::process::exit(1);
                }));
            }
            "--config" => {
                i += 1;
                parsed.config = args.get(i).cloned().or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                });
            }
            "--keys" => {
                i += 1;
                parsed.keys = args.get(i).cloned().or_else(|| {
                    eprintln!("--keys requires a key sequence");
                    std::process::exit(1);
                });
            }
            "--print-config" => parsed.print_config = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_usage() {
    println!("Usage: hacktors [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --seed <N>          World seed (default: from config)");
    println!("  --step              Advance one cycle per key instead of in real time");
    println!("  --cycle-ms <MS>     Real-time cycle length (default: from config)");
    println!("  --config <PATH>     Load a JSON world config");
    println!("  --keys <KEYS>       Play a fixed key sequence headlessly (implies --step)");
    println!("  --print-config      Print the effective config as JSON and exit");
    println!("  --help, -h          Show this help");
}
