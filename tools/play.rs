/// Play — runs a story script on the console.
///
/// Usage: play <script.md> [--start <scene>] [--options <options.ron>]
///             [--config <player.ron>] [--dump]
///
/// Press Enter to continue past each line; type a number at a prompt.
/// Set RUST_LOG (e.g. `RUST_LOG=player=debug`) to trace the engine.

use scenemark::{CompileOptions, Compiler, ConsoleInput, ConsoleSink, Player, PlayerConfig};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let script_path = args[1].clone();
    let mut start = None;
    let mut options_path = None;
    let mut config_path = None;
    let mut dump = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--start" if i + 1 < args.len() => {
                i += 1;
                start = Some(args[i].clone());
            }
            "--options" if i + 1 < args.len() => {
                i += 1;
                options_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--dump" => dump = true,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let options = match options_path {
        Some(ref path) => CompileOptions::load_from_ron(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("ERROR: Failed to load options: {}", e);
            process::exit(1);
        }),
        None => CompileOptions::default(),
    };

    let mut config = match config_path {
        Some(ref path) => PlayerConfig::load_from_ron(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("ERROR: Failed to load player config: {}", e);
            process::exit(1);
        }),
        None => PlayerConfig::default(),
    };
    if let Some(start) = start {
        config.start_scene = start;
    }

    let compilation = match Compiler::new(options).compile_file(Path::new(&script_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };
    for warning in &compilation.warnings {
        eprintln!("WARNING: {}", warning);
    }

    if dump {
        match compilation.graph.to_ron() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("ERROR: Failed to dump graph: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let mut player = match Player::builder(&compilation.graph).config(config).build() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let mut input = ConsoleInput::stdin();
    let mut sink = ConsoleSink::stdout();
    let state = match player.run(&mut input, &mut sink) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("\nERROR: {}", e);
            process::exit(1);
        }
    };

    println!("\n=== The End ===");
    for (name, value) in state.iter() {
        println!("  {} = {}", name, value);
    }
}

fn print_usage() {
    println!("Usage: play <script.md> [--start <scene>] [--options <options.ron>] [--config <player.ron>] [--dump]");
}
