/// Script Linter — compiles story scripts and reports problems.
///
/// Usage: script_linter <script.md | dir> [--options <options.ron>]

use scenemark::core::commands::is_known_lang;
use scenemark::{CompileOptions, Compiler, Event};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: script_linter <script.md | dir> [--options <options.ron>]");
        process::exit(0);
    }

    let mut options = CompileOptions::default();
    let mut i = 2;
    while i < args.len() {
        if args[i] == "--options" && i + 1 < args.len() {
            i += 1;
            options = match CompileOptions::load_from_ron(Path::new(&args[i])) {
                Ok(o) => o,
                Err(e) => {
                    eprintln!("ERROR: Failed to load options: {}", e);
                    process::exit(1);
                }
            };
        }
        i += 1;
    }

    let root = Path::new(&args[1]);
    let mut scripts = Vec::new();
    if root.is_file() {
        scripts.push(root.to_path_buf());
    } else if root.is_dir() {
        collect_scripts(root, &mut scripts);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", args[1]);
        process::exit(1);
    }
    scripts.sort();

    let compiler = Compiler::new(options);
    let mut errors = 0;
    let mut warnings = 0;

    println!("\n=== Script Lint Report ===\n");

    for path in &scripts {
        let (e, w) = lint_script(&compiler, path);
        errors += e;
        warnings += w;
    }

    println!(
        "\nSummary: {} scripts, {} errors, {} warnings",
        scripts.len(),
        errors,
        warnings
    );

    if errors > 0 {
        process::exit(1);
    }
}

fn collect_scripts(dir: &Path, scripts: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_scripts(&path, scripts);
            } else if path.extension().and_then(|s| s.to_str()) == Some("md") {
                scripts.push(path);
            }
        }
    }
}

/// Returns (errors, warnings) for one script.
fn lint_script(compiler: &Compiler, path: &Path) -> (usize, usize) {
    let compilation = match compiler.compile_file(path) {
        Ok(c) => c,
        Err(e) => {
            println!("ERROR: {}: {}", path.display(), e);
            return (1, 0);
        }
    };

    let graph = &compilation.graph;
    let staging = graph
        .scenes()
        .flat_map(|scene| scene.events.iter())
        .filter(|event| event.is_presentation())
        .count();
    println!(
        "{}: {} scenes, {} staging events",
        path.display(),
        graph.len(),
        staging
    );

    for warning in &compilation.warnings {
        println!("WARNING: {}: {}", path.display(), warning);
    }

    let dangling = graph.dangling_targets();
    for d in &dangling {
        println!(
            "ERROR: {}: scene '{}' has a {} to missing scene '{}'",
            path.display(),
            d.scene,
            d.kind,
            d.target
        );
    }

    let mut unreferenced = 0;
    for scene in graph.scenes().skip(1) {
        let referenced = graph.scenes().any(|other| {
            other.events.iter().any(|event| match event {
                Event::Jump { target, .. } | Event::Choice { target, .. } => {
                    target == &scene.name
                }
                _ => false,
            })
        });
        if !referenced {
            println!(
                "WARNING: {}: scene '{}' is never jumped to (macro-only or unreachable)",
                path.display(),
                scene.name
            );
            unreferenced += 1;
        }
    }

    // Known block languages only survive compilation when a shallow macro
    // splices them in.
    let mut unlowered = 0;
    for scene in graph.scenes() {
        for event in &scene.events {
            if let Event::CodeBlock { lang, .. } = event {
                if is_known_lang(lang) {
                    println!(
                        "WARNING: {}: scene '{}' inlines a `{}` block that stays unlowered (try Transitive expansion)",
                        path.display(),
                        scene.name,
                        lang
                    );
                    unlowered += 1;
                }
            }
        }
    }

    (
        dangling.len(),
        compilation.warnings.len() + unreferenced + unlowered,
    )
}
