//! nt2tlink: converts a NarrativeTime JSON-lines corpus into one JSON
//! relation graph per document.
//!
//! Usage: nt2tlink <input.jsonl> <output_dir> [--config <file.ron>] [--local-ids] [--debug-text]

use narrative_time::core::pipeline::{load_jsonl, Converter};
use std::path::Path;
use std::process;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("NT_LOG")
            .unwrap_or_else(|_| EnvFilter::new("narrative_time=info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn usage() -> ! {
    println!("Usage: nt2tlink <input.jsonl> <output_dir> [--config <file.ron>] [--local-ids] [--debug-text]");
    process::exit(0);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 || args[1] == "--help" || args[1] == "-h" {
        usage();
    }

    init_tracing();

    let input = Path::new(&args[1]);
    let output_dir = Path::new(&args[2]);

    let mut builder = Converter::builder();
    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                builder = builder.config_path(&args[i]);
            }
            "--local-ids" => builder = builder.use_global_instance_ids(false),
            "--debug-text" => builder = builder.attach_debug_text(true),
            other => {
                eprintln!("ERROR: unknown argument '{}'", other);
                process::exit(2);
            }
        }
        i += 1;
    }

    let mut converter = match builder.build() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let docs = match load_jsonl(input) {
        Ok(docs) => docs,
        Err(e) => {
            eprintln!("ERROR: Failed to read '{}': {}", input.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(output_dir) {
        eprintln!("ERROR: Failed to create '{}': {}", output_dir.display(), e);
        process::exit(1);
    }

    let report = converter.convert_corpus(&docs);

    let mut write_errors = 0;
    for doc in &report.converted {
        let path = output_dir.join(format!("{}.json", doc.id));
        let written = serde_json::to_string_pretty(&doc.output())
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            eprintln!("ERROR: Failed to write '{}': {}", path.display(), e);
            write_errors += 1;
        }
    }

    for failure in &report.failures {
        eprintln!("FAILED: {}: {}", failure.id, failure.error);
    }

    println!(
        "\nSummary: {} converted, {} failed, {} not written",
        report.converted.len(),
        report.failures.len(),
        write_errors
    );

    if !report.is_clean() || write_errors > 0 {
        process::exit(1);
    }
}
