use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use flagbind::{
    BooleanOptions, Handle, HelpOptions, NumberOptions, Prefix, Registry, StringOptions,
    parse, render, stringify,
};
use tracing_subscriber::{EnvFilter, fmt};

const USAGE: &str = "Usage: flagbind-demo [OPTIONS] [--] [ARGS]...";

/// Exit status for invalid command lines.
const EXIT_USAGE: u8 = 2;

struct DemoFlags {
    help: Handle<bool>,
    version: Handle<bool>,
    verbose: Handle<bool>,
    name: Handle<String>,
    count: Handle<f64>,
    mode: Handle<String>,
    json: Handle<bool>,
    schema: Handle<String>,
}

fn declare(registry: &mut Registry) -> DemoFlags {
    registry.header("General");
    let help = registry.boolean(
        "help",
        "Print help",
        BooleanOptions {
            short: Some('h'),
            urgent: true,
            ..Default::default()
        },
    );
    let version = registry.boolean(
        "version",
        "Print version",
        BooleanOptions {
            short: Some('V'),
            urgent: true,
            ..Default::default()
        },
    );
    let verbose = registry.boolean(
        "verbose",
        "Log a summary of the parse",
        BooleanOptions {
            short: Some('v'),
            invertable: true,
            ..Default::default()
        },
    );

    registry.header("Values");
    let name = registry.string(
        "name",
        "Name to greet",
        StringOptions {
            short: Some('n'),
            arg_name: Some("name".to_string()),
            ..Default::default()
        },
    );
    let count = registry.number(
        "count",
        "How many greetings",
        NumberOptions {
            short: Some('c'),
            default: Some(1.0),
            arg_name: Some("n".to_string()),
            invertable: true,
            ..Default::default()
        },
    );
    let mode = registry.string(
        "mode",
        "Greeting style",
        StringOptions {
            short: Some('m'),
            one_of: Some(vec!["plain".to_string(), "loud".to_string()]),
            arg_optional: Some("loud".to_string()),
            ..Default::default()
        },
    );

    registry.header("Output");
    let json = registry.boolean("json", "Print values as JSON", BooleanOptions::default());
    let schema = registry.string(
        "schema",
        "Parse the arguments after `--` against a JSON flag schema",
        StringOptions {
            arg_name: Some("file".to_string()),
            ..Default::default()
        },
    );

    DemoFlags {
        help,
        version,
        verbose,
        name,
        count,
        mode,
        json,
        schema,
    }
}

fn main() -> Result<ExitCode> {
    init_tracing();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    let mut registry = Registry::new();
    let flags = declare(&mut registry);

    if let Err(err) = parse(&mut registry, &mut argv) {
        eprintln!("error: {err}");
        eprintln!("\nFor more information, try '--help'.");
        return Ok(ExitCode::from(EXIT_USAGE));
    }

    if registry.enabled(flags.help) {
        print!("{}", help(&registry));
        return Ok(ExitCode::SUCCESS);
    }
    if registry.enabled(flags.version) {
        println!("flagbind-demo {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let json = registry.enabled(flags.json);
    if let Some(path) = registry.get(flags.schema) {
        let mut schema_registry = load_schema(Path::new(&path))?;
        if let Err(err) = parse(&mut schema_registry, &mut argv) {
            eprintln!("error: {err}");
            return Ok(ExitCode::from(EXIT_USAGE));
        }
        report(&schema_registry, &argv, json)?;
    } else {
        if !json {
            greet(&registry, &flags);
        }
        report(&registry, &argv, json)?;
    }

    if registry.enabled(flags.verbose) {
        tracing::info!(positionals = argv.len(), "parse complete");
    }
    Ok(ExitCode::SUCCESS)
}

fn help(registry: &Registry) -> String {
    let options = HelpOptions {
        prefix: Prefix::Columns(2),
        compact_headers: true,
    };
    format!("{USAGE}\n{}", render(registry, &options))
}

fn load_schema(path: &Path) -> Result<Registry> {
    tracing::debug!(path = %path.display(), "loading flag schema");
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema: {}", path.display()))?;
    Registry::from_json(&text).with_context(|| format!("invalid schema: {}", path.display()))
}

fn greet(registry: &Registry, flags: &DemoFlags) {
    let Some(name) = registry.get(flags.name) else {
        return;
    };
    let times = registry
        .get(flags.count)
        .filter(|n| n.is_finite() && *n > 0.0)
        .map_or(0, |n| n as usize);
    let loud = registry.get(flags.mode).as_deref() == Some("loud");

    for _ in 0..times {
        let line = format!("Hello, {name}!");
        if loud {
            println!("{}", line.to_uppercase());
        } else {
            println!("{line}");
        }
    }
}

fn report(registry: &Registry, positionals: &[String], json: bool) -> Result<()> {
    if json {
        let doc = serde_json::json!({
            "values": registry.values(),
            "positionals": positionals,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    for flag in registry.flags() {
        println!("{}: {}", flag.long(), flag.value_text());
    }
    println!("positionals: {}", stringify(positionals));
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
