//! Stache CLI
//!
//! Usage:
//!   stache [OPTIONS] [NAME]
//!
//! Options:
//!   -d, --dir <DIR>         Template directory (default: .)
//!   -e, --extension <EXT>   Template file extension (default: mustache)
//!   --data <FILE>           Data file, TOML or JSON by extension
//!   -v, --verbose           Log template resolution
//!   -h, --help              Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stache::{DirectorySource, TemplateError, TemplateRepository};

#[derive(Parser)]
#[command(name = "stache")]
#[command(about = "Mustache templates from the command line")]
struct Cli {
    /// Template name to resolve in the template directory (reads a
    /// template from stdin if not provided)
    name: Option<String>,

    /// Template directory
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Template file extension
    #[arg(short, long, default_value = "mustache")]
    extension: String,

    /// Data file, TOML or JSON by extension
    #[arg(long)]
    data: Option<PathBuf>,

    /// Log template resolution
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--verbose` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("stache=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stache=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // If no template name and stdin is a terminal (interactive), show
    // intro help
    if cli.name.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    // Load render data
    let data = match &cli.data {
        Some(path) => match load_data(path) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("Error loading data '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => serde_json::Value::Null,
    };

    let mut repository = TemplateRepository::with_source(
        DirectorySource::new(&cli.dir).with_extension(cli.extension),
    );

    // Resolve by name, or compile the template read from stdin
    let template = match &cli.name {
        Some(name) => match repository.template(name) {
            Ok(template) => template,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            let mut source = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut source) {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
            match repository.template_from_str(&source) {
                Ok(template) => template,
                Err(TemplateError::Parse { id: None, source: cause }) => {
                    eprintln!("{}", cause.format(&source, "<stdin>"));
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    print!("{}", template.render_value(&data));
}

/// Parse a data file into render data, picking the format by extension
fn load_data(path: &Path) -> Result<serde_json::Value, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&text).map_err(|e| e.to_string()),
        Some("toml") => {
            let value: toml::Value = toml::from_str(&text).map_err(|e| e.to_string())?;
            serde_json::to_value(value).map_err(|e| e.to_string())
        }
        _ => Err("expected a .json or .toml data file".to_string()),
    }
}

fn print_intro() {
    println!(
        "{}",
        r#"Stache - Mustache templates from the command line

USAGE:
    stache [OPTIONS] [NAME]
    echo '<template>' | stache [OPTIONS]

OPTIONS:
    -d, --dir <DIR>          Template directory (default: current directory)
    -e, --extension <EXT>    Template file extension (default: mustache)
    --data <FILE>            Data file, TOML or JSON by extension
    -v, --verbose            Log template resolution
    -h, --help               Print help

QUICK START:
    echo 'Hello {{name}}!' | stache --data user.toml
    stache page --dir templates --data page.json > page.html

A NAME resolves to <dir>/<name>.<extension>. Templates reference each
other with {{>name}}; references resolve relative to the directory of
the referencing template, and every template is compiled once no matter
how many times it is referenced."#
    );
}
