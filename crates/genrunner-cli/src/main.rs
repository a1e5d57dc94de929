//! genrunner - run code generators over an extracted API.
//!
//! This binary assembles the run configuration (command line plus optional
//! project file), gates startup through the cross-process instance
//! coordinator when a capacity bound is configured, and drives the resolved
//! generator set.

mod pipeline;
mod usage;

use clap::Parser;
use genrunner_core::generator::GeneratorRegistry;
use genrunner_core::{options, project, OptionsMap};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "genrunner")]
#[command(about = "Run code generators over an extracted API")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// Header file and typesystem file
    #[arg(value_name = "FILE")]
    inputs: Vec<String>,

    /// Text file containing a description of the binding project; entries
    /// are defaults that command-line arguments override
    #[arg(long)]
    project_file: Option<PathBuf>,

    /// Generator set to be used (e.g. qtdoc)
    #[arg(long)]
    generator_set: Option<String>,

    /// The directory where the generated files will be written
    #[arg(long)]
    output_directory: Option<String>,

    /// File used for copyright headers of generated files
    #[arg(long)]
    license_file: Option<String>,

    /// Include paths used by the C++ parser
    #[arg(long)]
    include_paths: Option<String>,

    /// Paths used when searching for typesystems
    #[arg(long)]
    typesystem_paths: Option<String>,

    /// Supported api version used to generate the bindings
    #[arg(long)]
    api_version: Option<String>,

    /// Limit on concurrently running genrunner instances, 1 to 10
    #[arg(long, value_name = "MAX")]
    max_instances: Option<String>,

    /// Name of the instance pool to compete in; required with
    /// --max-instances
    #[arg(long, value_name = "KEY")]
    coordination_key: Option<String>,

    /// Directory holding instance-pool state (defaults to the per-user
    /// runtime directory)
    #[arg(long, value_name = "DIR")]
    coordination_dir: Option<PathBuf>,

    /// Set the debug level
    #[arg(long, value_name = "sparse|medium|full")]
    debug_level: Option<String>,

    /// Avoid printing any message
    #[arg(long)]
    silent: bool,

    /// Generator-specific option, repeatable
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Display help, including the resolved generator set's options
    #[arg(long)]
    help: bool,

    /// Output version information and exit
    #[arg(long)]
    version: bool,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.silent {
        Level::ERROR
    } else {
        match args.debug_level.as_deref() {
            Some("medium") => Level::DEBUG,
            Some("full") => Level::TRACE,
            _ => Level::INFO,
        }
    };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    if args.version {
        println!("genrunner v{}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let registry = pipeline::builtin_registry();

    if args.help {
        usage::print_usage(&registry, args.generator_set.as_deref());
        return;
    }

    let options = match assemble_options(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("genrunner: {e}");
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = pipeline::run(&registry, &options, args.coordination_dir.as_deref()) {
        eprintln!("genrunner: {e}");
        std::process::exit(e.exit_code());
    }
}

/// Merge the project file (defaults) and command line (overrides) into one
/// options map, the shape generators consume.
fn assemble_options(args: &Args) -> genrunner_core::Result<OptionsMap> {
    let mut merged = OptionsMap::new();

    if let Some(ref path) = args.project_file {
        merged.merge(project::load(path)?);
    }

    let mut cli = OptionsMap::new();
    for (n, input) in args.inputs.iter().enumerate() {
        cli.set_positional(n + 1, input);
    }
    if let Some(ref v) = args.generator_set {
        cli.insert("generator-set", v);
    }
    if let Some(ref v) = args.output_directory {
        cli.insert("output-directory", v);
    }
    if let Some(ref v) = args.license_file {
        cli.insert("license-file", v);
    }
    if let Some(ref v) = args.include_paths {
        cli.insert("include-paths", v);
    }
    if let Some(ref v) = args.typesystem_paths {
        cli.insert("typesystem-paths", v);
    }
    if let Some(ref v) = args.api_version {
        cli.insert("api-version", v);
    }
    if let Some(ref v) = args.max_instances {
        cli.insert("max-instances", v);
    }
    if let Some(ref v) = args.coordination_key {
        cli.insert("coordination-key", v);
    }
    if args.silent {
        cli.insert("silent", "");
    }
    for assignment in &args.set {
        let (key, value) = options::parse_assignment(assignment)?;
        cli.insert(key, value);
    }

    merged.merge(cli);
    Ok(merged)
}
