mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::exit_code_for;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "depsgen",
    version,
    about = "Assemble and trim dependency manifests for built applications"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a deps manifest from a request file.
    Generate {
        /// Path to the request TOML file.
        #[arg(default_value = "depsgen.toml")]
        request: PathBuf,
        /// Write the manifest here instead of the request's `output`.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Merge runtime store descriptors and print the filtered package index.
    MergeStore {
        /// Store descriptor TOML files, in priority order.
        descriptors: Vec<PathBuf>,
    },
    /// Remove conflict-excluded files from an existing deps manifest.
    Trim {
        /// Path to the deps manifest.
        manifest: PathBuf,
        /// Skip list TOML file with `[[skip]]` entries.
        #[arg(long)]
        skip: PathBuf,
        /// Package folder used to decompose skip paths (repeatable).
        #[arg(long = "package-folder")]
        package_folders: Vec<String>,
        /// Write the trimmed manifest here instead of in place.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the libraries of a deps manifest.
    Inspect {
        /// Path to the deps manifest.
        manifest: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("DEPSGEN_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;

    let result = match cli.command {
        Commands::Generate { request, output } => {
            commands::generate::run(&request, output.as_deref(), json_output)
        }
        Commands::MergeStore { descriptors } => {
            commands::merge_store::run(&descriptors, json_output)
        }
        Commands::Trim {
            manifest,
            skip,
            package_folders,
            output,
        } => commands::trim::run(
            &manifest,
            &skip,
            &package_folders,
            output.as_deref(),
            json_output,
        ),
        Commands::Inspect { manifest } => commands::inspect::run(&manifest, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}
