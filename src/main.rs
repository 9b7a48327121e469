use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repoglance::cli::commands::estimate::EstimateTarget;

#[derive(Parser)]
#[command(name = "repoglance")]
#[command(
    version,
    about = "Explore a GitHub repository with plain-English AI explanations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List a folder of a repository (no AI, no cost)
    Browse {
        #[arg(help = "Repository URL, e.g. https://github.com/owner/repo")]
        url: String,
        #[arg(long, short, default_value = "", help = "Folder inside the repository")]
        path: String,
        #[arg(long, short, help = "Include dependency and build folders")]
        all: bool,
    },

    /// Explore a repository interactively; caches and usage carry across commands
    Open {
        #[arg(help = "Repository URL")]
        url: String,
        #[arg(long, short, help = "Include dependency and build folders")]
        all: bool,
        #[arg(long, short, help = "Skip cost confirmations")]
        yes: bool,
    },

    /// Explain every item in a folder
    Explain {
        #[arg(help = "Repository URL")]
        url: String,
        #[arg(long, short, default_value = "", help = "Folder inside the repository")]
        path: String,
        #[arg(long, short, help = "Include dependency and build folders")]
        all: bool,
        #[arg(long, short, help = "Skip the cost confirmation")]
        yes: bool,
    },

    /// Structured explanation of one file
    File {
        #[arg(help = "Repository URL")]
        url: String,
        #[arg(help = "File path inside the repository")]
        path: String,
        #[arg(long, short, help = "Skip the cost confirmation")]
        yes: bool,
    },

    /// Longer explanation of one file or folder using the detail model
    DeepDive {
        #[arg(help = "Repository URL")]
        url: String,
        #[arg(help = "Path inside the repository")]
        path: String,
        #[arg(long, short, help = "Skip the cost confirmation")]
        yes: bool,
    },

    /// Show what an operation would cost without running it
    Estimate {
        #[command(subcommand)]
        target: EstimateAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum EstimateAction {
    /// Bulk explanation of N items
    Bulk {
        #[arg(help = "Number of items")]
        items: usize,
    },
    /// File detail for a file of the given size
    File {
        #[arg(help = "File size in bytes")]
        bytes: u64,
    },
    /// One deep dive
    DeepDive,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mrepoglance encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        eprintln!("\n\x1b[33mPlease report this issue at:\x1b[0m");
        eprintln!("  https://github.com/junyeong-ai/repoglance/issues");
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Browse { url, path, all } => {
            let rt = Runtime::new()?;
            rt.block_on(repoglance::cli::commands::browse::run(&url, &path, all))?;
        }
        Commands::Open { url, all, yes } => {
            let rt = Runtime::new()?;
            rt.block_on(repoglance::cli::commands::session::run(&url, all, yes))?;
        }
        Commands::Explain {
            url,
            path,
            all,
            yes,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(repoglance::cli::commands::explain::run(
                &url, &path, all, yes,
            ))?;
        }
        Commands::File { url, path, yes } => {
            let rt = Runtime::new()?;
            rt.block_on(repoglance::cli::commands::file::run(&url, &path, yes))?;
        }
        Commands::DeepDive { url, path, yes } => {
            let rt = Runtime::new()?;
            rt.block_on(repoglance::cli::commands::deep_dive::run(&url, &path, yes))?;
        }
        Commands::Estimate { target } => {
            let target = match target {
                EstimateAction::Bulk { items } => EstimateTarget::Bulk { items },
                EstimateAction::File { bytes } => EstimateTarget::File { bytes },
                EstimateAction::DeepDive => EstimateTarget::DeepDive,
            };
            repoglance::cli::commands::estimate::run(target)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                repoglance::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                repoglance::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                repoglance::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
