use clap::{ArgAction, Parser, Subcommand};
use chunkdoc::{config, generate, output, scan, site};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "chunkdoc")]
#[command(about = "Documentation-site builder with lazily compiled pages")]
#[command(long_about = "\
Documentation-site builder with lazily compiled pages

Your docs directory is the data source. Markdown files become pages,
directories become sidebar categories, and numeric prefixes set the order.

Docs structure:

  docs/
  ├── config.toml                      # Site config (optional)
  ├── 01-intro.md                      # /docs/intro (sidebar position 1)
  ├── 02-guides/                       # Sidebar category \"guides\"
  │   ├── 1-getting-started.md         # /docs/guides/getting-started
  │   └── 2-roadmap.md                 # +++ draft = true +++ → skipped
  ├── hidden-page.md                   # +++ unlisted = true +++ → not in sidebar
  └── _partials/                       # '_' and '.' prefixes are ignored

Front matter is optional TOML between '+++' lines at the top of a page.

Set RUST_LOG (e.g. RUST_LOG=chunkdoc=debug) or pass -v / -vv for logs.

Run 'chunkdoc gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Docs directory
    #[arg(long, default_value = "docs", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "build", global = true)]
    output: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the docs directory and show the discovered structure
    Scan,
    /// Run the full pipeline: scan → register → generate
    Build,
    /// Compile and render every page without writing output
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Build => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Registering page chunks");
            init_thread_pool(&manifest.config.processing);
            let site = site::Site::build(manifest)?;

            println!("==> Stage 3: Generating HTML → {}", cli.output.display());
            let report = generate::generate(&site, &cli.output)?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", report.output_dir.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site = load_site(&cli.source)?;
            let report = site::check(&site)?;
            output::print_check_output(&report);
            println!("==> Docs are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_site(source: &Path) -> Result<site::Site, Box<dyn std::error::Error>> {
    let manifest = scan::scan(source)?;
    init_thread_pool(&manifest.config.processing);
    Ok(site::Site::build(manifest)?)
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn setup_tracing(verbose: u8) {
    let default = match verbose {
        0 => "chunkdoc=warn",
        1 => "chunkdoc=debug,info",
        _ => "chunkdoc=trace,debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
