use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trowel::generator::GeneratorRegistry;
use trowel::site::{self, BuildOptions};
use trowel::{config, output};

#[derive(Parser)]
#[command(name = "trowel")]
#[command(about = "Static site generator for dated posts and image listings")]
#[command(long_about = "\
Static site generator for dated posts and image listings

Every file in the source tree is copied or rendered into the output.
Handlebars templates can read the site config and every collection.

Source structure:

  site/
  ├── _config.yml                  # Site config (optional)
  ├── _layouts/                    # Wrapping templates, referenced by `layout:`
  │   └── default.html
  ├── _posts/                      # Post collection
  │   └── 2024-01-05-hello.html    # → 2024/01/05/hello.html
  ├── _gallery/                    # Listing collection (generator: listing)
  │   ├── 042-my-shot.html         # → listing/42/my-shot.html
  │   └── 042-my-shot.png          # → my-shot.jpg + my-shot_thumb.jpg
  ├── index.html                   # Rendered as a template
  ├── feed.xml                     # Rendered without HTML escaping
  └── img/logo.png                 # Copied verbatim

Entries starting with '.' or '_' are never published directly.

Run 'trowel gen-config' to print a documented _config.yml.")]
#[command(version)]
struct Cli {
    /// Site source directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory [default: <source>/_site]
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Image derivative cache [default: the output directory]
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the site and publish it to the output directory
    Build,
    /// Validate config, content and collections without writing
    Check,
    /// Print a stock _config.yml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = BuildOptions {
        source: cli.source,
        output: cli.output,
        cache_dir: cli.cache_dir,
    };

    match cli.command {
        Command::Build => {
            let registry = GeneratorRegistry::with_builtins()?;
            let report = site::build(&options, &registry)?;
            output::print_build_report(&report);
        }
        Command::Check => {
            let registry = GeneratorRegistry::with_builtins()?;
            let report = site::check(&options, &registry)?;
            output::print_check_report(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_yaml());
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` can narrow further.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
