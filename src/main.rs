use clap::{Parser, Subcommand};
use quiz_index::{config, output, scan};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quiz-index")]
#[command(about = "Build the static subject and question indices for the quiz site")]
#[command(long_about = "\
Build the static subject and question indices for the quiz site

The source directory is the data source. Every subdirectory with a
subject.json is a subject; its questions live either in a flat questions/
directory or nested under topic directories.

Source structure:

  questions/
  ├── config.toml                  # Build config (optional, see gen-config)
  ├── math/
  │   ├── subject.json             # Descriptor, optional \"topics\" master list
  │   ├── questions/               # Flat layout
  │   │   └── q001/
  │   │       ├── question.json    # \"topic\" or \"topics\", \"answers\"
  │   │       └── quiz.png         # Optional images (png, jpg, jpeg, gif, svg)
  │   └── geometry/                # Legacy layout: one directory per topic
  │       ├── topic.json           # {\"name\": \"...\"} (optional)
  │       └── q002/
  │           ├── question.json
  │           └── photo.png
  └── drafts/                      # No subject.json = skipped

Output (fully regenerated on every build):

  web/public/subjects.json         # {\"subjects\": [...]}
  web/public/subjects/math/
  ├── subject.json
  ├── questions.json
  ├── questions/q001/quiz.png
  └── topics/geometry/q002/photo.png

A question id present in both layouts is taken from questions/.")]
#[command(version)]
struct Cli {
    /// Source directory of subjects
    #[arg(long, default_value = "questions", global = true)]
    source: PathBuf,

    /// Output directory (overrides config.toml; wiped on build)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Global subjects index file (overrides config.toml)
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Rebuild the output tree and indices (default)
    Build,
    /// Validate the source tree and print its inventory without writing
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let config = config::load_config(&cli.source)?;
            let output_root = cli.output.unwrap_or_else(|| PathBuf::from(&config.output));
            let index_path = cli.index.unwrap_or_else(|| PathBuf::from(&config.index));
            let summary = quiz_index::build(&cli.source, &output_root, &index_path, &config)?;
            output::print_build_output(&summary);
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            println!("==> Checking {}", cli.source.display());
            let catalog = scan::scan(&cli.source, &config)?;
            output::print_scan_output(&catalog);
            println!("==> Source tree is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout carries only command output. `RUST_LOG` wins
/// over `-v`.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
