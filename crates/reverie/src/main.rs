use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reverie::cli::{commands, ConfigArgs};

#[derive(Parser)]
#[command(name = "reverie")]
#[command(
  about = "Reverie - Journal Analysis\nTopic-scoped reports from your journal, written by a local model"
)]
#[command(version)]
struct Cli {
  /// Show debug output from the pipeline
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Extract topics and write one report per topic
  Analyze {
    /// Directory of markdown journal entries with a `date` in their front matter
    #[arg(short, long, default_value = "journal")]
    journal_dir: PathBuf,
    #[command(flatten)]
    config: ConfigArgs,
    /// Print the reports as a JSON object keyed by topic
    #[arg(long)]
    json: bool,
  },
  /// List the topics the model finds in the journal
  Topics {
    /// Directory of markdown journal entries with a `date` in their front matter
    #[arg(short, long, default_value = "journal")]
    journal_dir: PathBuf,
    #[command(flatten)]
    config: ConfigArgs,
  },
  /// Show which analysis category each topic label maps to
  Classify {
    /// Topic labels to classify
    #[arg(required = true)]
    topics: Vec<String>,
  },
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::Analyze { journal_dir, config, json } => {
      commands::analyze(&journal_dir, config.resolve(), json).await
    }
    Command::Topics { journal_dir, config } => commands::topics(&journal_dir, config.resolve()).await,
    Command::Classify { topics } => commands::classify(&topics),
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  lumen::init_tracing(cli.verbose);

  handle(cli.command).await
}
