use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::{Engine, GraphFormat, TargetKind};

#[derive(Parser)]
#[command(name = "est-metrics")]
#[command(about = "Structural metrics for expression syntax trees")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Compute metrics for one EST JSON document
    Analyze {
        /// File holding a single EST node
        file: PathBuf,

        /// Path length for k-path counting
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Print the kind graph of one EST JSON document
    Graph {
        /// File holding a single EST node
        file: PathBuf,

        /// Path length for k-path listing
        #[arg(short, long)]
        k: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: GraphFormat,
    },

    /// Aggregate metrics over observation logs
    Corpus {
        /// An observation file or a data directory to search
        path: PathBuf,

        /// Representation layout (inferred from the target directory name by default)
        #[arg(short, long, value_enum)]
        target: Option<TargetKind>,

        /// Path length for k-path counting
        #[arg(short, long)]
        k: Option<usize>,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path } => {
                let written = engine.init(path).await?;
                println!("{}", written.display());
            }
            Commands::Analyze { file, k } => {
                let report = engine.analyze(&file, k).await?;
                println!("{}", engine.render(&report)?);
            }
            Commands::Graph { file, k, format } => {
                let report = engine.graph(&file, k).await?;
                match format {
                    GraphFormat::Json => println!("{}", engine.render(&report)?),
                    GraphFormat::Dot => println!("{}", report.dot),
                }
            }
            Commands::Corpus { path, target, k } => {
                let report = engine.corpus(&path, target, k).await?;
                println!("{}", engine.render(&report)?);
            }
        }
        Ok(())
    }
}
