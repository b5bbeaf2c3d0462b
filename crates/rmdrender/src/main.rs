//! rmdrender CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rmdrender")]
#[command(version)]
#[command(about = "Render Markdown documents via pandoc", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document to an output format
    Render {
        /// Input file
        input: String,

        /// Output format preset (html, gfm)
        #[arg(short = 't', long, default_value = "html")]
        to: String,

        /// Write output to FILE
        #[arg(short = 'o', long)]
        output: Option<String>,

        /// Directory for dependency assets (defaults to <input>_files)
        #[arg(long)]
        lib_dir: Option<String>,

        /// Embed all assets into a single output file
        #[arg(long)]
        self_contained: bool,

        /// Copy referenced local assets next to the output
        #[arg(long)]
        copy_resources: bool,

        /// Run the citation-processing filter
        #[arg(long)]
        citeproc: bool,

        /// Include a table of contents
        #[arg(long)]
        toc: bool,

        /// Table of contents heading depth
        #[arg(long)]
        toc_depth: Option<u32>,

        /// Highlighting theme ("none" disables highlighting)
        #[arg(long, default_value = "default")]
        highlight: String,

        /// Math rendering: "default", "local", or "none"
        #[arg(long, default_value = "default")]
        mathjax: String,

        /// Working directory for the conversion
        #[arg(long)]
        working_dir: Option<String>,
    },

    /// Report the discovered pandoc installation
    Pandoc {
        /// Fail unless pandoc is at least this version
        #[arg(long)]
        min_version: Option<String>,

        /// Ignore the cached location and rescan
        #[arg(long)]
        rescan: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            to,
            output,
            lib_dir,
            self_contained,
            copy_resources,
            citeproc,
            toc,
            toc_depth,
            highlight,
            mathjax,
            working_dir,
        } => commands::render::execute(commands::render::RenderArgs {
            input,
            to,
            output,
            lib_dir,
            self_contained,
            copy_resources,
            citeproc,
            toc,
            toc_depth,
            highlight,
            mathjax,
            working_dir,
        }),
        Commands::Pandoc {
            min_version,
            rescan,
        } => commands::pandoc::execute(min_version, rescan),
    }
}
