use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use srcdoc::app::assemble::Assembler;
use srcdoc::app::export::{ExportFormat, ExportOptions, Exporter};
use srcdoc::domain::model::SourceList;
use srcdoc::infra::config::Config;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Collect source files into a formatted Word document",
    long_about = None
)]
struct Cli {
    /// Files to document, in order. Defaults to the configured list.
    files: Vec<PathBuf>,

    /// Where to write the document.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum)]
    format: Option<ExportFormat>,

    /// Title heading at the top of the document.
    #[arg(long)]
    title: Option<String>,

    /// Read configuration from this file instead of the user and workspace configs.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a shell completion script and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<()> {
    srcdoc::init();
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "srcdoc", &mut io::stdout());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let sources = if cli.files.is_empty() {
        config.sources.files()
    } else {
        SourceList::new(cli.files)
    };

    let mut options = match cli.format {
        Some(format) => ExportOptions::with_format(&config, format),
        None => ExportOptions::from_config(&config)?,
    };
    if let Some(output) = cli.output {
        options.output_path = output;
    }

    let title = cli.title.unwrap_or_else(|| config.document.title());
    let assembler = Assembler::new(title, config.style.code_style());
    let assembly =
        assembler.assemble_with(&sources, |skipped| println!("{}", skipped.warning()))?;

    let exporter = Exporter::new()?;
    let result = exporter.export(&assembly.manuscript, &options)?;
    println!(
        "Documentation successfully generated and saved as {}",
        result.output_path.display()
    );
    Ok(())
}
