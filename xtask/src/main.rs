use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cargo nextest with default configuration
    Test {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Document srcdoc's own sources into target/demo
    Demo {
        /// Output format passed through to srcdoc
        #[arg(long, default_value = "docx")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Test { profile, release } => run_nextest(profile, release)?,
        Commands::Demo { format } => run_demo(&format)?,
    }
    Ok(())
}

fn run_nextest(profile: Option<String>, release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("nextest").arg("run").arg("--workspace");
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("cargo nextest run failed");
    }
    Ok(())
}

fn run_demo(format: &str) -> Result<()> {
    let metadata = MetadataCommand::new()
        .no_deps()
        .exec()
        .context("failed to read cargo metadata")?;
    let root: PathBuf = metadata.workspace_root.into_std_path_buf();
    let sources = rust_sources(&root.join("crates/srcdoc/src"))?;
    let output = root.join("target/demo/srcdoc").with_extension(match format {
        "markdown" | "md" => "md",
        "plain" | "text" | "txt" => "txt",
        _ => "docx",
    });

    let status = Command::new("cargo")
        .current_dir(&root)
        .args(["run", "--quiet", "-p", "srcdoc", "--"])
        .args(&sources)
        .arg("--title")
        .arg("srcdoc sources")
        .arg("--format")
        .arg(format)
        .arg("--output")
        .arg(&output)
        .status()?;
    if !status.success() {
        anyhow::bail!("srcdoc demo run failed");
    }
    Ok(())
}

fn rust_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "rs")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
