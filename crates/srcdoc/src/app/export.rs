//! Rendering manuscripts and writing output artifacts.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::domain::model::Manuscript;
use crate::infra::config::Config;
use crate::infra::docx;

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Word-processing document.
    #[default]
    Docx,
    /// Markdown document with fenced code blocks.
    Markdown,
    /// Plain text with form feeds between files.
    Plain,
}

impl ExportFormat {
    /// Return a stable identifier for templates and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Plain => "plain",
        }
    }

    /// Recommended file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Markdown => "md",
            ExportFormat::Plain => "txt",
        }
    }

    fn template(&self) -> Option<&'static str> {
        match self {
            ExportFormat::Docx => None,
            ExportFormat::Markdown => Some("markdown"),
            ExportFormat::Plain => Some("plain_text"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "docx" | "word" => Ok(ExportFormat::Docx),
            "markdown" | "md" | "commonmark" => Ok(ExportFormat::Markdown),
            "plain" | "text" | "txt" => Ok(ExportFormat::Plain),
            other => Err(ExportFormatParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Error returned when parsing an [`ExportFormat`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ExportFormatParseError {
    #[error("unknown export format '{0}'")]
    UnknownFormat(String),
}

/// Runtime options controlling export behavior.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub output_path: PathBuf,
}

impl ExportOptions {
    /// Build options from configuration defaults.
    ///
    /// When the configured format is not `docx`, the configured output name takes the format's
    /// extension.
    pub fn from_config(config: &Config) -> Result<Self> {
        let format = config
            .document
            .format()
            .parse::<ExportFormat>()
            .context("invalid document.format in configuration")?;
        Ok(Self::with_format(config, format))
    }

    /// Options for an explicitly chosen format, output name derived from configuration.
    ///
    /// `docx` keeps the configured name as is; other formats swap in their own extension.
    pub fn with_format(config: &Config, format: ExportFormat) -> Self {
        let configured = config.document.output();
        let output_path = match format {
            ExportFormat::Docx => configured,
            _ => configured.with_extension(format.extension()),
        };
        Self {
            format,
            output_path,
        }
    }
}

/// Result of an export operation.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub output_path: PathBuf,
    pub bytes_written: usize,
}

/// Responsible for rendering manuscripts and writing artifacts.
pub struct Exporter {
    env: Environment<'static>,
}

impl Exporter {
    /// Create a new exporter with built-in templates loaded.
    pub fn new() -> Result<Self> {
        Ok(Self {
            env: default_environment()?,
        })
    }

    /// Render the manuscript into the bytes of the requested format.
    pub fn render(&self, manuscript: &Manuscript, format: ExportFormat) -> Result<Vec<u8>> {
        match format.template() {
            None => docx::render(manuscript),
            Some(template_name) => {
                let context = build_template_context(manuscript, format)?;
                let rendered = self
                    .env
                    .get_template(template_name)
                    .and_then(|template| template.render(&context))
                    .map_err(|err| anyhow!("failed to render template '{template_name}': {err}"))?;
                Ok(rendered.into_bytes())
            }
        }
    }

    /// Render the manuscript and write it to the configured output path, replacing any
    /// existing file.
    pub fn export(&self, manuscript: &Manuscript, options: &ExportOptions) -> Result<ExportResult> {
        let rendered = self.render(manuscript, options.format)?;
        write_atomically(&options.output_path, &rendered)?;
        info!(
            path = %options.output_path.display(),
            bytes = rendered.len(),
            format = options.format.as_str(),
            "document saved"
        );

        Ok(ExportResult {
            output_path: options.output_path.clone(),
            bytes_written: rendered.len(),
        })
    }
}

/// Write through a temporary sibling file so a failed save never truncates an existing output.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory: {}", parent.display())
            })?;
            parent
        }
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to stage output in {}", parent.display()))?;
    staged
        .write_all(contents)
        .with_context(|| format!("failed to write output for {}", path.display()))?;
    staged
        .persist(path)
        .with_context(|| format!("failed to save output to {}", path.display()))?;
    Ok(())
}

fn default_environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template("markdown", DEFAULT_MARKDOWN_TEMPLATE)
        .map_err(|err| anyhow!("failed to register default markdown template: {err}"))?;
    env.add_template("plain_text", DEFAULT_PLAIN_TEMPLATE)
        .map_err(|err| anyhow!("failed to register default plain template: {err}"))?;
    Ok(env)
}

fn build_template_context(manuscript: &Manuscript, format: ExportFormat) -> Result<TemplateContext> {
    let generated_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("failed to format export timestamp")?;

    let sections = manuscript
        .sections()
        .into_iter()
        .map(|section| TemplateSection {
            heading: section.heading.to_string(),
            language: section.language().to_string(),
            contents: section.code.join("\n"),
        })
        .collect();

    Ok(TemplateContext {
        generated_at,
        format: format.as_str().to_string(),
        title: manuscript.title().to_string(),
        sections,
    })
}

#[derive(Serialize)]
struct TemplateContext {
    generated_at: String,
    format: String,
    title: String,
    sections: Vec<TemplateSection>,
}

#[derive(Serialize)]
struct TemplateSection {
    heading: String,
    language: String,
    contents: String,
}

const DEFAULT_MARKDOWN_TEMPLATE: &str = r#"# {{ title }}

_Generated at {{ generated_at }}_

{% for section in sections %}
{% if not loop.first %}
---

{% endif %}
## {{ section.heading }}

```{{ section.language }}
{{ section.contents }}
```

{% endfor %}
"#;

const DEFAULT_PLAIN_TEMPLATE: &str = "{{ title }}\nGenerated at {{ generated_at }}\n\n\
{% for section in sections %}\
{% if not loop.first %}\x0c\n{% endif %}\
== {{ section.heading }} ==\n\n\
{{ section.contents }}\n\n\
{% endfor %}";
