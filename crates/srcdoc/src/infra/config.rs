//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::model::{CodeStyle, SourceList};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".srcdoc/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub document: Document,
    #[serde(default)]
    pub sources: Sources,
    #[serde(default)]
    pub style: StyleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    format: Option<String>,
}

impl Document {
    fn default_title() -> &'static str {
        "Go Code Documentation"
    }

    fn default_output() -> &'static str {
        "Go_Code_Documentation.docx"
    }

    fn default_format() -> &'static str {
        "docx"
    }

    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| Self::default_title().to_owned())
    }

    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::default_output()))
    }

    pub fn format(&self) -> String {
        self.format
            .clone()
            .unwrap_or_else(|| Self::default_format().to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sources {
    #[serde(default)]
    files: Option<Vec<PathBuf>>,
}

impl Sources {
    fn default_files() -> Vec<PathBuf> {
        ["blueprint.go", "neuron.go", "eval.go", "utils.go"]
            .into_iter()
            .map(PathBuf::from)
            .collect()
    }

    pub fn files(&self) -> SourceList {
        SourceList::new(self.files.clone().unwrap_or_else(Self::default_files))
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            files: Some(Self::default_files()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StyleConfig {
    #[serde(default)]
    font: Option<String>,
    #[serde(default)]
    size: Option<u32>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    shading: Option<String>,
}

impl StyleConfig {
    /// Code style with configured attributes applied over the built-in one.
    pub fn code_style(&self) -> CodeStyle {
        let base = CodeStyle::default();
        CodeStyle {
            font: self.font.clone().unwrap_or(base.font),
            size: self.size.unwrap_or(base.size),
            color: self
                .color
                .as_deref()
                .map(normalize_color)
                .unwrap_or(base.color),
            shading: self
                .shading
                .as_deref()
                .map(normalize_color)
                .unwrap_or(base.shading),
            ..base
        }
    }
}

fn normalize_color(value: &str) -> String {
    value.trim().trim_start_matches('#').to_ascii_uppercase()
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    output: Option<String>,
    format: Option<String>,
    title: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            output: env::var("SRCDOC_OUTPUT").ok(),
            format: env::var("SRCDOC_FORMAT").ok(),
            title: env::var("SRCDOC_TITLE").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(output: &str, format: &str) -> Self {
        Self {
            output: Some(output.to_owned()),
            format: Some(format.to_owned()),
            title: None,
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    /// Load defaults plus a single explicit file, then env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let layers = vec![Self::from_str(&DEFAULT_CONFIG)?, Self::from_file(path)?];
        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, EnvOverrides::from_env()))
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    pub(crate) fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            document: merge_document(self.document, other.document),
            sources: merge_sources(self.sources, other.sources),
            style: merge_style(self.style, other.style),
        }
    }
}

fn merge_document(mut base: Document, overlay: Document) -> Document {
    if let Some(value) = overlay.title {
        base.title = Some(value);
    }
    if let Some(value) = overlay.output {
        base.output = Some(value);
    }
    if let Some(value) = overlay.format {
        base.format = Some(value);
    }
    base
}

// The file list is ordered, so an overlay replaces it instead of extending it.
fn merge_sources(base: Sources, overlay: Sources) -> Sources {
    Sources {
        files: overlay.files.or(base.files),
    }
}

fn merge_style(mut base: StyleConfig, overlay: StyleConfig) -> StyleConfig {
    if let Some(value) = overlay.font {
        base.font = Some(value);
    }
    if let Some(value) = overlay.size {
        base.size = Some(value);
    }
    if let Some(value) = overlay.color {
        base.color = Some(value);
    }
    if let Some(value) = overlay.shading {
        base.shading = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("srcdoc/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(output) = env.output {
        config.document.output = Some(PathBuf::from(output));
    }
    if let Some(format) = env.format {
        config.document.format = Some(format);
    }
    if let Some(title) = env.title {
        config.document.title = Some(title);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.document.title(), "Go Code Documentation");
        assert_eq!(
            config.document.output(),
            PathBuf::from("Go_Code_Documentation.docx")
        );
        assert_eq!(config.sources.files(), Config::default().sources.files());
        assert_eq!(config.style.code_style(), CodeStyle::default());
    }

    #[test]
    fn embedded_defaults_match_code_defaults() -> Result<()> {
        let embedded = Config::from_str(&DEFAULT_CONFIG)?;
        assert_eq!(embedded.document.title(), Config::default().document.title());
        assert_eq!(embedded.document.format(), Config::default().document.format());
        assert_eq!(embedded.sources.files(), Config::default().sources.files());
        assert_eq!(embedded.style.code_style(), CodeStyle::default());
        Ok(())
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r##"
[document]
title = "Team Docs"
[style]
shading = "#eeeeee"
"##,
        )?;

        let workspace_dir = temp.path().join("repo");
        fs::create_dir_all(workspace_dir.join(".srcdoc"))?;
        fs::create_dir_all(workspace_dir.join(".git"))?;
        fs::write(
            workspace_dir.join(".srcdoc/config.toml"),
            r#"
[document]
format = "markdown"
[sources]
files = ["main.go", "lib.go"]
"#,
        )?;

        let global_path = Some(global);
        let workspace_path = Some(workspace_dir.join(".srcdoc/config.toml"));

        let config =
            Config::load_with_layers(global_path, workspace_path, EnvOverrides::default())?;

        assert_eq!(config.document.title(), "Team Docs");
        assert_eq!(config.document.format(), "markdown");
        assert_eq!(
            config.sources.files(),
            SourceList::new(["main.go", "lib.go"])
        );
        let style = config.style.code_style();
        assert_eq!(style.shading, "EEEEEE");
        assert_eq!(style.font, "Courier New");

        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests("out/listing.txt", "plain");
        let config = Config::load_with_layers(None, None, overrides)?;
        assert_eq!(config.document.output(), PathBuf::from("out/listing.txt"));
        assert_eq!(config.document.format(), "plain");
        Ok(())
    }

    #[test]
    fn explicit_file_layers_over_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("srcdoc.toml");
        fs::write(&file, "[style]\nsize = 12\n")?;
        let config = Config::load_from(&file)?;
        assert_eq!(config.style.code_style().size, 12);
        assert_eq!(config.document.title(), "Go Code Documentation");
        Ok(())
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }
}
