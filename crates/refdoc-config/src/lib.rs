//! Configuration primitives and loader for refdoc.
//!
//! The loader resolves configuration using the precedence stack
//! override flag → working directory → git root → built-in defaults.
//! Parsed settings are normalised into typed structures so downstream crates
//! never touch raw TOML.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = ".refdoc.toml";
const DEFAULT_OUTPUT: &str = "README.md";
/// Header used by a table of contents declared without an explicit title.
pub const DEFAULT_TOC_HEADER: &str = "Table of Contents";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub output: OutputSettings,
    pub render: RenderSettings,
    /// Ordered document plan; empty when no layer declares one.
    pub document: Vec<PlanEntry>,
    pub sources: ConfigSources,
}

#[derive(Clone, Debug)]
pub struct OutputSettings {
    /// Output file, relative paths taken against the working directory.
    pub path: PathBuf,
}

/// Settings that shape the rendered document.
#[derive(Clone, Debug)]
pub struct RenderSettings {
    pub heading_scheme: HeadingScheme,
    pub toc_header: String,
    /// Force expansion of every top-level entry.
    pub expand_all: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            heading_scheme: HeadingScheme::Nested,
            toc_header: DEFAULT_TOC_HEADER.to_string(),
            expand_all: false,
        }
    }
}

/// Heading depth assignment for methods relative to functions.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum HeadingScheme {
    /// Methods sit one level below functions and classes.
    #[default]
    Nested,
    /// Methods share the function heading level.
    Flat,
}

impl HeadingScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingScheme::Nested => "nested",
            HeadingScheme::Flat => "flat",
        }
    }

    pub fn module_level(self) -> u8 {
        1
    }

    pub fn class_level(self) -> u8 {
        2
    }

    pub fn function_level(self) -> u8 {
        2
    }

    pub fn method_level(self) -> u8 {
        match self {
            HeadingScheme::Nested => self.function_level() + 1,
            HeadingScheme::Flat => self.function_level(),
        }
    }
}

impl fmt::Display for HeadingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HeadingScheme {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nested" => Ok(HeadingScheme::Nested),
            "flat" => Ok(HeadingScheme::Flat),
            _ => Err(()),
        }
    }
}

/// One entry of the ordered document plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlanEntry {
    /// Markdown file, resolved against the declaring config file's directory.
    Markdown(PathBuf),
    /// Dotted path to a reflected entity.
    Entity { path: String, expand: bool },
    TableOfContents { header: String },
    HorizontalRule,
    Indent,
    Dedent,
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default(working_dir.clone());
        let mut merged = defaults_layer(default_source.clone());
        let mut source_layers = vec![default_source];

        let git_root = find_git_root(&working_dir);
        let git_config_path = git_root.as_ref().map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        let resolved = merged
            .finalize(&working_dir)
            .map_err(ConfigError::Validation)?;
        tracing::debug!(
            layers = source_layers.len(),
            entries = resolved.document.len(),
            "resolved refdoc configuration"
        );
        Ok(Config {
            output: resolved.output,
            render: resolved.render,
            document: resolved.document,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }

    /// Built-in defaults rooted at `working_dir`, without touching the filesystem.
    pub fn defaults(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Config {
            output: OutputSettings {
                path: working_dir.join(DEFAULT_OUTPUT),
            },
            render: RenderSettings::default(),
            document: Vec::new(),
            sources: ConfigSources {
                layers: vec![ConfigSource::default(working_dir.clone())],
                working_directory: working_dir,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::defaults(".")
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    PartialConfig {
        output: Some(Located::new(PathBuf::from(DEFAULT_OUTPUT), source.clone())),
        heading_scheme: Some(Located::new("nested".into(), source.clone())),
        toc_header: Some(Located::new(DEFAULT_TOC_HEADER.into(), source.clone())),
        expand_all: Some(Located::new(false, source)),
        document: None,
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    output: Option<Located<PathBuf>>,
    heading_scheme: Option<Located<String>>,
    toc_header: Option<Located<String>>,
    expand_all: Option<Located<bool>>,
    document: Option<Located<Vec<RawPlanEntry>>>,
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.heading_scheme.is_some() {
            self.heading_scheme = other.heading_scheme;
        }
        if other.toc_header.is_some() {
            self.toc_header = other.toc_header;
        }
        if other.expand_all.is_some() {
            self.expand_all = other.expand_all;
        }
        // Plans replace each other wholesale; splicing entries would scramble order.
        if other.document.is_some() {
            self.document = other.document;
        }
    }

    fn finalize(self, working_dir: &Path) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();
        let fallback = || ConfigSource::default(PathBuf::from("."));

        let output = self
            .output
            .unwrap_or_else(|| Located::new(PathBuf::from(DEFAULT_OUTPUT), fallback()));
        if output.value.as_os_str().is_empty() {
            errors.push(ConfigValidationError::new(
                Some(output.source.clone()),
                "output.path cannot be empty".into(),
            ));
        }

        let scheme = self
            .heading_scheme
            .unwrap_or_else(|| Located::new("nested".into(), fallback()));
        let heading_scheme = match scheme.value.parse::<HeadingScheme>() {
            Ok(parsed) => parsed,
            Err(()) => {
                errors.push(ConfigValidationError::new(
                    Some(scheme.source.clone()),
                    format!(
                        "render.heading_scheme must be 'nested' or 'flat' (received '{}')",
                        scheme.value
                    ),
                ));
                HeadingScheme::default()
            }
        };

        let toc_header = self
            .toc_header
            .unwrap_or_else(|| Located::new(DEFAULT_TOC_HEADER.into(), fallback()));
        if toc_header.value.trim().is_empty() {
            errors.push(ConfigValidationError::new(
                Some(toc_header.source.clone()),
                "render.toc_header cannot be empty".into(),
            ));
        }

        let expand_all = self.expand_all.map(|flag| flag.value).unwrap_or(false);

        let document = match self.document {
            Some(plan) => parse_plan(plan, &toc_header.value, &mut errors),
            None => Vec::new(),
        };

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(ResolvedConfig {
            output: OutputSettings {
                path: make_absolute(&output.value, working_dir),
            },
            render: RenderSettings {
                heading_scheme,
                toc_header: toc_header.value,
                expand_all,
            },
            document,
        })
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    let path = &located.value;
    if path.is_absolute() {
        path.clone()
    } else {
        located.source.base_dir.join(path)
    }
}

fn parse_plan(
    located: Located<Vec<RawPlanEntry>>,
    default_toc_header: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<PlanEntry> {
    let mut entries = Vec::with_capacity(located.value.len());
    for (index, raw) in located.value.into_iter().enumerate() {
        let context = format!("document[{index}]");
        match raw.into_entry(&located.source, default_toc_header) {
            Ok(entry) => entries.push(entry),
            Err(message) => errors.push(
                ConfigValidationError::new(Some(located.source.clone()), message)
                    .with_context(context),
            ),
        }
    }
    entries
}

#[derive(Clone, Debug)]
struct ResolvedConfig {
    output: OutputSettings,
    render: RenderSettings,
    document: Vec<PlanEntry>,
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    output: Option<RawOutput>,
    #[serde(default)]
    render: Option<RawRender>,
    #[serde(default)]
    document: Option<Vec<RawPlanEntry>>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        let located = |value| Located::new(value, source.clone());
        let output = self.output.unwrap_or_default();
        let render = self.render.unwrap_or_default();
        PartialConfig {
            output: output.path.map(|path| Located::new(path, source.clone())),
            heading_scheme: render.heading_scheme.map(located),
            toc_header: render.toc_header.map(located),
            expand_all: render
                .expand_all
                .map(|flag| Located::new(flag, source.clone())),
            document: self
                .document
                .map(|entries| Located::new(entries, source.clone())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    #[serde(default)]
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRender {
    #[serde(default)]
    heading_scheme: Option<String>,
    #[serde(default)]
    toc_header: Option<String>,
    #[serde(default)]
    expand_all: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlanEntry {
    #[serde(default)]
    markdown: Option<PathBuf>,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    expand: bool,
    #[serde(default)]
    toc: Option<RawToc>,
    #[serde(default)]
    rule: bool,
    #[serde(default)]
    indent: bool,
    #[serde(default)]
    dedent: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawToc {
    Enabled(bool),
    Header(String),
}

impl RawPlanEntry {
    fn into_entry(
        self,
        source: &ConfigSource,
        default_toc_header: &str,
    ) -> Result<PlanEntry, String> {
        let toc = match self.toc {
            Some(RawToc::Enabled(true)) => Some(default_toc_header.to_string()),
            Some(RawToc::Enabled(false)) | None => None,
            Some(RawToc::Header(header)) => Some(header),
        };

        let kinds = [
            self.markdown.is_some(),
            self.entity.is_some(),
            toc.is_some(),
            self.rule,
            self.indent,
            self.dedent,
        ];
        let declared = kinds.iter().filter(|flag| **flag).count();
        if declared != 1 {
            return Err(format!(
                "expected exactly one of markdown, entity, toc, rule, indent, dedent (found {declared})"
            ));
        }
        if self.expand && self.entity.is_none() {
            return Err("expand is only valid together with entity".into());
        }

        if let Some(path) = self.markdown {
            return Ok(PlanEntry::Markdown(resolve_path(&Located::new(
                path,
                source.clone(),
            ))));
        }
        if let Some(path) = self.entity {
            if path.trim().is_empty() {
                return Err("entity path cannot be empty".into());
            }
            return Ok(PlanEntry::Entity {
                path,
                expand: self.expand,
            });
        }
        if let Some(header) = toc {
            if header.trim().is_empty() {
                return Err("toc header cannot be empty".into());
            }
            return Ok(PlanEntry::TableOfContents { header });
        }
        if self.rule {
            return Ok(PlanEntry::HorizontalRule);
        }
        if self.indent {
            return Ok(PlanEntry::Indent);
        }
        Ok(PlanEntry::Dedent)
    }
}
