#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::sync::Semaphore;
use typed_builder::TypedBuilder;

use crate::{
    constants::{DEFAULT_BOUNDARY_PRINT, DEFAULT_BREAKDOWN_DIR},
    java::style::{FormatScoring, RuleCost},
};

/// Default OpenAI-compatible endpoint.
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default model used when `OPENAI_MODEL` is not set.
const DEFAULT_MODEL: &str = "gpt-4o";

/// Credentials and model settings for the judge, sourced from the environment.
#[derive(Clone)]
pub struct OpenAiEnv {
    /// Base URL for the OpenAI-compatible API endpoint.
    api_base:    String,
    /// API key used to authenticate requests.
    api_key:     String,
    /// Model identifier for chat completions.
    model:       String,
    /// Optional temperature override.
    temperature: Option<f32>,
}

impl std::fmt::Debug for OpenAiEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEnv")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl OpenAiEnv {
    /// Creates a judge configuration from explicit values.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: Option<f32>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        }
    }

    /// Reads `OPENAI_ENDPOINT`, `OPENAI_API_KEY`, `OPENAI_MODEL` and
    /// `OPENAI_TEMPERATURE`; returns `None` without an API key.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`OpenAiEnv::from_env`] with a custom variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_key = non_empty("OPENAI_API_KEY")?;
        let api_base = non_empty("OPENAI_ENDPOINT").unwrap_or_else(|| DEFAULT_API_BASE.into());
        let model = non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let temperature = non_empty("OPENAI_TEMPERATURE").and_then(|s| s.parse::<f32>().ok());

        Some(Self {
            api_base,
            api_key,
            model,
            temperature,
        })
    }

    /// Returns the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the configured temperature, if any.
    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }
}

/// Bounded retry with exponential backoff for judge calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff ceiling for the first retry; doubles after that.
    pub base_delay:  Duration,
    /// Upper bound on any single backoff.
    pub max_delay:   Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay:  Duration::from_secs(1),
            max_delay:   Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (1-based), with full jitter.
    pub fn backoff(&self, retry: u32) -> Duration {
        use rand::Rng;

        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        let ceiling = self.base_delay.saturating_mul(factor).min(self.max_delay);
        let ceiling_ms = ceiling.as_millis() as u64;
        let jittered = rand::thread_rng().gen_range(0..=ceiling_ms);
        Duration::from_millis(jittered.max(ceiling_ms.min(10)))
    }
}

/// Overrides read from a JSON config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// judge model name, or an alias from `model_map`
    pub default_model:           Option<String>,
    /// model aliases, `"gpt4o": "gpt-4o-2024-08-06"`
    pub model_map:               HashMap<String, String>,
    /// API keys, used when the environment has none
    pub api_keys:                FileApiKeys,
    /// judge sampling temperature
    pub default_temperature:     Option<f32>,
    /// judge endpoint
    pub api_base:                Option<String>,
    /// style rule costs
    pub format_scoring:          Option<FileFormatScoring>,
    /// literal the boundary print rule expects
    pub required_boundary_print: Option<String>,
    /// retries per submission
    pub max_retries:             Option<u32>,
    /// judge timeout in seconds
    pub timeout_secs:            Option<u64>,
    /// judge calls in flight at once
    pub max_concurrency:         Option<usize>,
    /// where per-submission breakdowns go
    pub grading_breakdown_folder: Option<PathBuf>,
}

/// API keys from a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileApiKeys {
    /// key for the OpenAI-compatible endpoint
    pub openai: Option<String>,
}

/// Partial style costs from a config file.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct FileFormatScoring {
    /// brace placement cost
    pub brackets:  Option<RuleCost>,
    /// boundary print cost
    pub new_lines: Option<RuleCost>,
}

impl FileConfig {
    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Could not parse config file {}", path.display()))
    }
}

/// Everything the grading pipeline needs to know, built once at startup and
/// passed in explicitly.
#[derive(Debug, Clone, TypedBuilder)]
pub struct GraderConfig {
    /// Judge credentials, if any were found.
    #[builder(default)]
    openai:                  Option<OpenAiEnv>,
    /// Style rule costs.
    #[builder(default)]
    format_scoring:          FormatScoring,
    /// Print statement expected first and last.
    #[builder(default = DEFAULT_BOUNDARY_PRINT.to_string(), setter(into))]
    required_boundary_print: String,
    /// Retry policy for judge calls.
    #[builder(default)]
    retry:                   RetryPolicy,
    /// Per-attempt judge timeout.
    #[builder(default = Duration::from_secs(120))]
    request_timeout:         Duration,
    /// Judge calls in flight at once.
    #[builder(default = 4)]
    max_concurrency:         usize,
    /// Model aliases, resolved when a model is picked.
    #[builder(default)]
    model_map:               HashMap<String, String>,
    /// Folder for per-submission breakdowns.
    #[builder(default = PathBuf::from(DEFAULT_BREAKDOWN_DIR), setter(into))]
    breakdown_dir:           PathBuf,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GraderConfig {
    /// Builds a configuration from the environment (`.env` included, if the
    /// caller loaded it) and an optional JSON file layered on top.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = Self::builder()
            .openai(OpenAiEnv::from_env())
            .request_timeout(read_secs("AIGRADE_TIMEOUT_SECS", 120))
            .max_concurrency(read_usize("AIGRADE_CONCURRENCY", 4))
            .build();

        if let Some(path) = file {
            config.apply(FileConfig::load(path)?);
        }
        Ok(config)
    }

    /// Layers file overrides on top of this configuration.
    pub fn apply(&mut self, file: FileConfig) {
        self.model_map.extend(file.model_map);
        if self.openai.is_none() {
            if let Some(key) = file.api_keys.openai {
                self.openai = OpenAiEnv::from_lookup(|name| match name {
                    "OPENAI_API_KEY" => Some(key.clone()),
                    _ => std::env::var(name).ok(),
                });
            }
        }
        // an OPENAI_MODEL from the environment may be an alias too
        let model = file
            .default_model
            .or_else(|| self.openai.as_ref().map(|o| o.model.clone()));
        if let Some(model) = model {
            self.set_model(model);
        }
        if let Some(openai) = self.openai.as_mut() {
            if let Some(temperature) = file.default_temperature {
                openai.temperature = Some(temperature);
            }
            if let Some(api_base) = file.api_base {
                openai.api_base = api_base;
            }
        }
        if let Some(scoring) = file.format_scoring {
            if let Some(brackets) = scoring.brackets {
                self.format_scoring.brackets = brackets;
            }
            if let Some(new_lines) = scoring.new_lines {
                self.format_scoring.new_lines = new_lines;
            }
        }
        if let Some(required) = file.required_boundary_print {
            self.required_boundary_print = required;
        }
        if let Some(max_retries) = file.max_retries {
            self.retry.max_retries = max_retries;
        }
        if let Some(secs) = file.timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = file.max_concurrency {
            self.max_concurrency = n;
        }
        if let Some(dir) = file.grading_breakdown_folder {
            self.breakdown_dir = dir;
        }
    }

    /// Maps a model alias to the model identifier; unknown names pass
    /// through unchanged.
    pub fn resolve_model(&self, model: &str) -> String {
        self.model_map
            .get(model)
            .cloned()
            .unwrap_or_else(|| model.to_string())
    }

    /// Overrides the judge model, resolving aliases.
    pub fn set_model(&mut self, model: impl Into<String>) {
        let model = self.resolve_model(&model.into());
        if let Some(openai) = self.openai.as_mut() {
            openai.model = model;
        }
    }

    /// Overrides the concurrency limit.
    pub fn set_max_concurrency(&mut self, n: usize) {
        self.max_concurrency = n;
    }

    /// Overrides the breakdown folder.
    pub fn set_breakdown_dir(&mut self, dir: impl Into<PathBuf>) {
        self.breakdown_dir = dir.into();
    }

    /// Returns the judge configuration, if available.
    pub fn openai(&self) -> Option<&OpenAiEnv> {
        self.openai.as_ref()
    }

    /// Returns the style rule costs.
    pub fn format_scoring(&self) -> &FormatScoring {
        &self.format_scoring
    }

    /// Returns the required boundary print statement.
    pub fn required_boundary_print(&self) -> &str {
        &self.required_boundary_print
    }

    /// Returns the retry policy.
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns the per-attempt judge timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the concurrency limit, between one and what a semaphore can
    /// hold.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.clamp(1, Semaphore::MAX_PERMITS)
    }

    /// Returns the breakdown folder.
    pub fn breakdown_dir(&self) -> &Path {
        &self.breakdown_dir
    }
}

/// Parses an environment variable as seconds, falling back to `default_secs`.
fn read_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}

/// Parses an environment variable as a count, falling back to `default`.
fn read_usize(env: &str, default: usize) -> usize {
    std::env::var(env)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}
