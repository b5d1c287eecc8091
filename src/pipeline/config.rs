//! Render job configuration.
//!
//! Values set through the `with_*` setters are explicit and always win;
//! everything else may be filled in from `OFDRENDER_*` environment variables.

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, Map};
use log::warn;
use ofdrender_render_core::{DrawOptions, RenderMode, TextMismatchPolicy, UnknownOption};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What happens when one chunk of a concurrent render fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChunkFailurePolicy {
    /// Log the failure and leave that chunk's pages out of the output.
    #[default]
    DropChunk,
    /// Fail the whole job; `OfdRenderer::render` then returns the fallback document.
    FailJob,
}

impl ChunkFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkFailurePolicy::DropChunk => "drop-chunk",
            ChunkFailurePolicy::FailJob => "fail-job",
        }
    }
}

impl FromStr for ChunkFailurePolicy {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "dropchunk" | "drop" => Ok(ChunkFailurePolicy::DropChunk),
            "failjob" | "fail" => Ok(ChunkFailurePolicy::FailJob),
            _ => Err(UnknownOption { kind: "chunk failure policy", value: s.to_string() }),
        }
    }
}

/// Prefix of the environment variables, e.g. `OFDRENDER_RENDER_MODE`.
pub const ENV_PREFIX: &str = "OFDRENDER";

/// The environment-facing view of `RenderConfig`. Keys are the lowercased
/// variable names without the prefix.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvSettings {
    render_mode: Option<String>,
    /// A positive count, or `auto`.
    max_workers: Option<String>,
    single_thread_threshold: Option<usize>,
    min_pages_per_chunk: Option<usize>,
    optimized_pages_per_chunk: Option<usize>,
    force_single_thread: Option<bool>,
    use_cache: Option<bool>,
    cache_dir: Option<PathBuf>,
    text_mismatch_policy: Option<String>,
    chunk_failure_policy: Option<String>,
}

impl EnvSettings {
    fn load(config: Config) -> Self {
        match config.clone().try_deserialize() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("[CONFIG] Some {}_* values are malformed: {}", ENV_PREFIX, e);
                Self::salvage(&config)
            }
        }
    }

    /// Reads key by key so one bad value does not discard the rest.
    fn salvage(config: &Config) -> Self {
        Self {
            render_mode: lenient_get(config, "render_mode"),
            max_workers: lenient_get(config, "max_workers"),
            single_thread_threshold: lenient_get(config, "single_thread_threshold"),
            min_pages_per_chunk: lenient_get(config, "min_pages_per_chunk"),
            optimized_pages_per_chunk: lenient_get(config, "optimized_pages_per_chunk"),
            force_single_thread: lenient_get(config, "force_single_thread"),
            use_cache: lenient_get(config, "use_cache"),
            cache_dir: lenient_get(config, "cache_dir"),
            text_mismatch_policy: lenient_get(config, "text_mismatch_policy"),
            chunk_failure_policy: lenient_get(config, "chunk_failure_policy"),
        }
    }
}

fn lenient_get<T: DeserializeOwned>(config: &Config, key: &str) -> Option<T> {
    match config.get(key) {
        Ok(value) => Some(value),
        Err(ConfigError::NotFound(_)) => None,
        Err(e) => {
            warn!("[CONFIG] Ignoring {}_{}: {}", ENV_PREFIX, key.to_ascii_uppercase(), e);
            None
        }
    }
}

fn parse_option<T: FromStr<Err = UnknownOption>>(value: &str) -> Option<T> {
    value.parse().map_err(|e| warn!("[CONFIG] Ignoring {}", e)).ok()
}

/// `None` inside `Some` means "auto".
fn worker_count(value: &str) -> Option<Option<usize>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("auto") {
        return Some(None);
    }
    match value.parse::<usize>() {
        Ok(n) => Some((n > 0).then_some(n)),
        Err(e) => {
            warn!("[CONFIG] Ignoring {}_MAX_WORKERS={:?}: {}", ENV_PREFIX, value, e);
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    render_mode: RenderMode,
    max_workers: Option<usize>,
    single_thread_threshold: usize,
    min_pages_per_chunk: usize,
    optimized_pages_per_chunk: usize,
    force_single_thread: bool,
    use_cache: bool,
    cache_dir: PathBuf,
    text_mismatch_policy: TextMismatchPolicy,
    chunk_failure_policy: ChunkFailurePolicy,
    font_fallback_limit: usize,
    /// Fields set through a `with_*` setter, by environment key.
    explicit: BTreeSet<&'static str>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Line,
            max_workers: None,
            single_thread_threshold: 10,
            min_pages_per_chunk: 1,
            optimized_pages_per_chunk: 5,
            force_single_thread: false,
            use_cache: false,
            cache_dir: std::env::temp_dir().join("ofdrender_cache"),
            text_mismatch_policy: TextMismatchPolicy::DrawPositioned,
            chunk_failure_policy: ChunkFailurePolicy::DropChunk,
            font_fallback_limit: 10,
            explicit: BTreeSet::new(),
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by whatever the environment provides.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Applies environment values to every field not set through a `with_*`
    /// setter.
    pub fn merge_env(self) -> Self {
        self.merge_env_from(None)
    }

    /// `source` replaces the process environment when given.
    pub(crate) fn merge_env_from(mut self, source: Option<Map<String, String>>) -> Self {
        let config = match self.env_builder(source).and_then(|builder| builder.build()) {
            Ok(config) => config,
            Err(e) => {
                warn!("[CONFIG] Environment not applied: {}", e);
                return self;
            }
        };
        self.apply(EnvSettings::load(config));
        self
    }

    /// Environment source with the explicit values layered on top.
    fn env_builder(
        &self,
        source: Option<Map<String, String>>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let mut builder =
            Config::builder().add_source(Environment::with_prefix(ENV_PREFIX).source(source));
        for (key, value) in self.explicit_settings() {
            builder = builder.set_override(key, value)?;
        }
        Ok(builder)
    }

    fn explicit_settings(&self) -> Vec<(&'static str, String)> {
        let all = [
            ("render_mode", self.render_mode.as_str().to_string()),
            ("max_workers", self.max_workers.map_or_else(|| "auto".to_string(), |n| n.to_string())),
            ("single_thread_threshold", self.single_thread_threshold.to_string()),
            ("min_pages_per_chunk", self.min_pages_per_chunk.to_string()),
            ("optimized_pages_per_chunk", self.optimized_pages_per_chunk.to_string()),
            ("force_single_thread", self.force_single_thread.to_string()),
            ("use_cache", self.use_cache.to_string()),
            ("cache_dir", self.cache_dir.to_string_lossy().into_owned()),
            ("text_mismatch_policy", self.text_mismatch_policy.as_str().to_string()),
            ("chunk_failure_policy", self.chunk_failure_policy.as_str().to_string()),
        ];
        all.into_iter().filter(|(key, _)| self.explicit.contains(key)).collect()
    }

    fn apply(&mut self, settings: EnvSettings) {
        if let Some(mode) = settings.render_mode.as_deref().and_then(parse_option) {
            self.render_mode = mode;
        }
        if let Some(workers) = settings.max_workers.as_deref().and_then(worker_count) {
            self.max_workers = workers;
        }
        if let Some(n) = settings.single_thread_threshold {
            self.single_thread_threshold = n;
        }
        if let Some(n) = settings.min_pages_per_chunk {
            self.min_pages_per_chunk = n;
        }
        if let Some(n) = settings.optimized_pages_per_chunk {
            self.optimized_pages_per_chunk = n;
        }
        if let Some(force) = settings.force_single_thread {
            self.force_single_thread = force;
        }
        if let Some(enabled) = settings.use_cache {
            self.use_cache = enabled;
        }
        if let Some(dir) = settings.cache_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            self.cache_dir = dir;
        }
        if let Some(policy) = settings.text_mismatch_policy.as_deref().and_then(parse_option) {
            self.text_mismatch_policy = policy;
        }
        if let Some(policy) = settings.chunk_failure_policy.as_deref().and_then(parse_option) {
            self.chunk_failure_policy = policy;
        }
    }

    fn mark(mut self, key: &'static str) -> Self {
        self.explicit.insert(key);
        self
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self.mark("render_mode")
    }

    /// `None` derives the worker count from the available CPUs.
    pub fn with_max_workers(mut self, workers: Option<usize>) -> Self {
        self.max_workers = workers.filter(|n| *n > 0);
        self.mark("max_workers")
    }

    pub fn with_single_thread_threshold(mut self, pages: usize) -> Self {
        self.single_thread_threshold = pages;
        self.mark("single_thread_threshold")
    }

    pub fn with_min_pages_per_chunk(mut self, pages: usize) -> Self {
        self.min_pages_per_chunk = pages;
        self.mark("min_pages_per_chunk")
    }

    pub fn with_optimized_pages_per_chunk(mut self, pages: usize) -> Self {
        self.optimized_pages_per_chunk = pages;
        self.mark("optimized_pages_per_chunk")
    }

    pub fn with_force_single_thread(mut self, force: bool) -> Self {
        self.force_single_thread = force;
        self.mark("force_single_thread")
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self.mark("use_cache")
    }

    pub fn with_cache_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cache_dir = dir.as_ref().to_path_buf();
        self.mark("cache_dir")
    }

    pub fn with_text_mismatch_policy(mut self, policy: TextMismatchPolicy) -> Self {
        self.text_mismatch_policy = policy;
        self.mark("text_mismatch_policy")
    }

    pub fn with_chunk_failure_policy(mut self, policy: ChunkFailurePolicy) -> Self {
        self.chunk_failure_policy = policy;
        self.mark("chunk_failure_policy")
    }

    pub fn with_font_fallback_limit(mut self, limit: usize) -> Self {
        self.font_fallback_limit = limit;
        self
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn max_workers(&self) -> Option<usize> {
        self.max_workers
    }

    pub fn single_thread_threshold(&self) -> usize {
        self.single_thread_threshold
    }

    pub fn min_pages_per_chunk(&self) -> usize {
        self.min_pages_per_chunk
    }

    pub fn optimized_pages_per_chunk(&self) -> usize {
        self.optimized_pages_per_chunk
    }

    pub fn force_single_thread(&self) -> bool {
        self.force_single_thread
    }

    pub fn use_cache(&self) -> bool {
        self.use_cache
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn text_mismatch_policy(&self) -> TextMismatchPolicy {
        self.text_mismatch_policy
    }

    pub fn chunk_failure_policy(&self) -> ChunkFailurePolicy {
        self.chunk_failure_policy
    }

    pub fn font_fallback_limit(&self) -> usize {
        self.font_fallback_limit
    }

    /// Pages per chunk on the concurrent path; never below one.
    pub fn pages_per_chunk(&self) -> usize {
        self.optimized_pages_per_chunk.max(self.min_pages_per_chunk).max(1)
    }

    /// Worker cap: the configured maximum, bounded by the CPUs available.
    pub fn worker_limit(&self) -> usize {
        let cpus = num_cpus::get().max(1);
        self.max_workers.map_or(cpus, |n| n.min(cpus))
    }

    pub fn draw_options(&self) -> DrawOptions {
        DrawOptions {
            render_mode: self.render_mode,
            text_mismatch_policy: self.text_mismatch_policy,
            font_fallback_limit: self.font_fallback_limit,
        }
    }
}
