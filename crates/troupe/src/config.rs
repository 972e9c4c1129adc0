//! # Actor configuration
//!
//! TOML-backed settings for one actor: identity, mailbox shape, gating,
//! failure handling, scheduling and logging.

use anyhow::{bail, Context as _, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::context::{Context, Scheduler};
use crate::mailbox::Mailbox;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActorConfig {
    pub name: String,
    /// Gate content on Started/Running
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub failure: FailurePolicy,
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Display for ActorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ActorConfig(name: {}, strict: {}, failure: {:?}, mailbox: {:?}, scheduler: {:?})",
            self.name, self.strict, self.failure, self.mailbox, self.scheduler
        )
    }
}

impl ActorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strict: false,
            failure: FailurePolicy::default(),
            mailbox: MailboxConfig::default(),
            scheduler: None,
            logging: LoggingConfig::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ActorConfig = toml::from_str(content).context("Failed to parse actor config")?;
        config.validate()?;
        debug!("Loaded actor config: {}", config);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read actor config {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Actor name must not be empty");
        }
        if self.mailbox.capacity == Some(0) {
            bail!("Mailbox capacity for actor '{}' must be greater than 0", self.name);
        }
        Ok(())
    }

    /// A fresh context carrying this config's identity and scheduler.
    pub fn context(&self) -> Context {
        let context = Context::new(self.name.as_str());
        match &self.scheduler {
            Some(scheduler) => context.with_scheduler(scheduler.to_scheduler()),
            None => context,
        }
    }

    pub fn mailbox<T>(&self) -> Mailbox<T> {
        Mailbox::from_config(&self.mailbox)
    }
}

/// What the consumer loop does to the actor's status after a handler fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Leave the status alone and keep draining
    #[default]
    Continue,
    /// Force the actor to Paused
    Pause,
    /// Force the actor to Failed
    Fail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MailboxConfig {
    /// `None` for an unbounded mailbox
    pub capacity: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulerConfig {
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    #[serde(default)]
    pub resume_after_secs: Option<u64>,
}

fn default_delay_secs() -> u64 {
    crate::context::DEFAULT_DELAY.as_secs()
}

impl SchedulerConfig {
    pub fn to_scheduler(&self) -> Scheduler {
        let scheduler = Scheduler::new(Duration::from_secs(self.delay_secs));
        match self.resume_after_secs {
            Some(secs) => scheduler.resume_after(Duration::from_secs(secs)),
            None => scheduler,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub output: LogOutput,
    pub file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            file_path: None,
        }
    }
}
