// src/config/model.rs

use serde::Deserialize;

use crate::engine::{default_ncpus, EngineOptions};
use crate::types::{EngineKind, SchedulePolicy, SchedulerKind};

/// Engine configuration as read from a TOML file, before validation.
///
/// ```toml
/// [engine]
/// kind = "threaded"
/// ncpus = 4
///
/// [scheduler]
/// kind = "fifo"
/// policy = "coalesce"
/// ```
///
/// All sections and keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,
}

/// `[engine]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// `"sequential"` (default) or `"threaded"`.
    #[serde(default)]
    pub kind: EngineKind,

    /// Worker threads for the threaded engine. Defaults to the number of
    /// hardware threads.
    #[serde(default)]
    pub ncpus: Option<usize>,
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerSection {
    /// `"fifo"` (default) or `"priority"`.
    #[serde(default)]
    pub kind: SchedulerKind,

    /// `"coalesce"` (default), `"replace"` or `"multiset"`.
    #[serde(default)]
    pub policy: SchedulePolicy,
}

/// Validated configuration. Build one with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub scheduler: SchedulerSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(engine: EngineSection, scheduler: SchedulerSection) -> Self {
        Self { engine, scheduler }
    }

    /// Engine options described by this file.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            engine: self.engine.kind,
            ncpus: self.engine.ncpus.unwrap_or_else(default_ncpus),
            scheduler: self.scheduler.kind,
            policy: self.scheduler.policy,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(EngineSection::default(), SchedulerSection::default())
    }
}
