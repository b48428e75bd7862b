// src/config/validate.rs

use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{EngineError, Result};
use crate::types::EngineKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = EngineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.engine, raw.scheduler))
    }
}

/// Check semantic constraints that deserialization cannot express.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_engine(cfg)?;
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    match cfg.engine.ncpus {
        Some(0) => Err(EngineError::ConfigError(
            "[engine].ncpus must be >= 1 (got 0)".to_string(),
        )),
        Some(n) if n > 1 && cfg.engine.kind == EngineKind::Sequential => {
            warn!(ncpus = n, "[engine].ncpus is ignored by the sequential engine");
            Ok(())
        }
        _ => Ok(()),
    }
}
