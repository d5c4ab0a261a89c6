// src/config/validate.rs

use globset::Glob;

use crate::config::model::{RawWatchConfig, WatchConfig};
use crate::errors::{CngError, Result};

impl TryFrom<RawWatchConfig> for WatchConfig {
    type Error = CngError;

    fn try_from(raw: RawWatchConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(WatchConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawWatchConfig) -> Result<()> {
    ensure_has_arguments(cfg)?;
    ensure_has_separator(cfg)?;
    ensure_has_command(cfg)?;
    ensure_has_patterns(cfg)?;
    validate_globs("watch", &cfg.patterns)?;
    validate_globs("exclude", &cfg.exclude)?;
    Ok(())
}

fn ensure_has_arguments(cfg: &RawWatchConfig) -> Result<()> {
    if cfg.patterns.is_empty() && cfg.command.is_empty() && !cfg.separator {
        return Err(CngError::StartupConfig(
            "No arguments provided, please at least pass a pattern to watch and a command to run"
                .to_string(),
        ));
    }
    Ok(())
}

fn ensure_has_separator(cfg: &RawWatchConfig) -> Result<()> {
    if !cfg.separator {
        return Err(CngError::StartupConfig(
            "No '--' separator found between paths and command".to_string(),
        ));
    }
    Ok(())
}

fn ensure_has_command(cfg: &RawWatchConfig) -> Result<()> {
    if cfg.command.is_empty() {
        return Err(CngError::StartupConfig(
            "No command specified, pass a command to run after the '--' separator".to_string(),
        ));
    }
    Ok(())
}

fn ensure_has_patterns(cfg: &RawWatchConfig) -> Result<()> {
    if cfg.patterns.is_empty() {
        return Err(CngError::StartupConfig(
            "No paths specified, pass at least one pattern to watch before the '--' separator"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_globs(kind: &str, patterns: &[String]) -> Result<()> {
    for pat in patterns {
        Glob::new(pat).map_err(|e| {
            CngError::StartupConfig(format!("invalid {kind} pattern '{pat}': {e}"))
        })?;
    }
    Ok(())
}
