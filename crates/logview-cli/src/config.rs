// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const CONFIG_PATH_ENV: &str = "LOGVIEW_CONFIG_PATH";
const DEFAULT_TICK_RATE: &str = "250ms";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            fields: Fields::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

/// Ordered field names offered as filter suggestions. Empty means "use the
/// fields found in the log file".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fields {
    #[serde(default)]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub reload_interval: Option<String>,
    pub tick_rate: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub dir: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root
            .join(logview_source::APP_NAME)
            .join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` at the top",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        for (index, name) in self.fields.names.iter().enumerate() {
            if name.trim().is_empty() {
                bail!(
                    "fields.names[{index}] in {} is empty; remove it or give it a name",
                    path.display()
                );
            }
            if self.fields.names[..index].contains(name) {
                bail!(
                    "fields.names in {} lists {name:?} more than once; keep one entry per field",
                    path.display()
                );
            }
        }

        let tick_rate = self.tick_rate()?;
        if tick_rate.is_zero() {
            bail!("ui.tick_rate in {} must be positive", path.display());
        }
        if let Some(interval) = self.reload_interval()?
            && interval.is_zero()
        {
            bail!(
                "ui.reload_interval in {} must be positive; remove it to disable reloading",
                path.display()
            );
        }

        let level = self.log_level();
        if !LOG_LEVELS.contains(&level) {
            bail!(
                "log.level {level:?} in {} is not one of: {}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }
        Ok(())
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields.names
    }

    pub fn tick_rate(&self) -> Result<Duration> {
        parse_duration(self.ui.tick_rate.as_deref().unwrap_or(DEFAULT_TICK_RATE))
            .context("ui.tick_rate")
    }

    pub fn reload_interval(&self) -> Result<Option<Duration>> {
        self.ui
            .reload_interval
            .as_deref()
            .map(parse_duration)
            .transpose()
            .context("ui.reload_interval")
    }

    /// Number of ticks between log reloads, rounded up; `None` disables them.
    pub fn reload_every_ticks(&self) -> Result<Option<u64>> {
        let Some(interval) = self.reload_interval()? else {
            return Ok(None);
        };
        let tick = self.tick_rate()?.as_millis().max(1);
        let ticks = interval.as_millis().div_ceil(tick).max(1);
        Ok(Some(u64::try_from(ticks).unwrap_or(u64::MAX)))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.log.dir {
            return Ok(PathBuf::from(dir));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].dir in the config file")
        })?;
        Ok(data_root.join(logview_source::APP_NAME))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# logview config\n# Place this file at: {}\n\nversion = 1\n\n[fields]\n# Suggested filter fields, in order. Leave empty to use the fields found in the log.\nnames = [\"level\", \"message\", \"timestamp\"]\n\n[ui]\n# Re-read the log file this often. Remove to disable.\nreload_interval = \"2s\"\ntick_rate = \"{}\"\n\n[log]\nlevel = \"{}\"\n# dir = \"/absolute/path/to/logs\"\n",
            path.display(),
            DEFAULT_TICK_RATE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let (digits, millis_per_unit) = if let Some(value) = raw.strip_suffix("ms") {
        (value, 1)
    } else if let Some(value) = raw.strip_suffix('s') {
        (value, 1_000)
    } else if let Some(value) = raw.strip_suffix('m') {
        (value, 60_000)
    } else {
        bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 250ms or 2s)")
    };
    let count: u64 = digits
        .parse()
        .with_context(|| format!("invalid duration {raw:?}"))?;
    Ok(Duration::from_millis(count.saturating_mul(millis_per_unit)))
}
