use std::path::{Path, PathBuf};
use std::time::Duration;

use intake_chat::ChatSettings;
use intake_core::models::session::SESSION_TTL_DAYS;
use intake_form::AutosaveSettings;
use intake_storage::SessionSettings;
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

/// Longest session lifetime accepted from the config file.
const MAX_SESSION_TTL_DAYS: i64 = 3650;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    /// Directory holding one JSON file per stored key.
    pub storage_dir: PathBuf,
    pub autosave_debounce_ms: u64,
    pub recording_delay_ms: u64,
    pub session_ttl_days: i64,
    pub min_freeform_turns: usize,
    /// Extra phrases for the crisis scan, on top of the built-in list.
    #[serde(default)]
    pub crisis_keywords: Vec<String>,
    pub log_format: LogFormat,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        let chat = ChatSettings::default();
        Self {
            config_version: CURRENT_VERSION,
            storage_dir: default_storage_dir(),
            autosave_debounce_ms: duration_ms(AutosaveSettings::default().debounce),
            recording_delay_ms: duration_ms(chat.recording_delay),
            session_ttl_days: SESSION_TTL_DAYS,
            min_freeform_turns: chat.min_freeform_turns,
            crisis_keywords: Vec::new(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl IntakeConfig {
    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            recording_delay: Duration::from_millis(self.recording_delay_ms),
            min_freeform_turns: self.min_freeform_turns,
        }
    }

    pub fn autosave_settings(&self) -> AutosaveSettings {
        AutosaveSettings {
            debounce: Duration::from_millis(self.autosave_debounce_ms),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            ttl_days: self.session_ttl_days,
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("com.intake.cli")
        .join("sessions")
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("com.intake.cli"))
}

pub fn config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load the config at `path`, writing the defaults there on first run.
pub fn load_or_init(path: &Path) -> eyre::Result<IntakeConfig> {
    if path.exists() {
        return load_config(path);
    }
    let config = IntakeConfig::default();
    save_config(path, &config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> eyre::Result<IntakeConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: IntakeConfig = serde_json::from_value(migrated)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &IntakeConfig) -> eyre::Result<()> {
    if !(1..=MAX_SESSION_TTL_DAYS).contains(&config.session_ttl_days) {
        return Err(eyre::eyre!(
            "session_ttl_days must be between 1 and {MAX_SESSION_TTL_DAYS}, got {}",
            config.session_ttl_days
        ));
    }
    Ok(())
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
/// Each migration is a pure transform on the raw JSON value.
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update intake-cli."
        ));
    }

    // v0 → v1: tunables moved into the file; fill any that are missing.
    if from_version < 1 {
        let defaults = serde_json::to_value(IntakeConfig::default())?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        if let serde_json::Value::Object(defaults) = defaults {
            for (key, value) in defaults {
                obj.entry(key).or_insert(value);
            }
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added tunables)");
    }

    Ok(json)
}

pub fn save_config(path: &Path, config: &IntakeConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path has no parent: {}", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    // Set restrictive permissions on Unix before renaming
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
