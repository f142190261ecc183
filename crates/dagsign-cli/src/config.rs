// CLI configuration and private key resolution
//
// The config file is optional JSON with serde defaults. Key material is
// resolved in order: --key (or DAGSIGN_PRIVATE_KEY), --key-file, then the
// config's private_key_file.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_VERSION: &str = "1.0";
const DEFAULT_FEE: f64 = 0.0;

/// dagsign CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Config schema version (must be "1.0")
    pub version: String,

    /// File holding a 64-hex private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_file: Option<PathBuf>,

    /// Fee in tokens applied when `tx create` gets no --fee
    #[serde(default = "default_fee")]
    pub default_fee: f64,

    /// Sign generic documents as DataUpdates unless told otherwise
    #[serde(default)]
    pub data_update: bool,
}

fn default_fee() -> f64 {
    DEFAULT_FEE
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: CONFIG_VERSION.to_string(),
            private_key_file: None,
            default_fee: DEFAULT_FEE,
            data_update: false,
        }
    }
}

/// Parses and validates a config JSON string.
///
/// # Validation Rules
/// 1. JSON must parse into `Config`
/// 2. Version must be "1.0"
/// 3. `default_fee` must be a finite, non-negative number
pub fn validate_config(config_json: &str) -> Result<Config> {
    let config: Config =
        serde_json::from_str(config_json).map_err(|e| anyhow!("Invalid JSON: {}", e))?;

    if config.version != CONFIG_VERSION {
        return Err(anyhow!(
            "Invalid config version: expected '{}', got '{}'",
            CONFIG_VERSION,
            config.version
        ));
    }

    if !config.default_fee.is_finite() || config.default_fee < 0.0 {
        return Err(anyhow!(
            "default_fee must be non-negative, got {}",
            config.default_fee
        ));
    }

    Ok(config)
}

/// Loads the config from `path`, or from `~/.dagsign/config.json` when it
/// exists. Falls back to defaults when neither applies.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.is_file() => p,
            _ => return Ok(Config::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config '{}'", path.display()))?;
    let config = validate_config(&content)
        .with_context(|| format!("Invalid config '{}'", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// `~/.dagsign/config.json`, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    #[cfg(unix)]
    let home = std::env::var_os("HOME");

    #[cfg(windows)]
    let home = std::env::var_os("USERPROFILE");

    home.map(|h| PathBuf::from(h).join(".dagsign").join("config.json"))
}

/// Resolves every private key to sign with.
///
/// Explicit keys win; otherwise a single key is read from `key_file` or
/// the config's `private_key_file`.
pub fn resolve_private_keys(
    keys: &[String],
    key_file: Option<&Path>,
    config: &Config,
) -> Result<Vec<String>> {
    if !keys.is_empty() {
        return keys
            .iter()
            .map(|k| check_private_key(k.trim(), "--key"))
            .collect();
    }

    let file = key_file
        .map(Path::to_path_buf)
        .or_else(|| config.private_key_file.clone())
        .ok_or_else(|| {
            anyhow!("No private key: pass --key, set DAGSIGN_PRIVATE_KEY, or use --key-file")
        })?;

    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read key file '{}'", file.display()))?;
    let key = check_private_key(content.trim(), &file.display().to_string())?;
    Ok(vec![key])
}

/// Resolves exactly one private key.
pub fn resolve_private_key(
    keys: &[String],
    key_file: Option<&Path>,
    config: &Config,
) -> Result<String> {
    let mut resolved = resolve_private_keys(keys, key_file, config)?;
    if resolved.len() > 1 {
        return Err(anyhow!(
            "This command signs with one key, got {}",
            resolved.len()
        ));
    }
    resolved
        .pop()
        .ok_or_else(|| anyhow!("No private key resolved"))
}

fn check_private_key(key: &str, source: &str) -> Result<String> {
    if !dagsign_crypto::is_valid_private_key(key) {
        return Err(anyhow!(
            "Private key from {} must be 64 hex characters",
            source
        ));
    }
    Ok(key.to_string())
}
