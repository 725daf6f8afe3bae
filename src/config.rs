//! Configuration loading for chat-guardrails
//!
//! Supports TOML configuration with embedded defaults.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// General configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable audit logging
    pub audit_log: bool,

    /// Path to audit log file
    pub audit_path: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            audit_log: true,
            audit_path: Some("~/.local/share/chat-guardrails/audit.jsonl".to_string()),
        }
    }
}

/// Pattern file configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// Line-oriented pattern list, created empty if absent
    pub file: String,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            file: "badwords.txt".to_string(),
        }
    }
}

/// Strike tracking configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrikesConfig {
    /// Seconds a strike record survives after its last update
    pub window_secs: u64,
}

impl Default for StrikesConfig {
    fn default() -> Self {
        Self {
            window_secs: 600,
        }
    }
}

/// Enforcement configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnforcementConfig {
    /// Label placed before the matched text in warnings
    pub warning_prefix: String,

    /// Characters of matched text quoted in warnings
    pub warning_chars: usize,

    /// Skip moderation for speakers the collaborator flags as exempt
    pub exempt_moderators: bool,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            warning_prefix: "You're not allowed to say that: ".to_string(),
            warning_chars: 20,
            exempt_moderators: true,
        }
    }
}

/// Paste service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Paste API endpoint
    pub endpoint: String,

    /// Developer key sent as `api_dev_key`
    pub api_key: String,

    /// Title sent as `api_paste_name`
    pub paste_name: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://pastebin.com/api/api_post.php".to_string(),
            api_key: String::new(),
            paste_name: "Badword_list".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub patterns: PatternsConfig,
    pub strikes: StrikesConfig,
    pub enforcement: EnforcementConfig,
    pub publish: PublishConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load() -> Self {
        let config_paths = [
            // User-specific config
            dirs::config_dir().map(|p| p.join("chat-guardrails/config.toml")),
            // System-wide config
            Some(PathBuf::from("/etc/chat-guardrails/config.toml")),
        ];

        for path in config_paths.into_iter().flatten() {
            if path.exists() {
                if let Ok(content) = std::fs::read_to_string(&path) {
                    match toml::from_str::<Config>(&content) {
                        Ok(config) => return config.with_env_overrides(),
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "failed to parse config");
                        }
                    }
                }
            }
        }

        Config::default().with_env_overrides()
    }

    /// Load from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config.with_env_overrides())
    }

    /// Apply environment overrides (secrets stay out of config files)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("CHAT_GUARDRAILS_PASTE_KEY") {
            self.publish.api_key = key;
        }
        self
    }

    /// Expand ~ in path strings
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get the audit log path (expanded)
    pub fn audit_path(&self) -> Option<PathBuf> {
        self.general.audit_path.as_ref().map(|p| Self::expand_path(p))
    }

    /// Get the pattern file path (expanded)
    pub fn patterns_path(&self) -> PathBuf {
        Self::expand_path(&self.patterns.file)
    }

    /// Strike decay window
    pub fn strike_window(&self) -> Duration {
        Duration::from_secs(self.strikes.window_secs)
    }

    /// Paste request timeout
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish.timeout_secs)
    }
}

/// Embedded default configuration
pub const DEFAULT_CONFIG_TOML: &str = r#"
[general]
audit_log = true
audit_path = "~/.local/share/chat-guardrails/audit.jsonl"

[patterns]
file = "badwords.txt"

[strikes]
window_secs = 600

[enforcement]
warning_prefix = "You're not allowed to say that: "
warning_chars = 20
exempt_moderators = true

[publish]
endpoint = "https://pastebin.com/api/api_post.php"
api_key = ""
paste_name = "Badword_list"
timeout_secs = 10
"#;
