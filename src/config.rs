use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::platform::ChatHandle;

/// A participant as written in the config file, before it is looked up.
///
/// Accepted shapes are `{ chat_id = 123 }` and `{ username = "name" }`. When
/// both keys are present the username wins.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ParticipantReference {
    ByUsername { username: String },
    ByHandle { chat_id: ChatHandle },
}

#[cfg(test)]
impl ParticipantReference {
    pub fn by_handle(handle: ChatHandle) -> Self {
        ParticipantReference::ByHandle { chat_id: handle }
    }

    pub fn by_username(username: &str) -> Self {
        ParticipantReference::ByUsername {
            username: username.to_string(),
        }
    }
}

impl fmt::Display for ParticipantReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantReference::ByUsername { username } => write!(f, "username='{}'", username),
            ParticipantReference::ByHandle { chat_id } => write!(f, "chatId={}", chat_id),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    #[serde(default)]
    pub regex: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForwardingConfig {
    #[serde(alias = "source", default, deserialize_with = "one_or_many")]
    pub sources: Vec<ParticipantReference>,
    #[serde(default)]
    pub destinations: Vec<ParticipantReference>,
    #[serde(default)]
    pub filter: FilterConfig,
    /// Forward by reference instead of composing a copy
    #[serde(default)]
    pub forward: bool,
}

impl ForwardingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            bail!("Missing forwarding.sources");
        }
        if self.destinations.is_empty() {
            bail!("forwarding.destinations is empty");
        }
        Ok(())
    }

    /// The configured pattern, treating an empty string as "no filter"
    pub fn filter_pattern(&self) -> Option<&str> {
        self.filter.regex.as_deref().filter(|r| !r.is_empty())
    }
}

/// `sources` used to be a single object; both that and a list are accepted.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<ParticipantReference>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(ParticipantReference),
        Many(Vec<ParticipantReference>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(reference) => vec![reference],
        OneOrMany::Many(references) => references,
    })
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    /// Tracing filter directive used when RUST_LOG is not set
    #[serde(default)]
    pub log_filter: Option<String>,
    #[serde(default = "default_heartbeat_cron")]
    pub heartbeat_cron: String,
    /// Capacity of the queue between the platform and the relay
    #[serde(default = "default_update_buffer")]
    pub update_buffer: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_filter: None,
            heartbeat_cron: default_heartbeat_cron(),
            update_buffer: default_update_buffer(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(alias = "forwarding_config")]
    pub forwarding: ForwardingConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

fn default_heartbeat_cron() -> String {
    "0 0 * * * *".to_string()
}

fn default_update_buffer() -> usize {
    256
}

/// Config path: first CLI argument that is not a flag, then `CONFIG_FILE`,
/// then `config.toml`.
pub fn config_path(args: &[String], env_value: Option<String>) -> PathBuf {
    args.iter()
        .skip(1)
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        let config = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML config")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse JSON config")
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            bail!("telegram.bot_token is empty");
        }
        self.forwarding.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[telegram]
bot_token = "123:abc"

[forwarding]
sources = [{ chat_id = -1001 }, { username = "news" }]
destinations = [{ chat_id = 42 }]
forward = true

[forwarding.filter]
regex = "^hello"

[general]
heartbeat_cron = "0 */5 * * * *"
"#;

    #[test]
    fn test_parse_full_toml() {
        let config = Config::from_toml(FULL).unwrap();
        assert_eq!(
            config.forwarding.sources,
            vec![
                ParticipantReference::by_handle(-1001),
                ParticipantReference::by_username("news"),
            ]
        );
        assert_eq!(
            config.forwarding.destinations,
            vec![ParticipantReference::by_handle(42)]
        );
        assert!(config.forwarding.forward);
        assert_eq!(config.forwarding.filter_pattern(), Some("^hello"));
        assert_eq!(config.general.heartbeat_cron, "0 */5 * * * *");
        assert_eq!(config.general.update_buffer, 256);
        config.validate().unwrap();
    }

    #[test]
    fn test_single_source_object() {
        let config = Config::from_toml(
            r#"
[telegram]
bot_token = "t"

[forwarding]
source = { username = "solo" }
destinations = [{ username = "out" }]
"#,
        )
        .unwrap();
        assert_eq!(
            config.forwarding.sources,
            vec![ParticipantReference::by_username("solo")]
        );
        assert!(!config.forwarding.forward);
        assert_eq!(config.forwarding.filter_pattern(), None);
        assert!(config.general.log_filter.is_none());
    }

    #[test]
    fn test_legacy_json_layout() {
        let config = Config::from_json(
            r#"{
                "telegram": { "bot_token": "t" },
                "forwarding_config": {
                    "source": [{ "chat_id": 7 }],
                    "destinations": [{ "chat_id": 8 }, { "username": "x" }],
                    "filter": { "regex": "" },
                    "forward": false
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.forwarding.sources,
            vec![ParticipantReference::by_handle(7)]
        );
        assert_eq!(config.forwarding.destinations.len(), 2);
        assert_eq!(config.forwarding.filter_pattern(), None);
    }

    #[test]
    fn test_username_wins_over_chat_id() {
        let reference: ParticipantReference =
            serde_json::from_str(r#"{ "chat_id": 5, "username": "both" }"#).unwrap();
        assert_eq!(reference, ParticipantReference::by_username("both"));
    }

    #[test]
    fn test_empty_sources_rejected() {
        let config = Config::from_toml(
            r#"
[telegram]
bot_token = "t"

[forwarding]
sources = []
destinations = [{ chat_id = 1 }]
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("forwarding.sources"));
    }

    #[test]
    fn test_missing_destinations_rejected() {
        let config = Config::from_toml(
            r#"
[telegram]
bot_token = "t"

[forwarding]
sources = [{ chat_id = 1 }]
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("destinations"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let config = Config::from_toml(
            r#"
[telegram]
bot_token = ""

[forwarding]
sources = [{ chat_id = 1 }]
destinations = [{ chat_id = 2 }]
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_path_resolution() {
        let args = vec!["tgrelay".to_string(), "--auth-only".to_string()];
        assert_eq!(config_path(&args, None), PathBuf::from("config.toml"));
        assert_eq!(
            config_path(&args, Some("relay.json".to_string())),
            PathBuf::from("relay.json")
        );

        let args = vec!["tgrelay".to_string(), "custom.toml".to_string()];
        assert_eq!(
            config_path(&args, Some("relay.json".to_string())),
            PathBuf::from("custom.toml")
        );
    }

    #[test]
    fn test_load_reads_file_and_validates() {
        let dir = std::env::temp_dir().join(format!("tgrelay-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("relay.toml");
        std::fs::write(&path, FULL).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.telegram.bot_token, "123:abc");
        std::fs::remove_dir_all(&dir).ok();
    }
}
