use crate::{
    config::Config,
    error::{GeneratorError, Result},
};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{debug, info, warn};

mod stream_config;

pub use stream_config::{validate_name, StreamConfig};

/// Saved configurations, one pretty-printed JSON document per name.
///
/// No locking is done; two writers saving the same name race and the last
/// one wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: Config,
}

impl ConfigStore {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn dir(&self) -> &Path {
        &self.config.configs_dir
    }

    /// Write `stream_config`, replacing any existing file with the same name.
    ///
    /// Configurations whose stored URL no longer matches their fields are
    /// refused.
    pub async fn save(&self, stream_config: &StreamConfig) -> Result<PathBuf> {
        let name = stream_config.name();
        validate_name(name)?;
        if !stream_config.is_consistent() {
            return Err(GeneratorError::InconsistentUrl(name.to_string()));
        }

        fs::create_dir_all(self.dir()).await?;

        let path = self.config.config_path(name);
        let json = serde_json::to_string_pretty(stream_config).map_err(|e| GeneratorError::Serialize {
            name: name.to_string(),
            source: e,
        })?;
        fs::write(&path, json).await?;

        info!("Saved configuration '{}' to {}", name, path.display());
        Ok(path)
    }

    /// Load a single configuration by name. A missing file is `None`.
    pub async fn load(&self, name: &str) -> Result<Option<StreamConfig>> {
        validate_name(name)?;

        let path = self.config.config_path(name);
        match fs::read_to_string(&path).await {
            Ok(content) => parse_config(&path, &content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No saved configuration named '{}'", name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load every `*.json` document in the directory, sorted by name.
    ///
    /// Files that fail to read or parse are skipped with a warning. A missing
    /// directory yields an empty list.
    pub async fn load_all(&self) -> Result<Vec<StreamConfig>> {
        let mut entries = match fs::read_dir(self.dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Configuration directory {} does not exist", self.dir().display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut configs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable configuration {}: {}", path.display(), e);
                    continue;
                }
            };

            match parse_config(&path, &content) {
                Ok(config) => configs.push(config),
                Err(e) => warn!("Skipping configuration: {}", e),
            }
        }

        configs.sort_by(|a, b| a.name().cmp(b.name()));
        debug!("Loaded {} configurations from {}", configs.len(), self.dir().display());
        Ok(configs)
    }
}

fn parse_config(path: &Path, content: &str) -> Result<StreamConfig> {
    let config: StreamConfig = serde_json::from_str(content).map_err(|e| GeneratorError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    if !config.is_consistent() {
        warn!(
            "Stored RTMP URL for '{}' does not match its platform and key",
            config.name()
        );
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn temp_store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(Config::new(dir.path().join("configs")));
        (dir, store)
    }

    fn twitch(name: &str, key: &str) -> StreamConfig {
        StreamConfig::new(name, Platform::Twitch, key, "", "").unwrap()
    }

    #[tokio::test]
    async fn load_all_on_missing_dir_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_all_round_trips() {
        let (_dir, store) = temp_store();
        let config = StreamConfig::new("studio", Platform::Custom, "k1", "host.example.com", "live").unwrap();

        let path = store.save(&config).await.unwrap();
        assert_eq!(path, store.dir().join("studio.json"));

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded, vec![config]);
    }

    #[tokio::test]
    async fn saving_twice_keeps_one_file_with_the_latest_content() {
        let (_dir, store) = temp_store();
        store.save(&twitch("main", "first")).await.unwrap();
        let second = twitch("main", "second");
        store.save(&second).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded, vec![second]);
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn writes_pretty_json() {
        let (_dir, store) = temp_store();
        let path = store.save(&twitch("pretty", "k")).await.unwrap();
        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.contains("\n  \"name\": \"pretty\""));
    }

    #[tokio::test]
    async fn load_all_skips_corrupt_and_foreign_files() {
        let (_dir, store) = temp_store();
        store.save(&twitch("b", "k")).await.unwrap();
        store.save(&twitch("a", "k")).await.unwrap();
        std::fs::write(store.dir().join("broken.json"), "{ not json").unwrap();
        std::fs::write(store.dir().join("notes.txt"), "hello").unwrap();

        let names: Vec<_> = store
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn load_by_name() {
        let (_dir, store) = temp_store();
        store.save(&twitch("main", "k")).await.unwrap();

        assert_eq!(store.load("main").await.unwrap(), Some(twitch("main", "k")));
        assert_eq!(store.load("other").await.unwrap(), None);

        std::fs::write(store.dir().join("broken.json"), "[]").unwrap();
        assert!(matches!(
            store.load("broken").await,
            Err(GeneratorError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn save_rejects_path_traversal() {
        let (_dir, store) = temp_store();
        let json = r#"{"name":"../evil","platform":"twitch","stream_key":"k",
            "server_url":"","app_name":"","rtmp_url":"rtmp://live.twitch.tv/app/k"}"#;
        let config: StreamConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(
            store.save(&config).await,
            Err(GeneratorError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn save_refuses_configs_with_a_stale_url() {
        let (_dir, store) = temp_store();
        let json = r#"{"name":"stale","platform":"twitch","stream_key":"k",
            "server_url":"","app_name":"","rtmp_url":"rtmp://elsewhere.example/app/k"}"#;
        let config: StreamConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(
            store.save(&config).await,
            Err(GeneratorError::InconsistentUrl(name)) if name == "stale"
        ));
        assert!(!store.dir().exists());
    }

    #[tokio::test]
    async fn save_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("configs");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = ConfigStore::new(Config::new(blocker));

        assert!(matches!(
            store.save(&twitch("main", "k")).await,
            Err(GeneratorError::Io(_))
        ));
    }
}
