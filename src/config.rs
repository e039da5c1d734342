use std::path::PathBuf;

pub const DEFAULT_CONFIGS_DIR: &str = "configs";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub configs_dir: PathBuf,
    pub http_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            configs_dir: PathBuf::from(DEFAULT_CONFIGS_DIR),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

impl Config {
    pub fn new(configs_dir: PathBuf) -> Self {
        Self {
            configs_dir,
            ..Self::default()
        }
    }

    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    /// Path of the JSON document holding the configuration called `name`.
    pub fn config_path(&self, name: &str) -> PathBuf {
        self.configs_dir.join(format!("{}.json", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_appends_json_extension() {
        let config = Config::new(PathBuf::from("/tmp/streams"));
        assert_eq!(
            config.config_path("My Twitch"),
            PathBuf::from("/tmp/streams/My Twitch.json")
        );
    }

    #[test]
    fn default_uses_local_configs_dir() {
        let config = Config::default().with_http_port(9000);
        assert_eq!(config.configs_dir, PathBuf::from("configs"));
        assert_eq!(config.http_port, 9000);
    }
}
