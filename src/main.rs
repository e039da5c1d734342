use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{info, Level};

mod config;
mod error;
mod http_server;
mod menu;
mod platform;
mod store;

use config::{Config, DEFAULT_CONFIGS_DIR, DEFAULT_HTTP_PORT};
use http_server::HttpServer;
use menu::Menu;
use platform::{Platform, PLATFORMS};
use store::{ConfigStore, StreamConfig};

/// Generate RTMP destination URLs for OBS and vMix.
#[derive(Debug, Parser)]
#[command(name = "rtmpgen", version, about)]
struct Cli {
    /// Directory holding saved configurations
    #[arg(long, global = true, default_value = DEFAULT_CONFIGS_DIR)]
    config_dir: PathBuf,

    /// Log level written to stderr
    #[arg(long, global = true, default_value_t = Level::WARN)]
    log_level: Level,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive terminal menu (default)
    Menu,
    /// Render one URL and print the OBS/vMix setup
    Generate {
        #[arg(long)]
        platform: String,
        #[arg(long)]
        stream_key: String,
        #[arg(long, default_value = "")]
        server_url: String,
        #[arg(long, default_value = "")]
        app_name: String,
        /// Also save the result under this name
        #[arg(long)]
        save: Option<String>,
    },
    /// List saved configurations
    List,
    /// List supported platforms
    Platforms,
    /// Serve the web form
    Serve {
        #[arg(long, default_value_t = DEFAULT_HTTP_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::new(cli.config_dir);
    info!("Using configuration directory {}", config.configs_dir.display());

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let store = ConfigStore::new(config);
            Menu::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), store)
                .run()
                .await?;
        }
        Command::Generate {
            platform,
            stream_key,
            server_url,
            app_name,
            save,
        } => generate(config, &platform, stream_key, server_url, app_name, save).await?,
        Command::List => list(config).await?,
        Command::Platforms => {
            for (i, spec) in PLATFORMS.iter().enumerate() {
                println!("{}. {} - {}", i + 1, spec.key, spec.url_template);
                println!("   {}", spec.help_text);
            }
        }
        Command::Serve { port } => {
            info!("Starting RTMP URL generator web form");
            HttpServer::new(config.with_http_port(port)).start().await;
        }
    }

    Ok(())
}

async fn generate(
    config: Config,
    platform: &str,
    stream_key: String,
    server_url: String,
    app_name: String,
    save: Option<String>,
) -> Result<()> {
    let platform = Platform::parse_lenient(platform)?;
    let rtmp_url = platform::render(platform.key(), &stream_key, &server_url, &app_name)?;
    let setup = platform::setup_fields(platform, &stream_key, &server_url, &app_name);

    println!("Platform: {}", platform.key().to_uppercase());
    println!("RTMP URL: {}", rtmp_url);
    println!("Server: {}", setup.server);
    println!("Stream Key: {}", setup.stream_key);

    if let Some(name) = save {
        let stream_config = StreamConfig::new(name, platform, stream_key, server_url, app_name)?;
        let path = ConfigStore::new(config)
            .save(&stream_config)
            .await
            .context("saving configuration")?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}

async fn list(config: Config) -> Result<()> {
    let configs = ConfigStore::new(config).load_all().await?;
    if configs.is_empty() {
        println!("No saved configurations found.");
        return Ok(());
    }

    for (i, config) in configs.iter().enumerate() {
        println!("{}. {} ({})", i + 1, config.name(), config.platform_key());
        println!("   RTMP URL: {}", config.rtmp_url());
        if let Ok(setup) = config.setup_fields() {
            println!("   Server: {}", setup.server);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_menu_without_subcommand() {
        let cli = Cli::try_parse_from(["rtmpgen"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config_dir, PathBuf::from("configs"));
        assert_eq!(cli.log_level, Level::WARN);
    }

    #[test]
    fn parses_generate_arguments() {
        let cli = Cli::try_parse_from([
            "rtmpgen",
            "--config-dir",
            "/tmp/x",
            "generate",
            "--platform",
            "custom",
            "--stream-key",
            "abc",
            "--server-url",
            "host",
            "--app-name",
            "live",
            "--save",
            "studio",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Generate { platform, save, .. }) => {
                assert_eq!(platform, "custom");
                assert_eq!(save.as_deref(), Some("studio"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn generate_saves_when_named() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf());
        generate(
            config.clone(),
            "youtube",
            "k".to_string(),
            String::new(),
            String::new(),
            Some("yt".to_string()),
        )
        .await
        .unwrap();

        let saved = ConfigStore::new(config).load("yt").await.unwrap().unwrap();
        assert_eq!(saved.rtmp_url(), "rtmp://a.rtmp.youtube.com/live2/k");
    }

    #[tokio::test]
    async fn generate_accepts_typed_platform_names() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf());
        generate(
            config.clone(),
            " Twitch ",
            "k".to_string(),
            String::new(),
            String::new(),
            Some("tw".to_string()),
        )
        .await
        .unwrap();

        let saved = ConfigStore::new(config).load("tw").await.unwrap().unwrap();
        assert_eq!(saved.platform_key(), "twitch");
    }

    #[tokio::test]
    async fn generate_reports_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate(
            Config::new(dir.path().to_path_buf()),
            "twitch",
            String::new(),
            String::new(),
            String::new(),
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("stream_key"));
    }
}
