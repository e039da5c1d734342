use crate::{
    error::Result,
    platform::{self, Platform},
    store::{ConfigStore, StreamConfig},
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, error, info};

/// Line-driven terminal menu: generate, view saved, exit.
///
/// End of input is treated as "exit" wherever a prompt is waiting.
pub struct Menu<R, W> {
    input: Lines<R>,
    output: W,
    store: ConfigStore,
}

impl<R, W> Menu<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, store: ConfigStore) -> Self {
        Self {
            input: input.lines(),
            output,
            store,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Starting interactive menu");
        self.say("🎥 RTMP URL Generator for OBS").await?;
        self.say(&"=".repeat(40)).await?;

        loop {
            self.say("\nOptions:").await?;
            self.say("1. Generate new RTMP URL").await?;
            self.say("2. View saved configurations").await?;
            self.say("3. Exit").await?;

            let Some(choice) = self.prompt("\nSelect option (1-3): ").await? else {
                break;
            };

            match choice.as_str() {
                "1" => {
                    if !self.generate().await? {
                        break;
                    }
                }
                "2" => self.view_saved().await?,
                "3" => break,
                _ => self.say("Invalid option. Please try again.").await?,
            }
        }

        self.say("Goodbye!").await?;
        Ok(())
    }

    /// Returns `false` when input ran out mid-way.
    async fn generate(&mut self) -> Result<bool> {
        self.say("\nAvailable platforms:").await?;
        for (i, platform) in Platform::ALL.iter().enumerate() {
            self.say(&format!("{}. {}", i + 1, platform.display_name())).await?;
        }

        let platform = loop {
            let Some(choice) = self.prompt("\nSelect platform (number): ").await? else {
                return Ok(false);
            };
            match choice.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                Some(index) if index < Platform::ALL.len() => break Platform::ALL[index],
                _ => self.say("Invalid choice. Please try again.").await?,
            }
        };

        let spec = platform.spec();
        self.say(&format!("\n{}", spec.help_text)).await?;
        self.say(&format!("Example: {}", spec.example_key)).await?;

        let Some(stream_key) = self.prompt_required("\nEnter your stream key: ", "stream key").await? else {
            return Ok(false);
        };

        let (mut server_url, mut app_name) = (String::new(), String::new());
        if platform.is_custom() {
            let Some(server) = self
                .prompt_required("Enter RTMP server URL (e.g., live.example.com): ", "server URL")
                .await?
            else {
                return Ok(false);
            };
            let Some(app) = self
                .prompt_required("Enter application name (e.g., live): ", "application name")
                .await?
            else {
                return Ok(false);
            };
            server_url = server;
            app_name = app;
        }

        let rtmp_url = match platform::render(platform.key(), &stream_key, &server_url, &app_name) {
            Ok(url) => url,
            Err(e) => {
                self.say(&format!("❌ {}", e)).await?;
                return Ok(true);
            }
        };
        let setup = platform::setup_fields(platform, &stream_key, &server_url, &app_name);

        self.say("\n✅ RTMP URL Generated!").await?;
        self.say(&format!("Platform: {}", platform.key().to_uppercase())).await?;
        self.say(&format!("Full RTMP URL: {}", rtmp_url)).await?;
        self.say("\n📹 OBS Setup (Settings -> Stream -> Service: Custom):").await?;
        self.say(&format!("Server: {}", setup.server)).await?;
        self.say(&format!("Stream Key: {}", setup.stream_key)).await?;
        self.say("\n🎬 vMix Setup (Stream -> Destination: Custom RTMP Server):").await?;
        self.say(&format!("URL: {}", setup.server)).await?;
        self.say(&format!("Stream Name or Key: {}", setup.stream_key)).await?;

        let Some(answer) = self.prompt("\nSave this configuration? (y/n): ").await? else {
            return Ok(false);
        };
        if !answer.eq_ignore_ascii_case("y") {
            return Ok(true);
        }

        let Some(name) = self.prompt("Enter configuration name: ").await? else {
            return Ok(false);
        };

        let saved = match StreamConfig::new(name, platform, stream_key, server_url, app_name) {
            Ok(config) => self.store.save(&config).await,
            Err(e) => Err(e),
        };
        match saved {
            Ok(path) => self.say(&format!("✅ Configuration saved to: {}", path.display())).await?,
            Err(e) => {
                error!("Failed to save configuration: {}", e);
                self.say(&format!("❌ Error saving configuration: {}", e)).await?;
            }
        }

        Ok(true)
    }

    async fn view_saved(&mut self) -> Result<()> {
        let configs = match self.store.load_all().await {
            Ok(configs) => configs,
            Err(e) => {
                error!("Failed to load configurations: {}", e);
                return self.say(&format!("❌ Error loading configurations: {}", e)).await;
            }
        };

        if configs.is_empty() {
            return self.say("\nNo saved configurations found.").await;
        }

        self.say("\n📁 Saved Configurations:").await?;
        for (i, config) in configs.iter().enumerate() {
            self.say(&format!("\n{}. {} ({})", i + 1, config.name(), config.platform_key())).await?;
            self.say(&format!("   RTMP URL: {}", config.rtmp_url())).await?;
        }
        Ok(())
    }

    /// Re-prompts until a non-empty answer is given.
    async fn prompt_required(&mut self, text: &str, field: &str) -> Result<Option<String>> {
        loop {
            match self.prompt(text).await? {
                Some(answer) if answer.is_empty() => {
                    self.say(&format!("❌ Please enter a {}", field)).await?;
                }
                other => return Ok(other),
            }
        }
    }

    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;

        let line = self.input.next_line().await?;
        debug!("Menu input received: {}", line.is_some());
        Ok(line.map(|l| l.trim().to_string()))
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}
