use crate::{
    error::GeneratorError,
    platform::{Platform, SetupFields},
    store::StreamConfig,
};
use askama::Template;

/// Values shown in the form inputs. Built either from a submitted form or
/// from a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub platform: Platform,
    pub stream_key: String,
    pub server_url: String,
    pub app_name: String,
    pub config_name: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            platform: Platform::Twitch,
            stream_key: String::new(),
            server_url: String::new(),
            app_name: String::new(),
            config_name: String::new(),
        }
    }
}

impl TryFrom<&StreamConfig> for FormState {
    type Error = GeneratorError;

    fn try_from(config: &StreamConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            platform: config.platform()?,
            stream_key: config.stream_key().to_string(),
            server_url: config.server_url().to_string(),
            app_name: config.app_name().to_string(),
            config_name: config.name().to_string(),
        })
    }
}

#[derive(Debug)]
pub enum Outcome {
    Generated {
        rtmp_url: String,
        setup: SetupFields,
        saved: Option<Result<String, String>>,
    },
    Invalid(String),
    Notice(String),
}

/// User-facing wording for validation failures.
pub fn validation_message(err: &GeneratorError) -> String {
    match err {
        GeneratorError::MissingField("stream_key") => "Please enter a stream key".to_string(),
        GeneratorError::MissingField("server_url") | GeneratorError::MissingField("app_name") => {
            "Please enter server URL and application name".to_string()
        }
        other => other.to_string(),
    }
}

#[derive(Template)]
#[template(path = "index.html", escape = "html")]
struct IndexTemplate<'a> {
    form: &'a FormState,
    platforms: Vec<PlatformOption>,
    saved: Vec<SavedEntry>,
    error: Option<String>,
    notice: Option<String>,
    result: Option<ResultView>,
}

struct PlatformOption {
    key: &'static str,
    label: String,
    help_text: &'static str,
    default_server: String,
    selected: bool,
}

struct SavedEntry {
    name: String,
    platform: String,
    rtmp_url: String,
    load_query: String,
}

struct ResultView {
    rtmp_url: String,
    server: String,
    stream_key: String,
    saved_as: Option<String>,
    save_error: Option<String>,
}

pub fn render_page(
    form: &FormState,
    outcome: Option<&Outcome>,
    configs: &[StreamConfig],
) -> askama::Result<String> {
    let platforms = Platform::ALL
        .into_iter()
        .map(|platform| {
            let spec = platform.spec();
            PlatformOption {
                key: spec.key,
                label: platform.display_name(),
                help_text: spec.help_text,
                default_server: format!("rtmp://{}/{}", spec.default_server, spec.default_app_name),
                selected: platform == form.platform,
            }
        })
        .collect();

    let saved = configs
        .iter()
        .map(|config| SavedEntry {
            name: config.name().to_string(),
            platform: config.platform_key().to_string(),
            rtmp_url: config.rtmp_url().to_string(),
            load_query: urlencoding::encode(config.name()).into_owned(),
        })
        .collect();

    let mut template = IndexTemplate {
        form,
        platforms,
        saved,
        error: None,
        notice: None,
        result: None,
    };

    match outcome {
        Some(Outcome::Invalid(message)) => template.error = Some(message.clone()),
        Some(Outcome::Notice(message)) => template.notice = Some(message.clone()),
        Some(Outcome::Generated { rtmp_url, setup, saved }) => {
            template.result = Some(ResultView {
                rtmp_url: rtmp_url.clone(),
                server: setup.server.clone(),
                stream_key: setup.stream_key.clone(),
                saved_as: saved.as_ref().and_then(|r| r.as_ref().ok().cloned()),
                save_error: saved.as_ref().and_then(|r| r.as_ref().err().cloned()),
            });
        }
        None => {}
    }

    template.render()
}
