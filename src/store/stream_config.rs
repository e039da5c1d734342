use crate::{
    error::{GeneratorError, Result},
    platform::{self, Platform, SetupFields},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, saved destination. Built only through [`StreamConfig::new`] so
/// that `rtmp_url` always matches the other fields.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    name: String,
    platform: String,
    stream_key: String,
    #[serde(default)]
    server_url: String,
    #[serde(default)]
    app_name: String,
    rtmp_url: String,
}

impl StreamConfig {
    pub fn new(
        name: impl Into<String>,
        platform: Platform,
        stream_key: impl Into<String>,
        server_url: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        let stream_key = stream_key.into();
        let server_url = server_url.into();
        let app_name = app_name.into();
        let rtmp_url = platform::render(platform.key(), &stream_key, &server_url, &app_name)?;

        Ok(Self {
            name,
            platform: platform.key().to_string(),
            stream_key,
            server_url,
            app_name,
            rtmp_url,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The platform key as stored, which may not be a known platform for
    /// files edited by hand.
    pub fn platform_key(&self) -> &str {
        &self.platform
    }

    pub fn stream_key(&self) -> &str {
        &self.stream_key
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn rtmp_url(&self) -> &str {
        &self.rtmp_url
    }

    pub fn platform(&self) -> Result<Platform> {
        self.platform.parse()
    }

    /// Whether the stored URL still matches a fresh render of the fields.
    pub fn is_consistent(&self) -> bool {
        platform::render(&self.platform, &self.stream_key, &self.server_url, &self.app_name)
            .map(|url| url == self.rtmp_url)
            .unwrap_or(false)
    }

    pub fn setup_fields(&self) -> Result<SetupFields> {
        Ok(platform::setup_fields(
            self.platform()?,
            &self.stream_key,
            &self.server_url,
            &self.app_name,
        ))
    }
}

// Stream keys are secrets; keep them out of logs.
impl fmt::Debug for StreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConfig")
            .field("name", &self.name)
            .field("platform", &self.platform)
            .field("stream_key", &"[REDACTED]")
            .field("server_url", &self.server_url)
            .field("app_name", &self.app_name)
            .field("rtmp_url", &"[REDACTED]")
            .finish()
    }
}

/// Names become file stems, so they must stay inside the store directory.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(GeneratorError::MissingField("name"));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(GeneratorError::InvalidName(name.to_string()));
    }
    Ok(())
}
