use crate::error::GeneratorError;
use serde::Serialize;
use std::{fmt, str::FromStr};

mod render;

pub use render::{render, server_and_app_name, setup_fields, SetupFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Twitch,
    Youtube,
    Facebook,
    Custom,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Twitch,
        Platform::Youtube,
        Platform::Facebook,
        Platform::Custom,
    ];

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn spec(self) -> &'static PlatformSpec {
        match self {
            Platform::Twitch => &PLATFORMS[0],
            Platform::Youtube => &PLATFORMS[1],
            Platform::Facebook => &PLATFORMS[2],
            Platform::Custom => &PLATFORMS[3],
        }
    }

    pub fn is_custom(self) -> bool {
        self == Platform::Custom
    }

    /// Accepts keys with surrounding whitespace and any ASCII case, for
    /// typed input. Lookups through [`FromStr`] require the exact key.
    pub fn parse_lenient(input: &str) -> Result<Self, GeneratorError> {
        let wanted = input.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GeneratorError::UnknownPlatform(input.to_string()))
    }

    /// Capitalised label used by the menus ("Twitch", "Youtube", ...).
    pub fn display_name(self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl FromStr for Platform {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| GeneratorError::UnknownPlatform(s.to_string()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformSpec {
    pub key: &'static str,
    pub url_template: &'static str,
    pub help_text: &'static str,
    pub default_server: &'static str,
    pub default_app_name: &'static str,
    pub example_key: &'static str,
}

/// Placeholders recognised in `url_template`.
pub const STREAM_KEY_PLACEHOLDER: &str = "{stream_key}";
pub const SERVER_URL_PLACEHOLDER: &str = "{server_url}";
pub const APP_NAME_PLACEHOLDER: &str = "{app_name}";

pub static PLATFORMS: [PlatformSpec; 4] = [
    PlatformSpec {
        key: "twitch",
        url_template: "rtmp://live.twitch.tv/app/{stream_key}",
        help_text: "Get stream key from Twitch Dashboard -> Settings -> Stream",
        default_server: "live.twitch.tv",
        default_app_name: "app",
        example_key: "live_123456789_abcdefghij",
    },
    PlatformSpec {
        key: "youtube",
        url_template: "rtmp://a.rtmp.youtube.com/live2/{stream_key}",
        help_text: "Get stream key from YouTube Studio -> Go Live -> Create Stream",
        default_server: "a.rtmp.youtube.com",
        default_app_name: "live2",
        example_key: "xxxx-xxxx-xxxx-xxxx",
    },
    PlatformSpec {
        key: "facebook",
        url_template: "rtmp://live-api-s.facebook.com:80/rtmp/{stream_key}",
        help_text: "Get stream key from Facebook Live API",
        default_server: "live-api-s.facebook.com:80",
        default_app_name: "rtmp",
        example_key: "123456789012345?ds=1",
    },
    PlatformSpec {
        key: "custom",
        url_template: "rtmp://{server_url}/{app_name}/{stream_key}",
        help_text: "Enter custom RTMP server details",
        default_server: "your-server.com",
        default_app_name: "app",
        example_key: "your_stream_key",
    },
];
