use super::{Platform, APP_NAME_PLACEHOLDER, SERVER_URL_PLACEHOLDER, STREAM_KEY_PLACEHOLDER};
use crate::error::{GeneratorError, Result};
use serde::Serialize;
use tracing::debug;

/// Server/key pair that OBS ("Server", "Stream Key") and vMix
/// ("URL", "Stream Name or Key") ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupFields {
    pub server: String,
    pub stream_key: String,
}

/// Render the RTMP URL for `platform`.
///
/// Values are substituted verbatim. `server_url` and `app_name` are only
/// read for the custom platform.
pub fn render(platform: &str, stream_key: &str, server_url: &str, app_name: &str) -> Result<String> {
    let platform: Platform = platform.parse()?;

    if stream_key.is_empty() {
        return Err(GeneratorError::MissingField("stream_key"));
    }

    let template = platform.spec().url_template;
    let url = if platform.is_custom() {
        if server_url.is_empty() {
            return Err(GeneratorError::MissingField("server_url"));
        }
        if app_name.is_empty() {
            return Err(GeneratorError::MissingField("app_name"));
        }
        fill_template(
            template,
            &[
                (SERVER_URL_PLACEHOLDER, server_url),
                (APP_NAME_PLACEHOLDER, app_name),
                (STREAM_KEY_PLACEHOLDER, stream_key),
            ],
        )
    } else {
        fill_template(template, &[(STREAM_KEY_PLACEHOLDER, stream_key)])
    };

    debug!("Rendered RTMP URL for platform: {}", platform);
    Ok(url)
}

/// Single left-to-right pass over `template`. Inserted values are never
/// scanned again, so braces inside them stay literal.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };

        let placeholder = &tail[..=end];
        match values.iter().find(|(name, _)| *name == placeholder) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(placeholder),
        }
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    out
}

pub fn server_and_app_name<'a>(
    platform: Platform,
    server_url: &'a str,
    app_name: &'a str,
) -> (&'a str, &'a str) {
    if platform.is_custom() {
        (server_url, app_name)
    } else {
        let spec = platform.spec();
        (spec.default_server, spec.default_app_name)
    }
}

pub fn setup_fields(platform: Platform, stream_key: &str, server_url: &str, app_name: &str) -> SetupFields {
    let (server, app) = server_and_app_name(platform, server_url, app_name);
    SetupFields {
        server: format!("rtmp://{}/{}", server, app),
        stream_key: stream_key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_twitch() {
        assert_eq!(
            render("twitch", "mykey123", "", "").unwrap(),
            "rtmp://live.twitch.tv/app/mykey123"
        );
    }

    #[test]
    fn renders_custom() {
        assert_eq!(
            render("custom", "abc", "host.example.com", "live").unwrap(),
            "rtmp://host.example.com/live/abc"
        );
    }

    #[test]
    fn every_platform_embeds_the_key() {
        for platform in Platform::ALL {
            let url = render(platform.key(), "s3cr3t?x=1", "h.example", "app").unwrap();
            assert!(url.starts_with("rtmp://"), "{}", url);
            assert!(url.contains("s3cr3t?x=1"), "{}", url);
        }
    }

    #[test]
    fn inserted_values_are_not_expanded_again() {
        assert_eq!(
            render("custom", "KEY", "host{stream_key}", "live{server_url}").unwrap(),
            "rtmp://host{stream_key}/live{server_url}/KEY"
        );
        assert_eq!(
            render("twitch", "{app_name}", "", "").unwrap(),
            "rtmp://live.twitch.tv/app/{app_name}"
        );
    }

    #[test]
    fn fill_template_keeps_unknown_and_unclosed_braces() {
        assert_eq!(
            fill_template("a{x}b{stream_key}c{", &[("{stream_key}", "K")]),
            "a{x}bKc{"
        );
    }

    #[test]
    fn platform_keys_must_match_exactly() {
        for key in ["Twitch", " youtube ", "CUSTOM"] {
            assert!(
                matches!(render(key, "k", "h", "a"), Err(GeneratorError::UnknownPlatform(_))),
                "{:?}",
                key
            );
        }
    }

    #[test]
    fn non_custom_ignores_server_and_app() {
        assert_eq!(
            render("youtube", "k", "ignored", "ignored").unwrap(),
            "rtmp://a.rtmp.youtube.com/live2/k"
        );
    }

    #[test]
    fn empty_stream_key_is_missing_field() {
        for platform in Platform::ALL {
            let err = render(platform.key(), "", "h", "a").unwrap_err();
            assert!(matches!(err, GeneratorError::MissingField("stream_key")));
        }
    }

    #[test]
    fn custom_requires_server_and_app() {
        assert!(matches!(
            render("custom", "k", "", "app"),
            Err(GeneratorError::MissingField("server_url"))
        ));
        assert!(matches!(
            render("custom", "k", "host", ""),
            Err(GeneratorError::MissingField("app_name"))
        ));
    }

    #[test]
    fn unknown_platform_is_rejected() {
        assert!(matches!(
            render("bogus", "k", "", ""),
            Err(GeneratorError::UnknownPlatform(_))
        ));
    }

    #[test]
    fn server_and_app_name_uses_defaults_except_for_custom() {
        assert_eq!(
            server_and_app_name(Platform::Twitch, "x", "y"),
            ("live.twitch.tv", "app")
        );
        assert_eq!(
            server_and_app_name(Platform::Custom, "x", "y"),
            ("x", "y")
        );
    }

    #[test]
    fn setup_fields_strip_the_key() {
        let fields = setup_fields(Platform::Facebook, "k", "", "");
        assert_eq!(fields.server, "rtmp://live-api-s.facebook.com:80/rtmp");
        assert_eq!(fields.stream_key, "k");

        let custom = setup_fields(Platform::Custom, "k", "host.example.com", "live");
        assert_eq!(custom.server, "rtmp://host.example.com/live");
    }
}
