use crate::{
    config::Config,
    error::GeneratorError,
    platform::{self, Platform, PLATFORMS},
    store::{ConfigStore, StreamConfig},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::{error, info, warn};
use warp::{http::StatusCode, Filter};

mod page;

use page::{render_page, validation_message, FormState, Outcome};

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub struct HttpServer {
    config: Config,
}

#[derive(Debug, Deserialize)]
struct IndexQuery {
    load: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateForm {
    platform: String,
    stream_key: String,
    server_url: String,
    app_name: String,
    config_name: String,
}

#[derive(Debug, Deserialize)]
struct RenderRequest {
    platform: String,
    stream_key: String,
    #[serde(default)]
    server_url: String,
    #[serde(default)]
    app_name: String,
}

#[derive(Debug, Serialize)]
struct RenderResponse {
    rtmp_url: String,
    server: String,
    stream_key: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl HttpServer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn start(&self) {
        info!("HTTP server listening on port {}", self.config.http_port);
        info!("Open http://localhost:{}/ to generate RTMP URLs", self.config.http_port);

        warp::serve(self.routes())
            .run(([0, 0, 0, 0], self.config.http_port))
            .await;
    }

    pub fn routes(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let store = ConfigStore::new(self.config.clone());

        let index = warp::path::end()
            .and(warp::get())
            .and(warp::query::<IndexQuery>())
            .and(with_store(store.clone()))
            .and_then(index_page);

        let generate = warp::path("generate")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::form::<GenerateForm>())
            .and(with_store(store.clone()))
            .and_then(generate_page);

        let platforms = warp::path!("api" / "platforms")
            .and(warp::get())
            .map(|| warp::reply::json(&PLATFORMS));

        let configs = warp::path!("api" / "configs")
            .and(warp::get())
            .and(with_store(store))
            .and_then(list_configs);

        let render = warp::path!("api" / "render")
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::json::<RenderRequest>())
            .and_then(render_url);

        index
            .or(generate)
            .or(platforms)
            .or(configs)
            .or(render)
            .with(warp::trace::request())
    }
}

fn with_store(store: ConfigStore) -> impl Filter<Extract = (ConfigStore,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

async fn saved_configs(store: &ConfigStore) -> Vec<StreamConfig> {
    store.load_all().await.unwrap_or_else(|e| {
        error!("Failed to list saved configurations: {}", e);
        Vec::new()
    })
}

async fn index_page(query: IndexQuery, store: ConfigStore) -> Result<impl warp::Reply, Infallible> {
    let (form, outcome) = match query.load.as_deref() {
        None => (FormState::default(), None),
        Some(name) => match store.load(name).await {
            Ok(Some(config)) => match FormState::try_from(&config) {
                Ok(form) => {
                    info!("Loaded configuration '{}' into the form", name);
                    (form, Some(Outcome::Notice(format!("Loaded '{}'", name))))
                }
                Err(e) => {
                    warn!("Configuration '{}' cannot be loaded into the form: {}", name, e);
                    (FormState::default(), Some(Outcome::Invalid(e.to_string())))
                }
            },
            Ok(None) => (
                FormState::default(),
                Some(Outcome::Invalid(format!("No saved configuration named '{}'", name))),
            ),
            Err(e) => {
                warn!("Failed to load configuration '{}': {}", name, e);
                (FormState::default(), Some(Outcome::Invalid(e.to_string())))
            }
        },
    };

    let configs = saved_configs(&store).await;
    Ok(page_reply(render_page(&form, outcome.as_ref(), &configs)))
}

async fn generate_page(form: GenerateForm, store: ConfigStore) -> Result<impl warp::Reply, Infallible> {
    let platform = form.platform.parse::<Platform>();
    let state = FormState {
        platform: platform.as_ref().copied().unwrap_or(Platform::Twitch),
        stream_key: form.stream_key,
        server_url: form.server_url,
        app_name: form.app_name,
        config_name: form.config_name.trim().to_string(),
    };

    let outcome = match platform {
        Err(e) => Outcome::Invalid(validation_message(&e)),
        Ok(platform) => generate(platform, &state, &store).await,
    };

    let configs = saved_configs(&store).await;
    Ok(page_reply(render_page(&state, Some(&outcome), &configs)))
}

async fn generate(platform: Platform, state: &FormState, store: &ConfigStore) -> Outcome {
    let rtmp_url = match platform::render(platform.key(), &state.stream_key, &state.server_url, &state.app_name) {
        Ok(url) => url,
        Err(e) => return Outcome::Invalid(validation_message(&e)),
    };
    let setup = platform::setup_fields(platform, &state.stream_key, &state.server_url, &state.app_name);

    let saved = if state.config_name.is_empty() {
        None
    } else {
        let result = match StreamConfig::new(
            state.config_name.clone(),
            platform,
            state.stream_key.clone(),
            state.server_url.clone(),
            state.app_name.clone(),
        ) {
            Ok(config) => store.save(&config).await,
            Err(e) => Err(e),
        };
        Some(match result {
            Ok(_) => Ok(state.config_name.clone()),
            Err(e) => {
                error!("Failed to save configuration '{}': {}", state.config_name, e);
                Err(e.to_string())
            }
        })
    };

    Outcome::Generated { rtmp_url, setup, saved }
}

async fn list_configs(store: ConfigStore) -> Result<impl warp::Reply, Infallible> {
    let reply = match store.load_all().await {
        Ok(configs) => warp::reply::with_status(warp::reply::json(&configs), StatusCode::OK),
        Err(e) => {
            error!("Failed to list saved configurations: {}", e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    };
    Ok(reply)
}

async fn render_url(request: RenderRequest) -> Result<impl warp::Reply, Infallible> {
    let rendered = request.platform.parse::<Platform>().and_then(|platform| {
        let rtmp_url = platform::render(platform.key(), &request.stream_key, &request.server_url, &request.app_name)?;
        let setup = platform::setup_fields(platform, &request.stream_key, &request.server_url, &request.app_name);
        Ok(RenderResponse {
            rtmp_url,
            server: setup.server,
            stream_key: setup.stream_key,
        })
    });

    let reply = match rendered {
        Ok(response) => warp::reply::with_status(warp::reply::json(&response), StatusCode::OK),
        Err(e) => error_reply(StatusCode::BAD_REQUEST, &e),
    };
    Ok(reply)
}

fn page_reply(page: askama::Result<String>) -> warp::reply::WithStatus<warp::reply::Html<String>> {
    match page {
        Ok(html) => warp::reply::with_status(warp::reply::html(html), StatusCode::OK),
        Err(e) => {
            error!("Failed to render page: {}", e);
            warp::reply::with_status(
                warp::reply::html("Internal server error".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

fn error_reply(status: StatusCode, err: &GeneratorError) -> warp::reply::WithStatus<warp::reply::Json> {
    let body = ErrorResponse { error: err.to_string() };
    warp::reply::with_status(warp::reply::json(&body), status)
}
