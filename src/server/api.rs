use crate::llm::completion::CompletionClient;
use crate::llm::ModelChoice;
use crate::models::api::{ ModelsResponse, QueryRequest, QueryResponse };
use std::error::Error;
use std::net::SocketAddr;
use axum::{
    routing::{ get, post },
    Router,
    extract::State,
    Json,
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Clone)]
pub struct AppState {
    pub client: CompletionClient,
    pub model: ModelChoice,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/models", get(models_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    addr: SocketAddr,
    state: AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(state);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
            return Err(e.into());
        }
    };
    info!("HTTP server listening on: http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Pass-through to the completion client; the query is not validated.
async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let response = state.client.complete(&req.query, state.model).await.into_display_text();
    Json(QueryResponse { response })
}

async fn models_handler(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        active: state.model.id().to_string(),
        available: ModelChoice::ALL.iter().map(|m| m.id().to_string()).collect(),
    })
}

async fn health_handler() -> &'static str {
    "ok"
}
