//! Local HTTP stand-in for the narrator and artwork tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use tokio::net::TcpListener;

/// One request as the stand-in saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Clone)]
struct StandState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StandState {
    fn record(&self, entry: Recorded) {
        self.requests.lock().unwrap().push(entry);
    }
}

async fn chat_completions(
    State(state): State<StandState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.record(Recorded {
        path: "/chat/completions".to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).ok(),
    });
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

async fn artwork(State(state): State<StandState>, Path(file): Path<String>) -> (StatusCode, String) {
    state.record(Recorded {
        path: format!("/cards/{file}"),
        authorization: None,
        body: None,
    });
    (state.status, state.body.clone())
}

/// A running stand-in that answers every route with one status and body.
pub struct StandIn {
    pub base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StandIn {
    pub async fn start(status: u16, body: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StandState {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            requests: Arc::clone(&requests),
        };

        let app = Router::new()
            .route("/chat/completions", post(chat_completions))
            .route("/cards/:file", get(artwork))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base, requests }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}
