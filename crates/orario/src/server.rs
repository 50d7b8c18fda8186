use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::calendar::{self, Locale};
use crate::html;
use crate::schedule::{LoadState, WeekGrid, WeeklyScheduleView};
use crate::source::SessionSource;
use crate::types::{Session, SessionId, TypeFilter};

/// Page controller state: owns the one schedule view behind the page.
///
/// Every browser talking to this server shares that view, so navigation,
/// filter and open detail are the same for all visitors.
pub struct AppState {
    pub view: RwLock<WeeklyScheduleView>,
}

impl AppState {
    pub fn new(view: WeeklyScheduleView) -> Self {
        Self {
            view: RwLock::new(view),
        }
    }
}

/// Start the web server and kick off the initial session load
pub async fn serve<S>(port: u16, source: S, locale: Locale) -> anyhow::Result<()>
where
    S: SessionSource + Send + Sync + 'static,
{
    let state = Arc::new(AppState::new(WeeklyScheduleView::new(
        calendar::today(),
        locale,
    )));

    let loader_state = state.clone();
    tokio::spawn(async move {
        load_into(&loader_state, &source).await;
    });

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Server running at http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Fetch the snapshot without holding the view lock, then apply it
pub async fn load_into<S: SessionSource>(state: &AppState, source: &S) {
    let result = source.fetch_sessions().await;
    state.view.write().await.finish_load(result);
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/week/previous", post(previous_week_handler))
        .route("/week/next", post(next_week_handler))
        .route("/week/current", post(current_week_handler))
        .route("/filter/{filter}", post(filter_handler))
        .route("/sessions/open", post(open_detail_handler))
        .route("/sessions/close", post(close_detail_handler))
        .route("/api/sessions", get(sessions_handler))
        .route("/api/week", get(week_handler))
        .with_state(state)
}

/// Serve the schedule page
async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let view = state.view.read().await;
    let markup = html::render_page(&view, calendar::today());
    Html(markup.into_string())
}

async fn previous_week_handler(State(state): State<Arc<AppState>>) -> Redirect {
    state.view.write().await.go_to_previous_week();
    Redirect::to("/")
}

async fn next_week_handler(State(state): State<Arc<AppState>>) -> Redirect {
    state.view.write().await.go_to_next_week();
    Redirect::to("/")
}

async fn current_week_handler(State(state): State<Arc<AppState>>) -> Redirect {
    state.view.write().await.go_to_week_of(calendar::today());
    Redirect::to("/")
}

async fn filter_handler(
    State(state): State<Arc<AppState>>,
    Path(filter): Path<String>,
) -> Result<Redirect, AppError> {
    let filter: TypeFilter = filter.parse().map_err(AppError::bad_request)?;
    state.view.write().await.set_type_filter(filter);
    Ok(Redirect::to("/"))
}

/// Session ids are opaque, so they travel in the form body rather than the path
#[derive(Debug, Deserialize)]
struct OpenDetailForm {
    id: String,
}

async fn open_detail_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<OpenDetailForm>,
) -> Redirect {
    state
        .view
        .write()
        .await
        .open_session_detail(&SessionId::new(form.id));
    Redirect::to("/")
}

async fn close_detail_handler(State(state): State<Arc<AppState>>) -> Redirect {
    state.view.write().await.close_session_detail();
    Redirect::to("/")
}

/// Return the session snapshot as JSON
async fn sessions_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Session>> {
    let view = state.view.read().await;
    Json(view.sessions().to_vec())
}

#[derive(Debug, Serialize)]
struct WeekResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    week: WeekGrid,
}

/// Return the derived grid of the displayed week as JSON
async fn week_handler(State(state): State<Arc<AppState>>) -> Json<WeekResponse> {
    let view = state.view.read().await;
    let error = match view.load_state() {
        LoadState::Failed(err) => Some(err.to_string()),
        LoadState::Loading | LoadState::Loaded => None,
    };
    Json(WeekResponse {
        status: view.load_state().as_str(),
        error,
        week: view.render_week(calendar::today()),
    })
}

#[derive(Debug)]
struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
