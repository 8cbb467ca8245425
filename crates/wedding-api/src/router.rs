use std::path::Path;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::{AppState, guests, invitation, wishes};

/// Build the site router. Every page and API route is served from the root
/// and, when a base path is configured, again under that prefix. Unmatched
/// paths fall through to static files in `public_dir`.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    let base_path = state.links.base_path.clone();

    let mut app = mount(Router::new(), "").route("/health", get(health));
    if !base_path.is_empty() {
        app = mount(app, &base_path).route(&format!("{}/", base_path), get(invitation::home));
    }

    app.fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn mount(router: Router<AppState>, prefix: &str) -> Router<AppState> {
    let home = if prefix.is_empty() { "/" } else { prefix };

    router
        .route(home, get(invitation::home))
        .route(
            &format!("{}/create-guest", prefix),
            get(guests::create_guest_page).post(guests::create_guest),
        )
        .route(&format!("{}/api/wish", prefix), post(wishes::submit))
}

async fn health() -> &'static str {
    "ok"
}
