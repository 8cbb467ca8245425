use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Html,
};
use tracing::{debug, error};

use wedding_db::Database;
use wedding_types::api::HomeQuery;
use wedding_types::models::ResolvedGuest;

use crate::AppState;
use crate::error::run_blocking;
use crate::guests::guest_from_row;
use crate::render::HomeView;
use crate::wishes::list_wishes;

/// Map an invitation token to what the home page shows. Missing, unknown
/// and unreadable tokens all fall back to the generic visitor; this never
/// fails.
pub fn resolve_guest(db: &Database, token: Option<&str>) -> ResolvedGuest {
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return ResolvedGuest::default();
    };

    match db.get_guest_by_link_hash(token) {
        Ok(Some(row)) => guest_from_row(row).into(),
        Ok(None) => {
            debug!("Unknown invitation token '{}'", token);
            ResolvedGuest::default()
        }
        Err(e) => {
            error!("Guest lookup failed for token '{}': {}", token, e);
            ResolvedGuest::default()
        }
    }
}

/// GET /: the invitation page. A query string that does not parse renders
/// the visitor page.
pub async fn home(
    State(state): State<AppState>,
    query: Result<Query<HomeQuery>, QueryRejection>,
) -> Html<String> {
    let query = query.map(|Query(q)| q).unwrap_or_else(|e| {
        debug!("Ignoring unreadable home query: {}", e.body_text());
        HomeQuery::default()
    });

    let db = state.clone();
    let loaded = run_blocking(move || {
        let guest = resolve_guest(&db.db, query.to.as_deref());
        let wishes = list_wishes(&db.db).unwrap_or_else(|e| {
            error!("Wish retrieval failed: {}", e);
            Vec::new()
        });
        Ok((guest, wishes))
    })
    .await;

    let (guest, wishes) = loaded.unwrap_or_else(|_| (ResolvedGuest::default(), Vec::new()));

    let view = HomeView {
        guest,
        wishes,
        base_path: state.links.base_path.clone(),
    };
    Html(state.renderer.render_home(&view))
}
