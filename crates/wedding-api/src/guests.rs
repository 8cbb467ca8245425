use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, header},
    response::{Html, IntoResponse},
};
use tracing::{info, warn};

use wedding_db::{Database, GuestInsert, models::GuestRow};
use wedding_types::api::{CreateGuestRequest, CreateGuestResponse};
use wedding_types::models::{Guest, IssuedGuest};

use crate::AppState;
use crate::error::{ApiError, run_blocking};
use crate::extract::JsonOrForm;
use crate::render::{AdminOutcome, AdminView};
use crate::token::generate_token;

/// How many fresh tokens to try before giving up on a collision streak.
pub const MAX_TOKEN_ATTEMPTS: usize = 5;

pub(crate) fn guest_from_row(row: GuestRow) -> Guest {
    Guest {
        name: row.name,
        token: row.link_hash,
        // Missing flag means the gift section is shown
        hide_gift: row.is_hide.unwrap_or(false),
    }
}

/// Return the guest registered under `name`, creating it with a new token
/// if there is none. Existing guests keep their token and flag; the
/// requested `hide_gift` only applies to newly created guests.
pub fn issue_or_fetch_guest_link(
    db: &Database,
    name: &str,
    hide_gift: bool,
) -> Result<IssuedGuest, ApiError> {
    issue_with(db, name, hide_gift, generate_token)
}

fn issue_with(
    db: &Database,
    name: &str,
    hide_gift: bool,
    mut next_token: impl FnMut() -> String,
) -> Result<IssuedGuest, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::InvalidInput("Name required".into()));
    }

    if let Some(row) = db.get_guest_by_name(name)? {
        return Ok(existing(row));
    }

    for attempt in 1..=MAX_TOKEN_ATTEMPTS {
        let token = next_token();
        match db.insert_guest(name, &token, hide_gift)? {
            GuestInsert::Inserted => {
                info!("Issued invitation for '{}'", name);
                return Ok(IssuedGuest {
                    name: name.to_string(),
                    hide_gift,
                    token,
                    is_existing: false,
                });
            }
            GuestInsert::NameTaken => {
                // Lost a race with a concurrent request for the same name
                let row = db.get_guest_by_name(name)?.ok_or_else(|| {
                    ApiError::Storage(format!("guest '{}' vanished after insert conflict", name))
                })?;
                return Ok(existing(row));
            }
            GuestInsert::TokenTaken => {
                warn!(
                    "Token collision for '{}' (attempt {}/{})",
                    name, attempt, MAX_TOKEN_ATTEMPTS
                );
            }
        }
    }

    Err(ApiError::Storage(format!(
        "could not allocate a unique invitation token after {} attempts",
        MAX_TOKEN_ATTEMPTS
    )))
}

fn existing(row: GuestRow) -> IssuedGuest {
    let guest = guest_from_row(row);
    info!("Guest '{}' already has an invitation", guest.name);
    IssuedGuest {
        name: guest.name,
        hide_gift: guest.hide_gift,
        token: guest.token,
        is_existing: true,
    }
}

fn host(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::HOST).and_then(|v| v.to_str().ok())
}

/// POST /create-guest: JSON (or form) issuance used by the admin page.
pub async fn create_guest(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonOrForm(req): JsonOrForm<CreateGuestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.unwrap_or_default();
    let hide_gift = req.is_hide;

    let db = state.clone();
    let issued =
        run_blocking(move || issue_or_fetch_guest_link(&db.db, &name, hide_gift)).await?;

    let link = state.links.invitation_link(host(&headers), &issued.token);
    Ok(Json(CreateGuestResponse {
        success: true,
        is_existing: issued.is_existing,
        name: issued.name,
        is_hide: issued.hide_gift,
        link,
    }))
}

/// GET /create-guest: the admin form. With `?name=` the issuance runs
/// inline and its outcome is rendered into the page. A malformed query is
/// shown as a failed outcome rather than a bare 400.
pub async fn create_guest_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<CreateGuestRequest>, QueryRejection>,
) -> Html<String> {
    let outcome = match query {
        Err(rejection) => {
            warn!("Rejected admin query: {}", rejection.body_text());
            Some(AdminOutcome::Failed(rejection.body_text()))
        }
        Ok(Query(CreateGuestRequest { name: None, .. })) => None,
        Ok(Query(CreateGuestRequest {
            name: Some(name),
            is_hide: hide_gift,
        })) => {
            let db = state.clone();
            let result =
                run_blocking(move || issue_or_fetch_guest_link(&db.db, &name, hide_gift)).await;

            Some(match result {
                Ok(guest) => {
                    let link = state.links.invitation_link(host(&headers), &guest.token);
                    AdminOutcome::Issued { guest, link }
                }
                Err(e) => {
                    warn!("Inline guest issuance failed: {}", e);
                    AdminOutcome::Failed(e.to_string())
                }
            })
        }
    };

    let view = AdminView {
        base_path: state.links.base_path.clone(),
        outcome,
    };
    Html(state.renderer.render_admin(&view))
}
