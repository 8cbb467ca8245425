use axum::{Json, extract::State, response::IntoResponse};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use tracing::{info, warn};

use wedding_db::{Database, models::WishRow};
use wedding_types::api::{StatusResponse, SubmitWishRequest};
use wedding_types::models::{NewWish, Wish};

use crate::AppState;
use crate::error::{ApiError, run_blocking};
use crate::extract::JsonOrForm;

/// Validate and append a guestbook entry stamped with the current time.
pub fn submit_wish(db: &Database, wish: NewWish) -> Result<Wish, ApiError> {
    submit_wish_at(db, wish, Utc::now())
}

fn submit_wish_at(db: &Database, wish: NewWish, now: DateTime<Utc>) -> Result<Wish, ApiError> {
    // Stored with millisecond precision
    let now = now.trunc_subsecs(3);
    if wish.sender_name.trim().is_empty() || wish.content.trim().is_empty() {
        return Err(ApiError::InvalidInput("Data incomplete".into()));
    }
    let attendance = wish.attendance.filter(|a| !a.trim().is_empty());

    let id = db.insert_wish(
        &wish.sender_name,
        attendance.as_deref(),
        &wish.content,
        &format_timestamp(now),
    )?;
    info!("Wish {} saved from '{}'", id, wish.sender_name);

    Ok(Wish {
        id,
        sender_name: wish.sender_name,
        attendance,
        content: wish.content,
        created_at: now,
    })
}

/// All wishes, newest first.
pub fn list_wishes(db: &Database) -> Result<Vec<Wish>, ApiError> {
    Ok(db.list_wishes()?.into_iter().map(wish_from_row).collect())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn wish_from_row(row: WishRow) -> Wish {
    let created_at = row
        .created_at
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by hand may use SQLite's "YYYY-MM-DD HH:MM:SS".
            // Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on wish {}: {}", row.created_at, row.id, e);
            DateTime::default()
        });

    Wish {
        id: row.id,
        sender_name: row.sender_name,
        attendance: row.attendance,
        content: row.content,
        created_at,
    }
}

/// POST /api/wish
pub async fn submit(
    State(state): State<AppState>,
    JsonOrForm(req): JsonOrForm<SubmitWishRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let wish = NewWish {
        sender_name: req.sender_name.unwrap_or_default(),
        attendance: req.attendance,
        content: req.content.unwrap_or_default(),
    };

    let db = state.clone();
    run_blocking(move || submit_wish(&db.db, wish)).await?;

    Ok(Json(StatusResponse::ok("Wish saved")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_wish(sender: &str, attendance: Option<&str>, content: &str) -> NewWish {
        NewWish {
            sender_name: sender.into(),
            attendance: attendance.map(Into::into),
            content: content.into(),
        }
    }

    #[test]
    fn incomplete_wish_is_rejected_without_write() {
        let db = Database::open_in_memory().unwrap();

        for wish in [
            new_wish("", Some("yes"), "Congrats!"),
            new_wish("Bob", Some("yes"), ""),
            new_wish("  ", None, "  "),
        ] {
            let err = submit_wish(&db, wish).unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(ref m) if m == "Data incomplete"));
        }
        assert_eq!(db.count_wishes().unwrap(), 0);
    }

    #[test]
    fn listing_is_reverse_chronological() {
        let db = Database::open_in_memory().unwrap();
        for (second, sender) in [(1, "W1"), (2, "W2"), (3, "W3")] {
            let at = Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, second).unwrap();
            submit_wish_at(&db, new_wish(sender, None, "hi"), at).unwrap();
        }

        let senders: Vec<String> = list_wishes(&db)
            .unwrap()
            .into_iter()
            .map(|w| w.sender_name)
            .collect();
        assert_eq!(senders, vec!["W3", "W2", "W1"]);
    }

    #[test]
    fn latest_wish_is_listed_first() {
        let db = Database::open_in_memory().unwrap();
        let earlier = Utc::now() - chrono::Duration::minutes(5);
        submit_wish_at(&db, new_wish("Alice", Some("no"), "Best wishes"), earlier).unwrap();

        let saved = submit_wish(&db, new_wish("Bob", Some("yes"), "Congrats!")).unwrap();

        let wishes = list_wishes(&db).unwrap();
        assert_eq!(wishes.len(), 2);
        assert_eq!(wishes[0], saved);
        assert_eq!(wishes[0].attendance.as_deref(), Some("yes"));
    }

    #[test]
    fn blank_attendance_is_stored_as_none() {
        let db = Database::open_in_memory().unwrap();
        let saved = submit_wish(&db, new_wish("Bob", Some("  "), "Congrats!")).unwrap();
        assert_eq!(saved.attendance, None);
        assert_eq!(list_wishes(&db).unwrap()[0].attendance, None);
    }

    #[test]
    fn text_is_stored_as_given() {
        let db = Database::open_in_memory().unwrap();
        let saved = submit_wish(&db, new_wish(" Bob ", Some(" yes"), "  Congrats!\n")).unwrap();
        assert_eq!(saved.sender_name, " Bob ");
        assert_eq!(saved.content, "  Congrats!\n");

        let listed = &list_wishes(&db).unwrap()[0];
        assert_eq!(listed.sender_name, " Bob ");
        assert_eq!(listed.attendance.as_deref(), Some(" yes"));
        assert_eq!(listed.content, "  Congrats!\n");
    }

    #[test]
    fn sqlite_style_timestamps_are_understood() {
        let db = Database::open_in_memory().unwrap();
        db.insert_wish("Old", None, "from before", "2025-12-31 23:59:59").unwrap();

        let wish = &list_wishes(&db).unwrap()[0];
        assert_eq!(wish.created_at, Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap());
    }
}
