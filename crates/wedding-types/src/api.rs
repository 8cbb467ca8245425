use serde::{Deserialize, Serialize};

use crate::flag;

// -- Home --

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub to: Option<String>,
}

// -- Guests --

/// Body of `POST /create-guest`, also used as the query of the
/// server-rendered `GET /create-guest?name=`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGuestRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flag::deserialize")]
    pub is_hide: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGuestResponse {
    pub success: bool,
    pub is_existing: bool,
    pub name: String,
    #[serde(serialize_with = "flag::serialize")]
    pub is_hide: bool,
    pub link: String,
}

// -- Wishes --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitWishRequest {
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub attendance: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

// -- Shared --

/// `{success, message}` envelope used by the wish endpoint and by every
/// error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_guest_accepts_numeric_flag() {
        let req: CreateGuestRequest =
            serde_json::from_str(r#"{"name":"Budi & Partner","isHide":1}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Budi & Partner"));
        assert!(req.is_hide);
    }

    #[test]
    fn create_guest_accepts_bool_and_missing_flag() {
        let req: CreateGuestRequest =
            serde_json::from_str(r#"{"name":"Ana","isHide":false}"#).unwrap();
        assert!(!req.is_hide);

        let req: CreateGuestRequest = serde_json::from_str(r#"{"name":"Ana"}"#).unwrap();
        assert!(!req.is_hide);

        let req: CreateGuestRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.name.is_none());
    }

    #[test]
    fn create_guest_rejects_garbage_flag() {
        let res = serde_json::from_str::<CreateGuestRequest>(r#"{"name":"Ana","isHide":"maybe"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn response_serializes_flag_as_integer() {
        let body = serde_json::to_value(CreateGuestResponse {
            success: true,
            is_existing: false,
            name: "Alice".into(),
            is_hide: true,
            link: "https://example.com/?to=abc".into(),
        })
        .unwrap();

        assert_eq!(body["isHide"], 1);
        assert_eq!(body["isExisting"], false);
        assert_eq!(body["link"], "https://example.com/?to=abc");
    }

    #[test]
    fn wish_request_uses_camel_case() {
        let req: SubmitWishRequest = serde_json::from_str(
            r#"{"senderName":"Bob","attendance":"yes","content":"Congrats!"}"#,
        )
        .unwrap();
        assert_eq!(req.sender_name.as_deref(), Some("Bob"));
        assert_eq!(req.attendance.as_deref(), Some("yes"));
        assert_eq!(req.content.as_deref(), Some("Congrats!"));
    }
}
