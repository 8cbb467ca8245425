pub mod error;
pub mod extract;
pub mod guests;
pub mod invitation;
pub mod render;
pub mod router;
pub mod token;
pub mod wishes;

use std::sync::Arc;

use wedding_db::Database;

use crate::render::{HtmlRenderer, Renderer};

pub use error::ApiError;
pub use router::router;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub renderer: Box<dyn Renderer>,
    pub links: LinkConfig,
}

impl AppStateInner {
    pub fn new(db: Database, links: LinkConfig) -> AppState {
        Arc::new(Self {
            db,
            renderer: Box::new(HtmlRenderer),
            links,
        })
    }
}

/// Where the site is mounted and how invitation links are spelled.
#[derive(Debug, Clone, Default)]
pub struct LinkConfig {
    /// Sub-path the routes are also served under, e.g. `/myWedding`.
    /// Empty when served from the root.
    pub base_path: String,
    /// Absolute URL prefix for generated links. When unset the request's
    /// `Host` header is used together with `base_path`.
    pub public_url: Option<String>,
}

impl LinkConfig {
    pub fn invitation_link(&self, host: Option<&str>, token: &str) -> String {
        let base = match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}{}", host.unwrap_or("localhost"), self.base_path),
        };
        format!("{}/?to={}", base, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_uses_host_and_base_path() {
        let links = LinkConfig {
            base_path: "/myWedding".into(),
            public_url: None,
        };
        assert_eq!(
            links.invitation_link(Some("example.com"), "abc123"),
            "https://example.com/myWedding/?to=abc123"
        );
    }

    #[test]
    fn public_url_wins_over_host() {
        let links = LinkConfig {
            base_path: "/ignored".into(),
            public_url: Some("http://localhost:3000/".into()),
        };
        assert_eq!(
            links.invitation_link(Some("example.com"), "abc123"),
            "http://localhost:3000/?to=abc123"
        );
    }
}
