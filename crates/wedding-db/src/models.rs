/// Database row types. These map directly to SQLite rows and stay
/// independent of the wedding-types models.

pub struct GuestRow {
    pub id: i64,
    pub name: String,
    pub link_hash: String,
    /// NULL on rows written before the column had a default.
    pub is_hide: Option<bool>,
    pub created_at: String,
}

pub struct WishRow {
    pub id: i64,
    pub sender_name: String,
    pub attendance: Option<String>,
    pub content: String,
    pub created_at: String,
}
