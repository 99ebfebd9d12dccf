use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub user_id: i32,
    pub title: String,
    pub message: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Admin request: a missing `user_id` broadcasts to every user.
#[derive(Debug, Clone, Deserialize)]
pub struct Create {
    pub user_id: Option<i32>,
    pub title: String,
    pub message: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Query {
    #[serde(skip)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub unread_only: bool,
    #[serde(skip)]
    pub now: Option<DateTime<Utc>>,
}
