use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
    pub streak: i32,
    pub max_streak: i32,
    pub last_login: Option<NaiveDate>,
    pub notify_email: bool,
    pub notify_site: bool,
    pub created_at: DateTime<Utc>,
}

/// The public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub streak: i32,
    pub max_streak: i32,
    pub last_login: Option<NaiveDate>,
    pub notify_email: bool,
    pub notify_site: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for Profile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            is_admin: u.is_admin,
            streak: u.streak,
            max_streak: u.max_streak,
            last_login: u.last_login,
            notify_email: u.notify_email,
            notify_site: u.notify_site,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default)]
pub struct Patch {
    pub password: Option<String>,
    pub is_admin: Option<bool>,
    pub streak: Option<i32>,
    pub max_streak: Option<i32>,
    pub last_login: Option<NaiveDate>,
    pub notify_email: Option<bool>,
    pub notify_site: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Query {
    pub name_like: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Preferences {
    pub notify_email: Option<bool>,
    pub notify_site: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claim {
    pub user: String,
    pub exp: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: Profile,
}
