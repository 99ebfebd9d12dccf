use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Bank {
    pub id: i32,
    pub name: String,
    pub subject_id: Option<i32>,
    pub questions: Json<Value>,
    pub is_published: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BankSummary {
    pub id: i32,
    pub name: String,
    pub subject_id: Option<i32>,
    pub subject_name: Option<String>,
    pub question_count: i32,
    pub is_published: bool,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Insert {
    pub name: String,
    pub subject_id: Option<i32>,
    pub questions: Value,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    pub name: Option<String>,
    pub subject_id: Option<i32>,
    pub questions: Option<Value>,
    pub is_published: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Query {
    pub subject_id: Option<i32>,
    pub name: Option<String>,
    #[serde(skip)]
    pub published_only: bool,
    #[serde(skip)]
    pub active_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<Choice>,
    pub answer: Vec<String>,
    pub multiple: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Where a bank was loaded from; file banks have no database id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Database,
    File,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizedBank {
    pub id: Option<i32>,
    pub name: String,
    pub subject_id: Option<i32>,
    pub source: Source,
    pub questions: Vec<NormalizedQuestion>,
}
