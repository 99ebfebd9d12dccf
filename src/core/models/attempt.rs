use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;

/// A submitted answer: one letter, or several for multi-answer questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    One(String),
    Many(Vec<String>),
}

impl Selection {
    pub fn letters(&self) -> Vec<String> {
        let raw: Vec<&String> = match self {
            Selection::One(s) => vec![s],
            Selection::Many(v) => v.iter().collect(),
        };
        raw.into_iter().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Submit {
    pub bank: String,
    #[serde(default)]
    pub answers: HashMap<String, Selection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    pub correct: i32,
    pub incorrect: i32,
    pub unanswered: i32,
    pub total: i32,
    pub points: f64,
    pub percentage: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attempt {
    pub id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
    pub bank_id: Option<i32>,
    pub bank_name: String,
    pub correct: i32,
    pub incorrect: i32,
    pub unanswered: i32,
    pub total: i32,
    pub points: f64,
    pub percentage: i32,
    pub answers: Json<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
    pub bank_id: Option<i32>,
    pub bank_name: String,
    pub score: Score,
    pub answers: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct Query {
    pub user_id: Option<i32>,
    pub bank_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct Submitted {
    pub id: i32,
    pub bank_name: String,
    #[serde(flatten)]
    pub score: Score,
}

#[derive(Debug, Clone, FromRow)]
pub struct RankingRow {
    pub user_id: i32,
    pub user_name: String,
    pub best_percentage: i32,
    pub best_points: f64,
    pub attempts: i64,
    pub average_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub position: usize,
    pub user_id: i32,
    pub user_name: String,
    pub best_percentage: i32,
    pub best_points: f64,
    pub attempts: i64,
    pub average_percentage: f64,
}

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub bank_id: Option<i32>,
    pub limit: Option<i64>,
}
