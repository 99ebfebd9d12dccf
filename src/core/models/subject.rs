use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AcademicLevel {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcademicLevelWrite {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subject {
    pub id: i32,
    pub name: String,
    pub academic_level_id: Option<i32>,
    pub academic_level_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectWrite {
    pub name: String,
    pub academic_level_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubjectQuery {
    pub academic_level_id: Option<i32>,
}
