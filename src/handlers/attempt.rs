use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;
use serde::Deserialize;

use crate::context::UserInfo;
use crate::core::models::attempt::{Attempt, Query as AttemptQuery, Ranking, RankingQuery, Submit};
use crate::core::services::attempt as service;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::handlers::Files;
use crate::request::Pagination;
use crate::response::List;

#[derive(Debug, Deserialize)]
pub struct OwnFilter {
    bank_id: Option<i32>,
}

pub async fn submit(user: UserInfo, Json(body): Json<Submit>, db: Data<PgSqlxManager>, files: Files) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    let submitted = service::submit(&mut store, files.get_ref().as_ref(), user.id, body).await?;
    Ok(HttpResponse::Created().json(submitted))
}

pub async fn list(user: UserInfo, Query(OwnFilter { bank_id }): Query<OwnFilter>, pagination: Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<Attempt>>, Error> {
    let mut store = db.acquire().await?;
    let query = AttemptQuery {
        user_id: Some(user.id),
        bank_id,
    };
    let (attempts, total) = service::list_attempts(&mut store, query, pagination.into_inner().into()).await?;
    Ok(Json(List::new(attempts, total)))
}

pub async fn detail(user: UserInfo, id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<Attempt>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(service::attempt_detail(&mut store, user.id, id.into_inner().0).await?))
}

pub async fn rankings(Query(query): Query<RankingQuery>, db: Data<PgSqlxManager>) -> Result<Json<Vec<Ranking>>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(service::rankings(&mut store, query).await?))
}

pub async fn admin_list(query: Query<AttemptQuery>, pagination: Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<Attempt>>, Error> {
    let mut store = db.acquire().await?;
    let (attempts, total) = service::list_attempts(&mut store, query.into_inner(), pagination.into_inner().into()).await?;
    Ok(Json(List::new(attempts, total)))
}
