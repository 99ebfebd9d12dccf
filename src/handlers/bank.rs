use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;

use crate::core::models::bank::{Bank, BankSummary, Insert as BankInsert, NormalizedBank, Query as BankQuery, Update as BankUpdate};
use crate::core::services::bank as service;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::handlers::Files;
use crate::request::Pagination;
use crate::response::{CreateResponse, DeleteResponse, List};

pub async fn list(query: Query<BankQuery>, pagination: Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<BankSummary>>, Error> {
    let mut store = db.acquire().await?;
    let query = BankQuery {
        published_only: true,
        active_only: true,
        ..query.into_inner()
    };
    let (banks, total) = service::list_banks(&mut store, query, pagination.into_inner().into()).await?;
    Ok(Json(List::new(banks, total)))
}

pub async fn load(key: Path<(String,)>, db: Data<PgSqlxManager>, files: Files) -> Result<Json<NormalizedBank>, Error> {
    let mut store = db.acquire().await?;
    let bank = service::load_bank(&mut store, files.get_ref().as_ref(), &key.into_inner().0, false).await?;
    Ok(Json(bank))
}

pub async fn admin_list(query: Query<BankQuery>, pagination: Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<BankSummary>>, Error> {
    let mut store = db.acquire().await?;
    let (banks, total) = service::list_banks(&mut store, query.into_inner(), pagination.into_inner().into()).await?;
    Ok(Json(List::new(banks, total)))
}

pub async fn detail(id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<Bank>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(service::get_bank(&mut store, id.into_inner().0).await?))
}

pub async fn create(Json(body): Json<BankInsert>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    let id = service::create_bank(&mut store, body).await?;
    Ok(HttpResponse::Created().json(CreateResponse { id }))
}

pub async fn update(id: Path<(i32,)>, Json(body): Json<BankUpdate>, db: Data<PgSqlxManager>) -> Result<Json<Bank>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(service::update_bank(&mut store, id.into_inner().0, body).await?))
}

pub async fn delete(id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<DeleteResponse>, Error> {
    let mut store = db.acquire().await?;
    let deleted = service::delete_bank(&mut store, id.into_inner().0).await?;
    Ok(Json(DeleteResponse::new(deleted)))
}
