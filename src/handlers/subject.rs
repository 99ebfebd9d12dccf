use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;

use crate::core::models::subject::{AcademicLevel, AcademicLevelWrite, Subject, SubjectQuery, SubjectWrite};
use crate::core::services::subject as service;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::response::{CreateResponse, DeleteResponse, UpdateResponse};

pub async fn levels(db: Data<PgSqlxManager>) -> Result<Json<Vec<AcademicLevel>>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(service::levels(&mut store).await?))
}

pub async fn create_level(Json(body): Json<AcademicLevelWrite>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    let id = service::create_level(&mut store, body).await?;
    Ok(HttpResponse::Created().json(CreateResponse { id }))
}

pub async fn update_level(id: Path<(i32,)>, Json(body): Json<AcademicLevelWrite>, db: Data<PgSqlxManager>) -> Result<Json<UpdateResponse>, Error> {
    let mut store = db.acquire().await?;
    let updated = service::update_level(&mut store, id.into_inner().0, body).await?;
    Ok(Json(UpdateResponse { updated }))
}

pub async fn delete_level(id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<DeleteResponse>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(DeleteResponse::new(service::delete_level(&mut store, id.into_inner().0).await?)))
}

pub async fn subjects(Query(query): Query<SubjectQuery>, db: Data<PgSqlxManager>) -> Result<Json<Vec<Subject>>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(service::subjects(&mut store, query).await?))
}

pub async fn create_subject(Json(body): Json<SubjectWrite>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    let id = service::create_subject(&mut store, body).await?;
    Ok(HttpResponse::Created().json(CreateResponse { id }))
}

pub async fn update_subject(id: Path<(i32,)>, Json(body): Json<SubjectWrite>, db: Data<PgSqlxManager>) -> Result<Json<UpdateResponse>, Error> {
    let mut store = db.acquire().await?;
    let updated = service::update_subject(&mut store, id.into_inner().0, body).await?;
    Ok(Json(UpdateResponse { updated }))
}

pub async fn delete_subject(id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<DeleteResponse>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(DeleteResponse::new(service::delete_subject(&mut store, id.into_inner().0).await?)))
}
