use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;
use chrono::Utc;
use serde::Serialize;

use crate::context::UserInfo;
use crate::core::models::notification::{Create as NotificationCreate, Notification, Query as NotificationQuery};
use crate::core::services::notification as service;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::impls::mailer::AnyMailer;
use crate::request::Pagination;
use crate::response::{DeleteResponse, List, UpdateResponse};

#[derive(Debug, Serialize)]
pub struct Sent {
    sent: u64,
}

pub async fn list(user: UserInfo, Query(query): Query<NotificationQuery>, pagination: Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<Notification>>, Error> {
    let mut store = db.acquire().await?;
    let (notifications, total) = service::list(&mut store, user.id, query.unread_only, Utc::now(), pagination.into_inner().into()).await?;
    Ok(Json(List::new(notifications, total)))
}

pub async fn mark_read(user: UserInfo, id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<UpdateResponse>, Error> {
    let mut store = db.acquire().await?;
    let updated = service::mark_read(&mut store, user.id, id.into_inner().0).await?;
    Ok(Json(UpdateResponse { updated }))
}

pub async fn mark_all_read(user: UserInfo, db: Data<PgSqlxManager>) -> Result<Json<UpdateResponse>, Error> {
    let mut store = db.acquire().await?;
    let updated = service::mark_all_read(&mut store, user.id).await?;
    Ok(Json(UpdateResponse { updated }))
}

pub async fn create(Json(body): Json<NotificationCreate>, db: Data<PgSqlxManager>, mailer: Data<AnyMailer>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    let sent = service::create(&mut store, mailer.get_ref(), body).await?;
    Ok(HttpResponse::Created().json(Sent { sent }))
}

pub async fn delete(id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<DeleteResponse>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(DeleteResponse::new(service::delete(&mut store, id.into_inner().0).await?)))
}
