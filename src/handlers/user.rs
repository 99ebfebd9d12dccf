use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;
use chrono::Utc;
use serde::Deserialize;

use crate::config::Config;
use crate::context::UserInfo;
use crate::core::models::reset_token::{Confirm, Request as ResetRequest};
use crate::core::models::user::{LoginOutcome, Preferences, Profile, Query as UserQuery, Registration};
use crate::core::services::user as service;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::impls::hasher::bcrypt::Bcrypt;
use crate::impls::mailer::AnyMailer;
use crate::impls::tokener::jwt::JWT;
use crate::request::Pagination;
use crate::response::{CreateResponse, DeleteResponse, List, Message, UpdateResponse};

#[derive(Debug, Deserialize)]
pub struct Login {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePassword {
    pub current: String,
    pub new: String,
}

#[derive(Debug, Deserialize)]
pub struct SetAdmin {
    pub is_admin: bool,
}

pub async fn register(Json(body): Json<Registration>, db: Data<PgSqlxManager>, hasher: Data<Bcrypt>, mailer: Data<AnyMailer>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    let id = service::register(&mut store, hasher.get_ref(), mailer.get_ref(), body).await?;
    Ok(HttpResponse::Created().json(CreateResponse { id }))
}

pub async fn login(Json(Login { login, password }): Json<Login>, db: Data<PgSqlxManager>, hasher: Data<Bcrypt>, tokener: Data<JWT>, config: Data<Config>) -> Result<Json<LoginOutcome>, Error> {
    let mut store = db.acquire().await?;
    let outcome = service::login(&mut store, hasher.get_ref(), tokener.get_ref(), config.jwt_ttl_days, &login, &password, Utc::now()).await?;
    Ok(Json(outcome))
}

pub async fn me(user: UserInfo, db: Data<PgSqlxManager>) -> Result<Json<Profile>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(service::profile(&mut store, user.id).await?))
}

pub async fn update_preferences(user: UserInfo, Json(body): Json<Preferences>, db: Data<PgSqlxManager>) -> Result<Json<Profile>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(service::update_preferences(&mut store, user.id, body).await?))
}

pub async fn change_password(user: UserInfo, Json(body): Json<ChangePassword>, db: Data<PgSqlxManager>, hasher: Data<Bcrypt>) -> Result<Json<UpdateResponse>, Error> {
    let mut store = db.acquire().await?;
    service::change_password(&mut store, hasher.get_ref(), user.id, &body.current, &body.new).await?;
    Ok(Json(UpdateResponse { updated: 1 }))
}

pub async fn request_password_reset(Json(body): Json<ResetRequest>, db: Data<PgSqlxManager>, mailer: Data<AnyMailer>, config: Data<Config>) -> Result<Json<Message>, Error> {
    let mut store = db.acquire().await?;
    service::request_password_reset(&mut store, mailer.get_ref(), &body.email, &config.app_url, config.reset_token_ttl_minutes, Utc::now()).await?;
    Ok(Json(Message {
        message: "if the address is registered, a reset link has been sent",
    }))
}

pub async fn confirm_password_reset(Json(body): Json<Confirm>, db: Data<PgSqlxManager>, hasher: Data<Bcrypt>) -> Result<Json<Message>, Error> {
    let tx = db.begin().await?;
    service::confirm_password_reset(tx, hasher.get_ref(), body, Utc::now()).await?;
    Ok(Json(Message { message: "password updated" }))
}

pub async fn list(query: Query<UserQuery>, pagination: Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<Profile>>, Error> {
    let mut store = db.acquire().await?;
    let (users, total) = service::list_users(&mut store, query.into_inner(), pagination.into_inner().into()).await?;
    Ok(Json(List::new(users, total)))
}

pub async fn set_admin(me: UserInfo, id: Path<(i32,)>, Json(body): Json<SetAdmin>, db: Data<PgSqlxManager>) -> Result<Json<Profile>, Error> {
    let mut store = db.acquire().await?;
    Ok(Json(service::set_admin(&mut store, me.id, id.into_inner().0, body.is_admin).await?))
}

pub async fn delete(me: UserInfo, id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<DeleteResponse>, Error> {
    let mut store = db.acquire().await?;
    let deleted = service::delete_user(&mut store, me.id, id.into_inner().0).await?;
    Ok(Json(DeleteResponse::new(deleted)))
}
