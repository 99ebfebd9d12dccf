use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;

use crate::context::UserInfo;
use crate::core::models::ticket::{Create as TicketCreate, Query as TicketQuery, Ticket, Update as TicketUpdate};
use crate::core::ports::repository::TxStore;
use crate::core::services::ticket as service;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::impls::mailer::AnyMailer;
use crate::request::Pagination;
use crate::response::{CreateResponse, List};

pub async fn open(user: Option<UserInfo>, Json(body): Json<TicketCreate>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    let id = service::open(&mut store, user.map(|u| u.id), body).await?;
    Ok(HttpResponse::Created().json(CreateResponse { id }))
}

pub async fn list(Query(query): Query<TicketQuery>, pagination: Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<Ticket>>, Error> {
    let mut store = db.acquire().await?;
    let (tickets, total) = service::list(&mut store, query, pagination.into_inner().into()).await?;
    Ok(Json(List::new(tickets, total)))
}

pub async fn update(id: Path<(i32,)>, Json(body): Json<TicketUpdate>, db: Data<PgSqlxManager>, mailer: Data<AnyMailer>) -> Result<Json<Ticket>, Error> {
    let mut tx = db.begin().await?;
    let ticket = service::update(&mut tx, mailer.get_ref(), id.into_inner().0, body).await?;
    tx.commit().await?;
    Ok(Json(ticket))
}
