pub mod attempt;
pub mod bank;
pub mod notification;
pub mod subject;
pub mod ticket;
pub mod user;

use actix_web::web::{Data, Json};
use serde::Serialize;

use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::impls::banks::files::LocalBanks;

/// Flat-file bank directory, absent when `BANKS_DIR` is not configured.
pub type Files = Data<Option<LocalBanks>>;

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
}

pub async fn health(db: Data<PgSqlxManager>) -> Result<Json<Health>, Error> {
    db.ping().await?;
    Ok(Json(Health { status: "ok" }))
}
