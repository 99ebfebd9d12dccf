use chrono::{DateTime, Utc};

use crate::core::{
    email,
    models::{
        common::Pagination,
        notification::{Create as NotificationCreate, Insert as NotificationInsert, Notification, Query as NotificationQuery},
        user::User,
    },
    ports::{
        mailer::{deliver, Mailer},
        repository::{NotificationCommon, Store, UserCommon},
    },
    services::{found, require},
};
use crate::error::Error;

/// Reaches a user through the channels they opted into.
pub async fn notify<S, M>(store: &mut S, mailer: &M, user: &User, title: &str, message: &str, expires_at: Option<DateTime<Utc>>) -> Result<(), Error>
where
    S: Store,
    M: Mailer,
{
    if user.notify_site {
        NotificationCommon::insert(
            store,
            NotificationInsert {
                user_id: user.id,
                title: title.to_owned(),
                message: message.to_owned(),
                expires_at,
            },
        )
        .await?;
    }
    if user.notify_email {
        deliver(mailer, email::notification(&user.email, &user.name, title, message)).await;
    }
    Ok(())
}

/// Broadcasts (no `user_id`) go to every user's inbox but are not emailed.
pub async fn create<S, M>(store: &mut S, mailer: &M, create: NotificationCreate) -> Result<u64, Error>
where
    S: Store,
    M: Mailer,
{
    let title = require(&create.title, "title", 255)?;
    let message = require(&create.message, "message", 10_000)?;
    match create.user_id {
        Some(user_id) => {
            let user = UserCommon::get(store, user_id).await?;
            NotificationCommon::insert(
                store,
                NotificationInsert {
                    user_id,
                    title: title.clone(),
                    message: message.clone(),
                    expires_at: create.expires_at,
                },
            )
            .await?;
            if user.notify_email {
                deliver(mailer, email::notification(&user.email, &user.name, &title, &message)).await;
            }
            Ok(1)
        }
        None => {
            let n = NotificationCommon::broadcast(store, &title, &message, create.expires_at).await?;
            log::info!("broadcast notification {:?} to {} users", title, n);
            Ok(n)
        }
    }
}

pub async fn list<S>(store: &mut S, user_id: i32, unread_only: bool, now: DateTime<Utc>, pagination: Pagination) -> Result<(Vec<Notification>, i64), Error>
where
    S: Store,
{
    let query = NotificationQuery {
        user_id: Some(user_id),
        unread_only,
        now: Some(now),
    };
    let total = NotificationCommon::count(store, &query).await?;
    let list = NotificationCommon::query(store, &query, Some(pagination)).await?;
    Ok((list, total))
}

pub async fn mark_read<S>(store: &mut S, user_id: i32, id: i32) -> Result<u64, Error>
where
    S: Store,
{
    found(NotificationCommon::mark_read(store, user_id, id).await?, "notification")
}

pub async fn mark_all_read<S>(store: &mut S, user_id: i32) -> Result<u64, Error>
where
    S: Store,
{
    NotificationCommon::mark_all_read(store, user_id).await
}

pub async fn delete<S>(store: &mut S, id: i32) -> Result<u64, Error>
where
    S: Store,
{
    found(NotificationCommon::delete(store, id).await?, "notification")
}
