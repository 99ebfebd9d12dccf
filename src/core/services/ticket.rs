use crate::core::{
    email,
    models::{
        common::Pagination,
        ticket::{Create as TicketCreate, Insert as TicketInsert, Query as TicketQuery, Ticket, TicketStatus, Update as TicketUpdate},
    },
    ports::{
        mailer::{deliver, Mailer},
        repository::{Store, TicketCommon, UserCommon},
    },
    services::{found, notification::notify, require, require_email},
};
use crate::error::Error;

pub async fn open<S>(store: &mut S, user_id: Option<i32>, create: TicketCreate) -> Result<i32, Error>
where
    S: Store,
{
    let id = TicketCommon::insert(
        store,
        TicketInsert {
            user_id,
            name: require(&create.name, "name", 64)?,
            email: require_email(&create.email)?,
            subject: require(&create.subject, "subject", 255)?,
            message: require(&create.message, "message", 10_000)?,
        },
    )
    .await?;
    log::info!("support ticket {} opened", id);
    Ok(id)
}

pub async fn list<S>(store: &mut S, query: TicketQuery, pagination: Pagination) -> Result<(Vec<Ticket>, i64), Error>
where
    S: Store,
{
    let total = TicketCommon::count(store, &query).await?;
    let tickets = TicketCommon::query(store, &query, Some(pagination)).await?;
    Ok((tickets, total))
}

/// Applies an admin update. A reply reaches a registered owner through their
/// notification preferences, and anonymous submitters by email.
pub async fn update<S, M>(store: &mut S, mailer: &M, id: i32, mut update: TicketUpdate) -> Result<Ticket, Error>
where
    S: Store,
    M: Mailer,
{
    let reply = match update.reply.take() {
        Some(r) => Some(require(&r, "reply", 10_000)?),
        None => None,
    };
    if reply.is_some() && update.status.is_none() {
        update.status = Some(TicketStatus::InProgress);
    }
    update.reply = reply.clone();
    found(TicketCommon::update(store, id, update).await?, "ticket")?;
    let ticket = TicketCommon::get(store, id).await?;
    if let Some(reply) = reply {
        let owner = match ticket.user_id {
            Some(uid) => match UserCommon::get(store, uid).await {
                Ok(user) => Some(user),
                Err(Error::DatabaseError(sqlx::Error::RowNotFound)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };
        match owner {
            Some(user) => notify(store, mailer, &user, &format!("Re: {}", ticket.subject), &reply, None).await?,
            None => deliver(mailer, email::ticket_reply(&ticket.email, &ticket.name, &ticket.subject, &reply, &ticket.status)).await,
        }
    }
    Ok(ticket)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::models::user::Insert as UserInsert;
    use crate::core::services::mem::{MemMailer, MemStore};

    fn create() -> TicketCreate {
        TicketCreate {
            name: "ann".into(),
            email: "ann@example.com".into(),
            subject: "Wrong answer".into(),
            message: "Question 3 in Algebra I is wrong".into(),
        }
    }

    #[tokio::test]
    async fn test_open_validates() {
        let mut store = MemStore::default();
        let mut bad = create();
        bad.email = "nope".into();
        assert!(matches!(open(&mut store, None, bad).await.unwrap_err(), Error::BusinessError(_)));
        let id = open(&mut store, None, create()).await.unwrap();
        let (tickets, total) = list(&mut store, TicketQuery { status: Some(TicketStatus::Open) }, Pagination::new(1, 10)).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(tickets[0].id, id);
    }

    #[tokio::test]
    async fn test_reply_to_anonymous_sends_email() {
        let mut store = MemStore::default();
        let mailer = MemMailer::default();
        let id = open(&mut store, None, create()).await.unwrap();
        let ticket = update(
            &mut store,
            &mailer,
            id,
            TicketUpdate {
                status: None,
                reply: Some("Fixed, thanks".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(ticket.status, "in_progress");
        assert_eq!(ticket.reply.as_deref(), Some("Fixed, thanks"));
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Re: Wrong answer");
    }

    #[tokio::test]
    async fn test_reply_to_user_notifies() {
        let mut store = MemStore::default();
        let mailer = MemMailer::default();
        let uid = UserCommon::insert(
            &mut store,
            UserInsert {
                name: "ann".into(),
                email: "ann@example.com".into(),
                password: "x".into(),
            },
        )
        .await
        .unwrap();
        let id = open(&mut store, Some(uid), create()).await.unwrap();
        update(
            &mut store,
            &mailer,
            id,
            TicketUpdate {
                status: Some(TicketStatus::Closed),
                reply: Some("Done".into()),
            },
        )
        .await
        .unwrap();
        let notifications = store.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].user_id, uid);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_ticket() {
        let mut store = MemStore::default();
        let err = update(&mut store, &MemMailer::default(), 99, TicketUpdate::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    async fn registered_ticket(store: &mut MemStore) -> (i32, i32) {
        let uid = UserCommon::insert(
            store,
            UserInsert {
                name: "ann".into(),
                email: "ann@example.com".into(),
                password: "x".into(),
            },
        )
        .await
        .unwrap();
        (uid, open(store, Some(uid), create()).await.unwrap())
    }

    fn reply() -> TicketUpdate {
        TicketUpdate {
            status: None,
            reply: Some("Done".into()),
        }
    }

    #[tokio::test]
    async fn test_reply_to_deleted_user_falls_back_to_email() {
        let mut store = MemStore::default();
        let mailer = MemMailer::default();
        let (uid, id) = registered_ticket(&mut store).await;
        UserCommon::delete(&mut store, uid).await.unwrap();
        update(&mut store, &mailer, id, reply()).await.unwrap();
        assert!(store.notifications().is_empty());
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.sent()[0].to, "ann@example.com");
    }

    #[tokio::test]
    async fn test_reply_owner_lookup_failure_propagates() {
        let mut store = MemStore::default();
        let mailer = MemMailer::default();
        let (_, id) = registered_ticket(&mut store).await;
        store.take_users_offline();
        let err = update(&mut store, &mailer, id, reply()).await.unwrap_err();
        assert!(matches!(err, Error::DatabaseError(sqlx::Error::PoolTimedOut)));
        assert!(mailer.sent().is_empty());
    }
}
