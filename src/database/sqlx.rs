use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::types::Json;
use sqlx::{query, query_as, query_scalar, Executor, PgPool, Postgres, QueryBuilder, Transaction};

use crate::core::models::{
    attempt::{Attempt, Insert as AttemptInsert, Query as AttemptQuery, RankingRow},
    bank::{Bank, BankSummary, Insert as BankInsert, Query as BankQuery, Update as BankUpdate},
    common::Pagination,
    notification::{Insert as NotificationInsert, Notification, Query as NotificationQuery},
    reset_token::{Insert as ResetTokenInsert, ResetToken},
    subject::{AcademicLevel, AcademicLevelWrite, Subject, SubjectQuery, SubjectWrite},
    ticket::{Insert as TicketInsert, Query as TicketQuery, Ticket, Update as TicketUpdate},
    user::{Insert as UserInsert, Patch as UserPatch, Query as UserQuery, User},
};
use crate::core::ports::repository::{
    AcademicLevelCommon, AttemptCommon, BankCommon, Common, NotificationCommon, ResetTokenCommon, Store, SubjectCommon, TicketCommon, TxStore, UserCommon,
};
use crate::core::ports::roles::Roles;
use crate::error::Error;

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

fn push_pagination(stmt: &mut QueryBuilder<Postgres>, pagination: Option<Pagination>) {
    if let Some(p) = pagination {
        stmt.push(" LIMIT ").push_bind(p.limit());
        stmt.push(" OFFSET ").push_bind(p.offset());
    }
}

fn push_user_filters(stmt: &mut QueryBuilder<Postgres>, query: &UserQuery) {
    if let Some(name) = &query.name_like {
        stmt.push(" AND name ILIKE ").push_bind(format!("%{}%", name));
    }
    if let Some(is_admin) = query.is_admin {
        stmt.push(" AND is_admin = ").push_bind(is_admin);
    }
}

impl<E> UserCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING id")
            .bind(user.name)
            .bind(user.email)
            .bind(user.password)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<User, Error> {
        let user = query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_one(&mut self.executor).await?;
        Ok(user)
    }

    async fn get_by_login(&mut self, login: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE LOWER(name) = LOWER($1) OR email = LOWER($1)")
            .bind(login)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(user)
    }

    async fn get_by_email(&mut self, email: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(&mut self.executor).await?;
        Ok(user)
    }

    async fn name_exists(&mut self, name: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM users WHERE LOWER(name) = LOWER($1))")
            .bind(name)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn email_exists(&mut self, email: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn query(&mut self, query: &UserQuery, pagination: Option<Pagination>) -> Result<Vec<User>, Error> {
        let mut stmt = QueryBuilder::new("SELECT * FROM users WHERE 1 = 1");
        push_user_filters(&mut stmt, query);
        stmt.push(" ORDER BY id");
        push_pagination(&mut stmt, pagination);
        let users = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(users)
    }

    async fn count(&mut self, query: &UserQuery) -> Result<i64, Error> {
        let mut stmt = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1 = 1");
        push_user_filters(&mut stmt, query);
        let (n,): (i64,) = stmt.build_query_as().fetch_one(&mut self.executor).await?;
        Ok(n)
    }

    async fn patch(&mut self, id: i32, patch: UserPatch) -> Result<(), Error> {
        let updated = query(
            "UPDATE users SET
                password = COALESCE($2, password),
                is_admin = COALESCE($3, is_admin),
                streak = COALESCE($4, streak),
                max_streak = COALESCE($5, max_streak),
                last_login = COALESCE($6, last_login),
                notify_email = COALESCE($7, notify_email),
                notify_site = COALESCE($8, notify_site)
            WHERE id = $1",
        )
        .bind(id)
        .bind(patch.password)
        .bind(patch.is_admin)
        .bind(patch.streak)
        .bind(patch.max_streak)
        .bind(patch.last_login)
        .bind(patch.notify_email)
        .bind(patch.notify_site)
        .execute(&mut self.executor)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(Error::DatabaseError(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let deleted = query("DELETE FROM users WHERE id = $1").bind(id).execute(&mut self.executor).await?.rows_affected();
        Ok(deleted)
    }
}

impl<E> AcademicLevelCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, level: AcademicLevelWrite) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO academic_levels (name) VALUES ($1) RETURNING id")
            .bind(level.name)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn query(&mut self) -> Result<Vec<AcademicLevel>, Error> {
        let levels = query_as("SELECT * FROM academic_levels ORDER BY name").fetch_all(&mut self.executor).await?;
        Ok(levels)
    }

    async fn update(&mut self, id: i32, level: AcademicLevelWrite) -> Result<u64, Error> {
        let updated = query("UPDATE academic_levels SET name = $1 WHERE id = $2")
            .bind(level.name)
            .bind(id)
            .execute(&mut self.executor)
            .await?
            .rows_affected();
        Ok(updated)
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let deleted = query("DELETE FROM academic_levels WHERE id = $1").bind(id).execute(&mut self.executor).await?.rows_affected();
        Ok(deleted)
    }
}

impl<E> SubjectCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, subject: SubjectWrite) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO subjects (name, academic_level_id) VALUES ($1, $2) RETURNING id")
            .bind(subject.name)
            .bind(subject.academic_level_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn query(&mut self, query: &SubjectQuery) -> Result<Vec<Subject>, Error> {
        let subjects = query_as(
            "
        SELECT s.id, s.name, s.academic_level_id, l.name AS academic_level_name
        FROM subjects AS s
        LEFT JOIN academic_levels AS l ON s.academic_level_id = l.id
        WHERE ($1::INT4 IS NULL OR s.academic_level_id = $1)
        ORDER BY s.name",
        )
        .bind(query.academic_level_id)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(subjects)
    }

    async fn update(&mut self, id: i32, subject: SubjectWrite) -> Result<u64, Error> {
        let updated = query("UPDATE subjects SET name = $1, academic_level_id = $2 WHERE id = $3")
            .bind(subject.name)
            .bind(subject.academic_level_id)
            .bind(id)
            .execute(&mut self.executor)
            .await?
            .rows_affected();
        Ok(updated)
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let deleted = query("DELETE FROM subjects WHERE id = $1").bind(id).execute(&mut self.executor).await?.rows_affected();
        Ok(deleted)
    }
}

const BANK_SUMMARY: &str = "
    SELECT
        b.id,
        b.name,
        b.subject_id,
        s.name AS subject_name,
        jsonb_array_length(CASE WHEN jsonb_typeof(b.questions) = 'array' THEN b.questions ELSE b.questions -> 'questions' END)::INT4 AS question_count,
        b.is_published,
        b.is_active,
        b.updated_at
    FROM question_banks AS b
    LEFT JOIN subjects AS s ON b.subject_id = s.id
    WHERE 1 = 1";

fn push_bank_filters(stmt: &mut QueryBuilder<Postgres>, query: &BankQuery) {
    if let Some(subject_id) = query.subject_id {
        stmt.push(" AND b.subject_id = ").push_bind(subject_id);
    }
    if let Some(name) = &query.name {
        stmt.push(" AND b.name ILIKE ").push_bind(format!("%{}%", name));
    }
    if query.published_only {
        stmt.push(" AND b.is_published");
    }
    if query.active_only {
        stmt.push(" AND b.is_active");
    }
}

impl<E> BankCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, bank: BankInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO question_banks (name, subject_id, questions, is_published) VALUES ($1, $2, $3, $4) RETURNING id")
            .bind(bank.name)
            .bind(bank.subject_id)
            .bind(Json(bank.questions))
            .bind(bank.is_published)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Bank, Error> {
        let bank = query_as("SELECT * FROM question_banks WHERE id = $1").bind(id).fetch_one(&mut self.executor).await?;
        Ok(bank)
    }

    async fn get_by_name(&mut self, name: &str) -> Result<Option<Bank>, Error> {
        let bank = query_as("SELECT * FROM question_banks WHERE name = $1").bind(name).fetch_optional(&mut self.executor).await?;
        Ok(bank)
    }

    async fn exists(&mut self, name: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM question_banks WHERE name = $1)")
            .bind(name)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn query(&mut self, query: &BankQuery, pagination: Option<Pagination>) -> Result<Vec<BankSummary>, Error> {
        let mut stmt = QueryBuilder::new(BANK_SUMMARY);
        push_bank_filters(&mut stmt, query);
        stmt.push(" ORDER BY b.name");
        push_pagination(&mut stmt, pagination);
        let banks = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(banks)
    }

    async fn count(&mut self, query: &BankQuery) -> Result<i64, Error> {
        let mut stmt = QueryBuilder::new("SELECT COUNT(*) FROM question_banks AS b WHERE 1 = 1");
        push_bank_filters(&mut stmt, query);
        let (n,): (i64,) = stmt.build_query_as().fetch_one(&mut self.executor).await?;
        Ok(n)
    }

    async fn update(&mut self, id: i32, bank: BankUpdate) -> Result<u64, Error> {
        let updated = query(
            "UPDATE question_banks SET
                name = COALESCE($2, name),
                subject_id = COALESCE($3, subject_id),
                questions = COALESCE($4, questions),
                is_published = COALESCE($5, is_published),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1",
        )
        .bind(id)
        .bind(bank.name)
        .bind(bank.subject_id)
        .bind(bank.questions.map(Json))
        .bind(bank.is_published)
        .bind(bank.is_active)
        .execute(&mut self.executor)
        .await?
        .rows_affected();
        Ok(updated)
    }
}

fn push_attempt_filters(stmt: &mut QueryBuilder<Postgres>, query: &AttemptQuery) {
    if let Some(user_id) = query.user_id {
        stmt.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(bank_id) = query.bank_id {
        stmt.push(" AND bank_id = ").push_bind(bank_id);
    }
}

impl<E> AttemptCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, attempt: AttemptInsert) -> Result<i32, Error> {
        let id = query_scalar(
            "INSERT INTO attempts (user_id, user_name, user_email, bank_id, bank_name, correct, incorrect, unanswered, total, points, percentage, answers)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id",
        )
        .bind(attempt.user_id)
        .bind(attempt.user_name)
        .bind(attempt.user_email)
        .bind(attempt.bank_id)
        .bind(attempt.bank_name)
        .bind(attempt.score.correct)
        .bind(attempt.score.incorrect)
        .bind(attempt.score.unanswered)
        .bind(attempt.score.total)
        .bind(attempt.score.points)
        .bind(attempt.score.percentage)
        .bind(Json(attempt.answers))
        .fetch_one(&mut self.executor)
        .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Attempt, Error> {
        let attempt = query_as("SELECT * FROM attempts WHERE id = $1").bind(id).fetch_one(&mut self.executor).await?;
        Ok(attempt)
    }

    async fn query(&mut self, query: &AttemptQuery, pagination: Option<Pagination>) -> Result<Vec<Attempt>, Error> {
        let mut stmt = QueryBuilder::new("SELECT * FROM attempts WHERE 1 = 1");
        push_attempt_filters(&mut stmt, query);
        stmt.push(" ORDER BY created_at DESC, id DESC");
        push_pagination(&mut stmt, pagination);
        let attempts = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(attempts)
    }

    async fn count(&mut self, query: &AttemptQuery) -> Result<i64, Error> {
        let mut stmt = QueryBuilder::new("SELECT COUNT(*) FROM attempts WHERE 1 = 1");
        push_attempt_filters(&mut stmt, query);
        let (n,): (i64,) = stmt.build_query_as().fetch_one(&mut self.executor).await?;
        Ok(n)
    }

    async fn rankings(&mut self, bank_id: Option<i32>) -> Result<Vec<RankingRow>, Error> {
        let rows = query_as(
            "
        SELECT
            u.id AS user_id,
            u.name AS user_name,
            MAX(a.percentage) AS best_percentage,
            MAX(a.points) AS best_points,
            COUNT(a.id) AS attempts,
            AVG(a.percentage)::FLOAT8 AS average_percentage
        FROM attempts AS a
        JOIN users AS u ON a.user_id = u.id
        WHERE ($1::INT4 IS NULL OR a.bank_id = $1)
        GROUP BY u.id, u.name",
        )
        .bind(bank_id)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(rows)
    }
}

fn push_notification_filters(stmt: &mut QueryBuilder<Postgres>, query: &NotificationQuery) {
    if let Some(user_id) = query.user_id {
        stmt.push(" AND user_id = ").push_bind(user_id);
    }
    if query.unread_only {
        stmt.push(" AND NOT is_read");
    }
    if let Some(now) = query.now {
        stmt.push(" AND (expires_at IS NULL OR expires_at > ").push_bind(now).push(")");
    }
}

impl<E> NotificationCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, notification: NotificationInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO notifications (user_id, title, message, expires_at) VALUES ($1, $2, $3, $4) RETURNING id")
            .bind(notification.user_id)
            .bind(notification.title)
            .bind(notification.message)
            .bind(notification.expires_at)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn broadcast(&mut self, title: &str, message: &str, expires_at: Option<DateTime<Utc>>) -> Result<u64, Error> {
        let inserted = query("INSERT INTO notifications (user_id, title, message, expires_at) SELECT id, $1, $2, $3 FROM users")
            .bind(title)
            .bind(message)
            .bind(expires_at)
            .execute(&mut self.executor)
            .await?
            .rows_affected();
        Ok(inserted)
    }

    async fn query(&mut self, query: &NotificationQuery, pagination: Option<Pagination>) -> Result<Vec<Notification>, Error> {
        let mut stmt = QueryBuilder::new("SELECT * FROM notifications WHERE 1 = 1");
        push_notification_filters(&mut stmt, query);
        stmt.push(" ORDER BY created_at DESC, id DESC");
        push_pagination(&mut stmt, pagination);
        let notifications = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(notifications)
    }

    async fn count(&mut self, query: &NotificationQuery) -> Result<i64, Error> {
        let mut stmt = QueryBuilder::new("SELECT COUNT(*) FROM notifications WHERE 1 = 1");
        push_notification_filters(&mut stmt, query);
        let (n,): (i64,) = stmt.build_query_as().fetch_one(&mut self.executor).await?;
        Ok(n)
    }

    async fn mark_read(&mut self, user_id: i32, id: i32) -> Result<u64, Error> {
        let updated = query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut self.executor)
            .await?
            .rows_affected();
        Ok(updated)
    }

    async fn mark_all_read(&mut self, user_id: i32) -> Result<u64, Error> {
        let updated = query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
            .bind(user_id)
            .execute(&mut self.executor)
            .await?
            .rows_affected();
        Ok(updated)
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let deleted = query("DELETE FROM notifications WHERE id = $1").bind(id).execute(&mut self.executor).await?.rows_affected();
        Ok(deleted)
    }
}

impl<E> TicketCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, ticket: TicketInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO support_tickets (user_id, name, email, subject, message) VALUES ($1, $2, $3, $4, $5) RETURNING id")
            .bind(ticket.user_id)
            .bind(ticket.name)
            .bind(ticket.email)
            .bind(ticket.subject)
            .bind(ticket.message)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Ticket, Error> {
        let ticket = query_as("SELECT * FROM support_tickets WHERE id = $1").bind(id).fetch_one(&mut self.executor).await?;
        Ok(ticket)
    }

    async fn query(&mut self, query: &TicketQuery, pagination: Option<Pagination>) -> Result<Vec<Ticket>, Error> {
        let mut stmt = QueryBuilder::new("SELECT * FROM support_tickets WHERE 1 = 1");
        if let Some(status) = query.status {
            stmt.push(" AND status = ").push_bind(status.as_str());
        }
        stmt.push(" ORDER BY created_at DESC, id DESC");
        push_pagination(&mut stmt, pagination);
        let tickets = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(tickets)
    }

    async fn count(&mut self, query: &TicketQuery) -> Result<i64, Error> {
        let n = query_scalar("SELECT COUNT(*) FROM support_tickets WHERE ($1::VARCHAR IS NULL OR status = $1)")
            .bind(query.status.map(|s| s.as_str()))
            .fetch_one(&mut self.executor)
            .await?;
        Ok(n)
    }

    async fn update(&mut self, id: i32, update: TicketUpdate) -> Result<u64, Error> {
        let updated = query(
            "UPDATE support_tickets SET
                status = COALESCE($2, status),
                reply = COALESCE($3, reply),
                updated_at = NOW()
            WHERE id = $1",
        )
        .bind(id)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.reply)
        .execute(&mut self.executor)
        .await?
        .rows_affected();
        Ok(updated)
    }
}

impl<E> ResetTokenCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, token: ResetTokenInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO password_reset_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3) RETURNING id")
            .bind(token.user_id)
            .bind(token.token_hash)
            .bind(token.expires_at)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get_valid(&mut self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<ResetToken>, Error> {
        let token = query_as("SELECT * FROM password_reset_tokens WHERE token_hash = $1 AND NOT used AND expires_at > $2 FOR UPDATE")
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(token)
    }

    async fn mark_used(&mut self, id: i32) -> Result<(), Error> {
        query("UPDATE password_reset_tokens SET used = TRUE WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgSqlxManager {
    pool: PgPool,
}

impl PgSqlxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<PgSqlx<Transaction<'static, Postgres>>, Error> {
        let tx = self.pool.begin().await?;
        Ok(PgSqlx { executor: tx })
    }

    pub async fn acquire(&self) -> Result<PgSqlx<PoolConnection<Postgres>>, Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgSqlx { executor: conn })
    }

    pub async fn ping(&self) -> Result<(), Error> {
        query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl Roles for PgSqlxManager {
    async fn is_admin(&self, user_id: i32) -> Result<bool, Error> {
        let is_admin: Option<bool> = query_scalar("SELECT is_admin FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(is_admin.unwrap_or(false))
    }
}

impl Common for PgSqlx<PoolConnection<Postgres>> {}
impl<'a> Common for PgSqlx<Transaction<'a, Postgres>> {}
impl Store for PgSqlx<PoolConnection<Postgres>> {}
impl<'a> Store for PgSqlx<Transaction<'a, Postgres>> {}

impl<'a> TxStore for PgSqlx<Transaction<'a, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.executor.rollback().await?;
        Ok(())
    }
}
