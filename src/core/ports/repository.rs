use chrono::{DateTime, Utc};

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
use crate::error::Error;

pub trait UserCommon {
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<User, Error>;
    async fn get_by_login(&mut self, login: &str) -> Result<Option<User>, Error>;
    async fn get_by_email(&mut self, email: &str) -> Result<Option<User>, Error>;
    async fn name_exists(&mut self, name: &str) -> Result<bool, Error>;
    async fn email_exists(&mut self, email: &str) -> Result<bool, Error>;
    async fn query(&mut self, query: &UserQuery, pagination: Option<Pagination>) -> Result<Vec<User>, Error>;
    async fn count(&mut self, query: &UserQuery) -> Result<i64, Error>;
    async fn patch(&mut self, id: i32, patch: UserPatch) -> Result<(), Error>;
    async fn delete(&mut self, id: i32) -> Result<u64, Error>;
}

pub trait AcademicLevelCommon {
    async fn insert(&mut self, level: AcademicLevelWrite) -> Result<i32, Error>;
    async fn query(&mut self) -> Result<Vec<AcademicLevel>, Error>;
    async fn update(&mut self, id: i32, level: AcademicLevelWrite) -> Result<u64, Error>;
    async fn delete(&mut self, id: i32) -> Result<u64, Error>;
}

pub trait SubjectCommon {
    async fn insert(&mut self, subject: SubjectWrite) -> Result<i32, Error>;
    async fn query(&mut self, query: &SubjectQuery) -> Result<Vec<Subject>, Error>;
    async fn update(&mut self, id: i32, subject: SubjectWrite) -> Result<u64, Error>;
    async fn delete(&mut self, id: i32) -> Result<u64, Error>;
}

pub trait BankCommon {
    async fn insert(&mut self, bank: BankInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Bank, Error>;
    async fn get_by_name(&mut self, name: &str) -> Result<Option<Bank>, Error>;
    async fn exists(&mut self, name: &str) -> Result<bool, Error>;
    async fn query(&mut self, query: &BankQuery, pagination: Option<Pagination>) -> Result<Vec<BankSummary>, Error>;
    async fn count(&mut self, query: &BankQuery) -> Result<i64, Error>;
    async fn update(&mut self, id: i32, bank: BankUpdate) -> Result<u64, Error>;
}

pub trait AttemptCommon {
    async fn insert(&mut self, attempt: AttemptInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Attempt, Error>;
    async fn query(&mut self, query: &AttemptQuery, pagination: Option<Pagination>) -> Result<Vec<Attempt>, Error>;
    async fn count(&mut self, query: &AttemptQuery) -> Result<i64, Error>;
    async fn rankings(&mut self, bank_id: Option<i32>) -> Result<Vec<RankingRow>, Error>;
}

pub trait NotificationCommon {
    async fn insert(&mut self, notification: NotificationInsert) -> Result<i32, Error>;
    async fn broadcast(&mut self, title: &str, message: &str, expires_at: Option<DateTime<Utc>>) -> Result<u64, Error>;
    async fn query(&mut self, query: &NotificationQuery, pagination: Option<Pagination>) -> Result<Vec<Notification>, Error>;
    async fn count(&mut self, query: &NotificationQuery) -> Result<i64, Error>;
    async fn mark_read(&mut self, user_id: i32, id: i32) -> Result<u64, Error>;
    async fn mark_all_read(&mut self, user_id: i32) -> Result<u64, Error>;
    async fn delete(&mut self, id: i32) -> Result<u64, Error>;
}

pub trait TicketCommon {
    async fn insert(&mut self, ticket: TicketInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Ticket, Error>;
    async fn query(&mut self, query: &TicketQuery, pagination: Option<Pagination>) -> Result<Vec<Ticket>, Error>;
    async fn count(&mut self, query: &TicketQuery) -> Result<i64, Error>;
    async fn update(&mut self, id: i32, update: TicketUpdate) -> Result<u64, Error>;
}

pub trait ResetTokenCommon {
    async fn insert(&mut self, token: ResetTokenInsert) -> Result<i32, Error>;
    async fn get_valid(&mut self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<ResetToken>, Error>;
    async fn mark_used(&mut self, id: i32) -> Result<(), Error>;
}

pub trait Common:
    UserCommon + AcademicLevelCommon + SubjectCommon + BankCommon + AttemptCommon + NotificationCommon + TicketCommon + ResetTokenCommon
{
}

pub trait Store: Common {}

pub trait TxStore: Store {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}
