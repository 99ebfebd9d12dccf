//! In-memory store and test doubles for service tests.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use sqlx::types::Json;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::core::email::Email;
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
use crate::core::normalize::raw_questions;
use crate::core::ports::{
    bank_files::BankFiles,
    hasher::Hasher,
    mailer::Mailer,
    repository::{AcademicLevelCommon, AttemptCommon, BankCommon, Common, NotificationCommon, ResetTokenCommon, Store, SubjectCommon, TicketCommon, TxStore, UserCommon},
};
use crate::error::Error;

#[derive(Default)]
struct Tables {
    seq: i32,
    users: Vec<User>,
    levels: Vec<AcademicLevel>,
    subjects: Vec<Subject>,
    banks: Vec<Bank>,
    attempts: Vec<Attempt>,
    notifications: Vec<Notification>,
    tickets: Vec<Ticket>,
    tokens: Vec<ResetToken>,
    users_offline: bool,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.seq += 1;
        self.seq
    }
}

fn page<T>(items: Vec<T>, pagination: Option<Pagination>) -> Vec<T> {
    match pagination {
        Some(p) => items.into_iter().skip(p.offset() as usize).take(p.limit() as usize).collect(),
        None => items,
    }
}

/// Clones share the same tables, so a clone can be moved into a service that
/// consumes its store.
#[derive(Clone, Default)]
pub struct MemStore {
    tables: Rc<RefCell<Tables>>,
}

impl MemStore {
    pub fn user(&self, id: i32) -> User {
        self.tables.borrow().users.iter().find(|u| u.id == id).cloned().unwrap()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.tables.borrow().notifications.clone()
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.tables.borrow().attempts.clone()
    }

    /// Makes user reads fail as if the database were unreachable.
    pub fn take_users_offline(&self) {
        self.tables.borrow_mut().users_offline = true;
    }
}

impl UserCommon for MemStore {
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error> {
        let mut t = self.tables.borrow_mut();
        let id = t.next_id();
        t.users.push(User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
            is_admin: false,
            streak: 0,
            max_streak: 0,
            last_login: None,
            notify_email: true,
            notify_site: true,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<User, Error> {
        if self.tables.borrow().users_offline {
            return Err(Error::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        self.tables.borrow().users.iter().find(|u| u.id == id).cloned().ok_or(Error::DatabaseError(sqlx::Error::RowNotFound))
    }

    async fn get_by_login(&mut self, login: &str) -> Result<Option<User>, Error> {
        let login = login.to_lowercase();
        Ok(self.tables.borrow().users.iter().find(|u| u.name.to_lowercase() == login || u.email == login).cloned())
    }

    async fn get_by_email(&mut self, email: &str) -> Result<Option<User>, Error> {
        Ok(self.tables.borrow().users.iter().find(|u| u.email == email).cloned())
    }

    async fn name_exists(&mut self, name: &str) -> Result<bool, Error> {
        Ok(self.tables.borrow().users.iter().any(|u| u.name.to_lowercase() == name.to_lowercase()))
    }

    async fn email_exists(&mut self, email: &str) -> Result<bool, Error> {
        Ok(self.tables.borrow().users.iter().any(|u| u.email == email))
    }

    async fn query(&mut self, query: &UserQuery, pagination: Option<Pagination>) -> Result<Vec<User>, Error> {
        let users = self
            .tables
            .borrow()
            .users
            .iter()
            .filter(|u| query.name_like.as_ref().map_or(true, |n| u.name.contains(n.as_str())))
            .filter(|u| query.is_admin.map_or(true, |a| u.is_admin == a))
            .cloned()
            .collect();
        Ok(page(users, pagination))
    }

    async fn count(&mut self, query: &UserQuery) -> Result<i64, Error> {
        Ok(UserCommon::query(self, query, None).await?.len() as i64)
    }

    async fn patch(&mut self, id: i32, patch: UserPatch) -> Result<(), Error> {
        let mut t = self.tables.borrow_mut();
        let u = t.users.iter_mut().find(|u| u.id == id).ok_or(Error::DatabaseError(sqlx::Error::RowNotFound))?;
        if let Some(v) = patch.password {
            u.password = v;
        }
        if let Some(v) = patch.is_admin {
            u.is_admin = v;
        }
        if let Some(v) = patch.streak {
            u.streak = v;
        }
        if let Some(v) = patch.max_streak {
            u.max_streak = v;
        }
        if let Some(v) = patch.last_login {
            u.last_login = Some(v);
        }
        if let Some(v) = patch.notify_email {
            u.notify_email = v;
        }
        if let Some(v) = patch.notify_site {
            u.notify_site = v;
        }
        Ok(())
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let mut t = self.tables.borrow_mut();
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        Ok((before - t.users.len()) as u64)
    }
}

impl AcademicLevelCommon for MemStore {
    async fn insert(&mut self, level: AcademicLevelWrite) -> Result<i32, Error> {
        let mut t = self.tables.borrow_mut();
        let id = t.next_id();
        t.levels.push(AcademicLevel { id, name: level.name });
        Ok(id)
    }

    async fn query(&mut self) -> Result<Vec<AcademicLevel>, Error> {
        Ok(self.tables.borrow().levels.clone())
    }

    async fn update(&mut self, id: i32, level: AcademicLevelWrite) -> Result<u64, Error> {
        let mut t = self.tables.borrow_mut();
        Ok(t.levels.iter_mut().filter(|l| l.id == id).map(|l| l.name = level.name.clone()).count() as u64)
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let mut t = self.tables.borrow_mut();
        let before = t.levels.len();
        t.levels.retain(|l| l.id != id);
        Ok((before - t.levels.len()) as u64)
    }
}

impl SubjectCommon for MemStore {
    async fn insert(&mut self, subject: SubjectWrite) -> Result<i32, Error> {
        let mut t = self.tables.borrow_mut();
        let id = t.next_id();
        let level_name = t.levels.iter().find(|l| Some(l.id) == subject.academic_level_id).map(|l| l.name.clone());
        t.subjects.push(Subject {
            id,
            name: subject.name,
            academic_level_id: subject.academic_level_id,
            academic_level_name: level_name,
        });
        Ok(id)
    }

    async fn query(&mut self, query: &SubjectQuery) -> Result<Vec<Subject>, Error> {
        Ok(self
            .tables
            .borrow()
            .subjects
            .iter()
            .filter(|s| query.academic_level_id.map_or(true, |l| s.academic_level_id == Some(l)))
            .cloned()
            .collect())
    }

    async fn update(&mut self, id: i32, subject: SubjectWrite) -> Result<u64, Error> {
        let mut t = self.tables.borrow_mut();
        Ok(t
            .subjects
            .iter_mut()
            .filter(|s| s.id == id)
            .map(|s| {
                s.name = subject.name.clone();
                s.academic_level_id = subject.academic_level_id;
            })
            .count() as u64)
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let mut t = self.tables.borrow_mut();
        let before = t.subjects.len();
        t.subjects.retain(|s| s.id != id);
        Ok((before - t.subjects.len()) as u64)
    }
}

fn summary(b: &Bank) -> BankSummary {
    BankSummary {
        id: b.id,
        name: b.name.clone(),
        subject_id: b.subject_id,
        subject_name: None,
        question_count: raw_questions(&b.questions.0).len() as i32,
        is_published: b.is_published,
        is_active: b.is_active,
        updated_at: b.updated_at,
    }
}

impl BankCommon for MemStore {
    async fn insert(&mut self, bank: BankInsert) -> Result<i32, Error> {
        let mut t = self.tables.borrow_mut();
        let id = t.next_id();
        t.banks.push(Bank {
            id,
            name: bank.name,
            subject_id: bank.subject_id,
            questions: Json(bank.questions),
            is_published: bank.is_published,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Bank, Error> {
        self.tables.borrow().banks.iter().find(|b| b.id == id).cloned().ok_or(Error::DatabaseError(sqlx::Error::RowNotFound))
    }

    async fn get_by_name(&mut self, name: &str) -> Result<Option<Bank>, Error> {
        Ok(self.tables.borrow().banks.iter().find(|b| b.name == name).cloned())
    }

    async fn exists(&mut self, name: &str) -> Result<bool, Error> {
        Ok(self.tables.borrow().banks.iter().any(|b| b.name == name))
    }

    async fn query(&mut self, query: &BankQuery, pagination: Option<Pagination>) -> Result<Vec<BankSummary>, Error> {
        let banks = self
            .tables
            .borrow()
            .banks
            .iter()
            .filter(|b| query.subject_id.map_or(true, |s| b.subject_id == Some(s)))
            .filter(|b| query.name.as_ref().map_or(true, |n| b.name.contains(n.as_str())))
            .filter(|b| !query.published_only || b.is_published)
            .filter(|b| !query.active_only || b.is_active)
            .map(summary)
            .collect();
        Ok(page(banks, pagination))
    }

    async fn count(&mut self, query: &BankQuery) -> Result<i64, Error> {
        Ok(BankCommon::query(self, query, None).await?.len() as i64)
    }

    async fn update(&mut self, id: i32, bank: BankUpdate) -> Result<u64, Error> {
        let mut t = self.tables.borrow_mut();
        let Some(b) = t.banks.iter_mut().find(|b| b.id == id) else {
            return Ok(0);
        };
        if let Some(v) = bank.name {
            b.name = v;
        }
        if let Some(v) = bank.subject_id {
            b.subject_id = Some(v);
        }
        if let Some(v) = bank.questions {
            b.questions = Json(v);
        }
        if let Some(v) = bank.is_published {
            b.is_published = v;
        }
        if let Some(v) = bank.is_active {
            b.is_active = v;
        }
        b.updated_at = Utc::now();
        Ok(1)
    }
}

impl AttemptCommon for MemStore {
    async fn insert(&mut self, attempt: AttemptInsert) -> Result<i32, Error> {
        let mut t = self.tables.borrow_mut();
        let id = t.next_id();
        t.attempts.push(Attempt {
            id,
            user_id: attempt.user_id,
            user_name: attempt.user_name,
            user_email: attempt.user_email,
            bank_id: attempt.bank_id,
            bank_name: attempt.bank_name,
            correct: attempt.score.correct,
            incorrect: attempt.score.incorrect,
            unanswered: attempt.score.unanswered,
            total: attempt.score.total,
            points: attempt.score.points,
            percentage: attempt.score.percentage,
            answers: Json(attempt.answers),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Attempt, Error> {
        self.tables.borrow().attempts.iter().find(|a| a.id == id).cloned().ok_or(Error::DatabaseError(sqlx::Error::RowNotFound))
    }

    async fn query(&mut self, query: &AttemptQuery, pagination: Option<Pagination>) -> Result<Vec<Attempt>, Error> {
        let attempts = self
            .tables
            .borrow()
            .attempts
            .iter()
            .rev()
            .filter(|a| query.user_id.map_or(true, |u| a.user_id == u))
            .filter(|a| query.bank_id.map_or(true, |b| a.bank_id == Some(b)))
            .cloned()
            .collect();
        Ok(page(attempts, pagination))
    }

    async fn count(&mut self, query: &AttemptQuery) -> Result<i64, Error> {
        Ok(AttemptCommon::query(self, query, None).await?.len() as i64)
    }

    async fn rankings(&mut self, bank_id: Option<i32>) -> Result<Vec<RankingRow>, Error> {
        let t = self.tables.borrow();
        let rows = t
            .attempts
            .iter()
            .filter(|a| bank_id.map_or(true, |b| a.bank_id == Some(b)))
            .into_group_map_by(|a| a.user_id)
            .into_iter()
            .map(|(user_id, attempts)| RankingRow {
                user_id,
                user_name: attempts[0].user_name.clone(),
                best_percentage: attempts.iter().map(|a| a.percentage).max().unwrap_or(0),
                best_points: attempts.iter().map(|a| a.points).fold(0.0, f64::max),
                attempts: attempts.len() as i64,
                average_percentage: attempts.iter().map(|a| a.percentage as f64).sum::<f64>() / attempts.len() as f64,
            })
            .collect();
        Ok(rows)
    }
}

impl NotificationCommon for MemStore {
    async fn insert(&mut self, n: NotificationInsert) -> Result<i32, Error> {
        let mut t = self.tables.borrow_mut();
        let id = t.next_id();
        t.notifications.push(Notification {
            id,
            user_id: n.user_id,
            title: n.title,
            message: n.message,
            is_read: false,
            created_at: Utc::now(),
            expires_at: n.expires_at,
        });
        Ok(id)
    }

    async fn broadcast(&mut self, title: &str, message: &str, expires_at: Option<DateTime<Utc>>) -> Result<u64, Error> {
        let user_ids: Vec<i32> = self.tables.borrow().users.iter().map(|u| u.id).collect();
        for user_id in &user_ids {
            NotificationCommon::insert(
                self,
                NotificationInsert {
                    user_id: *user_id,
                    title: title.into(),
                    message: message.into(),
                    expires_at,
                },
            )
            .await?;
        }
        Ok(user_ids.len() as u64)
    }

    async fn query(&mut self, query: &NotificationQuery, pagination: Option<Pagination>) -> Result<Vec<Notification>, Error> {
        let items = self
            .tables
            .borrow()
            .notifications
            .iter()
            .rev()
            .filter(|n| query.user_id.map_or(true, |u| n.user_id == u))
            .filter(|n| !query.unread_only || !n.is_read)
            .filter(|n| match (query.now, n.expires_at) {
                (Some(now), Some(exp)) => exp > now,
                _ => true,
            })
            .cloned()
            .collect();
        Ok(page(items, pagination))
    }

    async fn count(&mut self, query: &NotificationQuery) -> Result<i64, Error> {
        Ok(NotificationCommon::query(self, query, None).await?.len() as i64)
    }

    async fn mark_read(&mut self, user_id: i32, id: i32) -> Result<u64, Error> {
        let mut t = self.tables.borrow_mut();
        Ok(t.notifications.iter_mut().filter(|n| n.id == id && n.user_id == user_id).map(|n| n.is_read = true).count() as u64)
    }

    async fn mark_all_read(&mut self, user_id: i32) -> Result<u64, Error> {
        let mut t = self.tables.borrow_mut();
        Ok(t.notifications.iter_mut().filter(|n| n.user_id == user_id && !n.is_read).map(|n| n.is_read = true).count() as u64)
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let mut t = self.tables.borrow_mut();
        let before = t.notifications.len();
        t.notifications.retain(|n| n.id != id);
        Ok((before - t.notifications.len()) as u64)
    }
}

impl TicketCommon for MemStore {
    async fn insert(&mut self, ticket: TicketInsert) -> Result<i32, Error> {
        let mut t = self.tables.borrow_mut();
        let id = t.next_id();
        t.tickets.push(Ticket {
            id,
            user_id: ticket.user_id,
            name: ticket.name,
            email: ticket.email,
            subject: ticket.subject,
            message: ticket.message,
            status: "open".into(),
            reply: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Ticket, Error> {
        self.tables.borrow().tickets.iter().find(|t| t.id == id).cloned().ok_or(Error::DatabaseError(sqlx::Error::RowNotFound))
    }

    async fn query(&mut self, query: &TicketQuery, pagination: Option<Pagination>) -> Result<Vec<Ticket>, Error> {
        let tickets = self
            .tables
            .borrow()
            .tickets
            .iter()
            .filter(|t| query.status.map_or(true, |s| t.status == s.as_str()))
            .cloned()
            .collect();
        Ok(page(tickets, pagination))
    }

    async fn count(&mut self, query: &TicketQuery) -> Result<i64, Error> {
        Ok(TicketCommon::query(self, query, None).await?.len() as i64)
    }

    async fn update(&mut self, id: i32, update: TicketUpdate) -> Result<u64, Error> {
        let mut t = self.tables.borrow_mut();
        let Some(ticket) = t.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(0);
        };
        if let Some(s) = update.status {
            ticket.status = s.as_str().into();
        }
        if let Some(r) = update.reply {
            ticket.reply = Some(r);
        }
        ticket.updated_at = Utc::now();
        Ok(1)
    }
}

impl ResetTokenCommon for MemStore {
    async fn insert(&mut self, token: ResetTokenInsert) -> Result<i32, Error> {
        let mut t = self.tables.borrow_mut();
        let id = t.next_id();
        t.tokens.push(ResetToken {
            id,
            user_id: token.user_id,
            token_hash: token.token_hash,
            expires_at: token.expires_at,
            used: false,
        });
        Ok(id)
    }

    async fn get_valid(&mut self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<ResetToken>, Error> {
        Ok(self.tables.borrow().tokens.iter().find(|t| t.token_hash == token_hash && !t.used && t.expires_at > now).cloned())
    }

    async fn mark_used(&mut self, id: i32) -> Result<(), Error> {
        self.tables.borrow_mut().tokens.iter_mut().filter(|t| t.id == id).for_each(|t| t.used = true);
        Ok(())
    }
}

impl Common for MemStore {}
impl Store for MemStore {}

impl TxStore for MemStore {
    async fn commit(self) -> Result<(), Error> {
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        Ok(())
    }
}

/// Reversible stand-in for bcrypt so tests stay fast.
pub struct PlainHasher;

impl Hasher for PlainHasher {
    fn hash_password(&self, password: &str) -> Result<String, Error> {
        Ok(format!("plain${}", password))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, Error> {
        Ok(hash == format!("plain${}", password))
    }
}

#[derive(Default)]
pub struct MemMailer {
    sent: RefCell<Vec<Email>>,
}

impl MemMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.borrow().clone()
    }
}

impl Mailer for MemMailer {
    async fn send(&self, email: Email) -> Result<(), Error> {
        self.sent.borrow_mut().push(email);
        Ok(())
    }
}

pub struct FailingMailer;

impl Mailer for FailingMailer {
    async fn send(&self, _: Email) -> Result<(), Error> {
        Err(Error::MailError("smtp down".into()))
    }
}

#[derive(Default)]
pub struct MemFiles {
    pub banks: HashMap<String, serde_json::Value>,
}

impl BankFiles for MemFiles {
    fn load(&self, name: &str) -> Result<Option<serde_json::Value>, Error> {
        Ok(self.banks.get(name).cloned())
    }
}
