use serde_json::Value;

use crate::core::{
    models::{
        bank::{Bank, BankSummary, Insert as BankInsert, NormalizedBank, Query as BankQuery, Source, Update as BankUpdate},
        common::Pagination,
    },
    normalize::normalize_bank,
    ports::{
        bank_files::BankFiles,
        repository::{BankCommon, Store},
    },
    services::{found, require},
};
use crate::error::Error;

fn check_questions(questions: &Value) -> Result<(), Error> {
    let ok = match questions {
        Value::Array(_) => true,
        Value::Object(o) => matches!(o.get("questions"), Some(Value::Array(_))),
        _ => false,
    };
    if !ok {
        return Err(Error::BusinessError("questions must be an array or an object with a questions array".into()));
    }
    Ok(())
}

fn normalized(bank: Bank) -> NormalizedBank {
    NormalizedBank {
        id: Some(bank.id),
        questions: normalize_bank(&bank.name, &bank.questions.0),
        name: bank.name,
        subject_id: bank.subject_id,
        source: Source::Database,
    }
}

async fn find<S>(store: &mut S, key: &str) -> Result<Option<Bank>, Error>
where
    S: Store,
{
    if let Ok(id) = key.parse::<i32>() {
        match BankCommon::get(store, id).await {
            Ok(bank) => return Ok(Some(bank)),
            Err(Error::DatabaseError(sqlx::Error::RowNotFound)) => {}
            Err(e) => return Err(e),
        }
    }
    BankCommon::get_by_name(store, key).await
}

/// Looks a bank up by id or name, falling back to the flat-file directory.
/// Unpublished or deleted database banks are hidden unless `include_hidden`.
pub async fn load_bank<S, F>(store: &mut S, files: Option<&F>, key: &str, include_hidden: bool) -> Result<NormalizedBank, Error>
where
    S: Store,
    F: BankFiles,
{
    let key = key.trim();
    if let Some(bank) = find(store, key).await? {
        if include_hidden || (bank.is_published && bank.is_active) {
            return Ok(normalized(bank));
        }
        return Err(Error::NotFound(format!("bank {}", key)));
    }
    if let Some(files) = files {
        if let Some(stored) = files.load(key)? {
            return Ok(NormalizedBank {
                id: None,
                questions: normalize_bank(key, &stored),
                name: key.to_owned(),
                subject_id: None,
                source: Source::File,
            });
        }
    }
    Err(Error::NotFound(format!("bank {}", key)))
}

pub async fn list_banks<S>(store: &mut S, query: BankQuery, pagination: Pagination) -> Result<(Vec<BankSummary>, i64), Error>
where
    S: Store,
{
    let total = BankCommon::count(store, &query).await?;
    let banks = BankCommon::query(store, &query, Some(pagination)).await?;
    Ok((banks, total))
}

pub async fn get_bank<S>(store: &mut S, id: i32) -> Result<Bank, Error>
where
    S: Store,
{
    BankCommon::get(store, id).await
}

pub async fn create_bank<S>(store: &mut S, mut bank: BankInsert) -> Result<i32, Error>
where
    S: Store,
{
    bank.name = require(&bank.name, "name", 255)?;
    check_questions(&bank.questions)?;
    if BankCommon::exists(store, &bank.name).await? {
        return Err(Error::Conflict(format!("bank {} already exists", bank.name)));
    }
    let name = bank.name.clone();
    let id = BankCommon::insert(store, bank).await?;
    log::info!("created bank {} ({})", id, name);
    Ok(id)
}

pub async fn update_bank<S>(store: &mut S, id: i32, mut update: BankUpdate) -> Result<Bank, Error>
where
    S: Store,
{
    let current = BankCommon::get(store, id).await?;
    if let Some(name) = &update.name {
        let name = require(name, "name", 255)?;
        if name != current.name && BankCommon::exists(store, &name).await? {
            return Err(Error::Conflict(format!("bank {} already exists", name)));
        }
        update.name = Some(name);
    }
    if let Some(questions) = &update.questions {
        check_questions(questions)?;
    }
    found(BankCommon::update(store, id, update).await?, "bank")?;
    BankCommon::get(store, id).await
}

/// Soft delete: the bank stays for attempt history but disappears from
/// public listings.
pub async fn delete_bank<S>(store: &mut S, id: i32) -> Result<u64, Error>
where
    S: Store,
{
    found(
        BankCommon::update(
            store,
            id,
            BankUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?,
        "bank",
    )
}
