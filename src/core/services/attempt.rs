use crate::core::{
    models::{
        attempt::{Attempt, Insert as AttemptInsert, Query as AttemptQuery, Ranking, RankingQuery, Submit, Submitted},
        common::Pagination,
    },
    ports::{
        bank_files::BankFiles,
        repository::{AttemptCommon, Store, UserCommon},
    },
    ranking::rank,
    scoring::score,
    services::bank::load_bank,
};
use crate::error::Error;

pub const DEFAULT_RANKING_LIMIT: i64 = 10;
pub const MAX_RANKING_LIMIT: i64 = 100;

/// Scores the submission against the current bank and records the attempt.
pub async fn submit<S, F>(store: &mut S, files: Option<&F>, user_id: i32, submit: Submit) -> Result<Submitted, Error>
where
    S: Store,
    F: BankFiles,
{
    let user = UserCommon::get(store, user_id).await?;
    let bank = load_bank(store, files, &submit.bank, false).await?;
    if bank.questions.is_empty() {
        return Err(Error::BusinessError(format!("bank {} has no questions", bank.name)));
    }
    let score = score(&bank.questions, &submit.answers);
    let id = AttemptCommon::insert(
        store,
        AttemptInsert {
            user_id,
            user_name: user.name,
            user_email: user.email,
            bank_id: bank.id,
            bank_name: bank.name.clone(),
            score,
            answers: serde_json::to_value(&submit.answers)?,
        },
    )
    .await?;
    log::info!("user {} scored {}% on bank {}", user_id, score.percentage, bank.name);
    Ok(Submitted {
        id,
        bank_name: bank.name,
        score,
    })
}

pub async fn list_attempts<S>(store: &mut S, query: AttemptQuery, pagination: Pagination) -> Result<(Vec<Attempt>, i64), Error>
where
    S: Store,
{
    let total = AttemptCommon::count(store, &query).await?;
    let attempts = AttemptCommon::query(store, &query, Some(pagination)).await?;
    Ok((attempts, total))
}

/// Another user's attempt is reported as missing rather than forbidden.
pub async fn attempt_detail<S>(store: &mut S, user_id: i32, id: i32) -> Result<Attempt, Error>
where
    S: Store,
{
    let attempt = AttemptCommon::get(store, id).await?;
    if attempt.user_id != user_id {
        return Err(Error::NotFound("attempt".into()));
    }
    Ok(attempt)
}

pub async fn rankings<S>(store: &mut S, query: RankingQuery) -> Result<Vec<Ranking>, Error>
where
    S: Store,
{
    let limit = query.limit.unwrap_or(DEFAULT_RANKING_LIMIT).clamp(1, MAX_RANKING_LIMIT) as usize;
    let rows = AttemptCommon::rankings(store, query.bank_id).await?;
    Ok(rank(rows).into_iter().take(limit).collect())
}
