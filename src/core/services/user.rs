use chrono::{DateTime, Duration, Utc};
use hex::ToHex;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::core::{
    email,
    models::{
        common::Pagination,
        reset_token::{Confirm as ResetConfirm, Insert as ResetTokenInsert},
        user::{Claim, Insert as UserInsert, LoginOutcome, Patch as UserPatch, Preferences, Profile, Query as UserQuery, Registration},
    },
    ports::{
        hasher::Hasher,
        mailer::{deliver, Mailer},
        repository::{ResetTokenCommon, Store, TxStore, UserCommon},
        tokener::Tokener,
    },
    profanity::contains_profanity,
    services::{found, require, require_email},
    streak::{self, Streak},
};
use crate::error::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

fn check_password(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::BusinessError(format!("password must have at least {} characters", MIN_PASSWORD_LEN)));
    }
    Ok(())
}

pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token);
    hasher.finalize().encode_hex()
}

pub async fn register<S, H, M>(store: &mut S, hasher: &H, mailer: &M, registration: Registration) -> Result<i32, Error>
where
    S: Store,
    H: Hasher,
    M: Mailer,
{
    let name = require(&registration.name, "name", 64)?;
    if contains_profanity(&name) {
        return Err(Error::BusinessError("name contains inappropriate language".into()));
    }
    let email = require_email(&registration.email)?;
    check_password(&registration.password)?;
    if UserCommon::name_exists(store, &name).await? {
        return Err(Error::Conflict(format!("name {} already taken", name)));
    }
    if UserCommon::email_exists(store, &email).await? {
        return Err(Error::Conflict(format!("email {} already registered", email)));
    }
    let id = UserCommon::insert(
        store,
        UserInsert {
            name: name.clone(),
            email: email.clone(),
            password: hasher.hash_password(&registration.password)?,
        },
    )
    .await?;
    log::info!("registered user {} ({})", id, name);
    deliver(mailer, email::welcome(&email, &name)).await;
    Ok(id)
}

pub async fn login<S, H, T>(store: &mut S, hasher: &H, tokener: &T, ttl_days: i64, login: &str, password: &str, now: DateTime<Utc>) -> Result<LoginOutcome, Error>
where
    S: Store,
    H: Hasher,
    T: Tokener<Claim>,
{
    let Some(mut user) = UserCommon::get_by_login(store, login.trim()).await? else {
        return Err(Error::Unauthorized);
    };
    if !hasher.verify_password(password, &user.password)? {
        return Err(Error::Unauthorized);
    }
    let today = now.date_naive();
    let s = streak::advance(
        user.last_login,
        today,
        Streak {
            current: user.streak,
            max: user.max_streak,
        },
    );
    UserCommon::patch(
        store,
        user.id,
        UserPatch {
            streak: Some(s.current),
            max_streak: Some(s.max),
            last_login: Some(today),
            ..Default::default()
        },
    )
    .await?;
    user.streak = s.current;
    user.max_streak = s.max;
    user.last_login = Some(today);
    let claim = Claim {
        user: user.id.to_string(),
        exp: (now + Duration::days(ttl_days)).timestamp(),
    };
    let token = tokener.gen_token(&claim)?;
    Ok(LoginOutcome { token, user: user.into() })
}

pub async fn profile<S>(store: &mut S, id: i32) -> Result<Profile, Error>
where
    S: Store,
{
    Ok(UserCommon::get(store, id).await?.into())
}

pub async fn update_preferences<S>(store: &mut S, id: i32, preferences: Preferences) -> Result<Profile, Error>
where
    S: Store,
{
    UserCommon::patch(
        store,
        id,
        UserPatch {
            notify_email: preferences.notify_email,
            notify_site: preferences.notify_site,
            ..Default::default()
        },
    )
    .await?;
    profile(store, id).await
}

pub async fn change_password<S, H>(store: &mut S, hasher: &H, id: i32, current: &str, new: &str) -> Result<(), Error>
where
    S: Store,
    H: Hasher,
{
    let user = UserCommon::get(store, id).await?;
    if !hasher.verify_password(current, &user.password)? {
        return Err(Error::BusinessError("current password is incorrect".into()));
    }
    check_password(new)?;
    UserCommon::patch(
        store,
        id,
        UserPatch {
            password: Some(hasher.hash_password(new)?),
            ..Default::default()
        },
    )
    .await
}

/// Always succeeds for well-formed input so callers cannot probe which
/// emails have accounts.
pub async fn request_password_reset<S, M>(store: &mut S, mailer: &M, email: &str, app_url: &str, ttl_minutes: i64, now: DateTime<Utc>) -> Result<(), Error>
where
    S: Store,
    M: Mailer,
{
    // Same answer for malformed, unknown and registered addresses.
    let Ok(email) = require_email(email) else {
        log::info!("password reset requested for malformed email");
        return Ok(());
    };
    let Some(user) = UserCommon::get_by_email(store, &email).await? else {
        log::info!("password reset requested for unknown email {}", email);
        return Ok(());
    };
    let token = Uuid::new_v4().simple().to_string();
    ResetTokenCommon::insert(
        store,
        ResetTokenInsert {
            user_id: user.id,
            token_hash: hash_token(&token),
            expires_at: now + Duration::minutes(ttl_minutes),
        },
    )
    .await?;
    deliver(mailer, email::password_reset(&user.email, &user.name, app_url, &token, ttl_minutes)).await;
    Ok(())
}

pub async fn confirm_password_reset<S, H>(mut store: S, hasher: &H, confirm: ResetConfirm, now: DateTime<Utc>) -> Result<(), Error>
where
    S: TxStore,
    H: Hasher,
{
    check_password(&confirm.password)?;
    let Some(token) = ResetTokenCommon::get_valid(&mut store, &hash_token(confirm.token.trim()), now).await? else {
        store.rollback().await?;
        return Err(Error::BusinessError("invalid or expired reset token".into()));
    };
    ResetTokenCommon::mark_used(&mut store, token.id).await?;
    UserCommon::patch(
        &mut store,
        token.user_id,
        UserPatch {
            password: Some(hasher.hash_password(&confirm.password)?),
            ..Default::default()
        },
    )
    .await?;
    store.commit().await?;
    log::info!("password reset for user {}", token.user_id);
    Ok(())
}

pub async fn list_users<S>(store: &mut S, query: UserQuery, pagination: Pagination) -> Result<(Vec<Profile>, i64), Error>
where
    S: Store,
{
    let total = UserCommon::count(store, &query).await?;
    let users = UserCommon::query(store, &query, Some(pagination)).await?;
    Ok((users.into_iter().map(Profile::from).collect(), total))
}

pub async fn set_admin<S>(store: &mut S, acting_id: i32, id: i32, is_admin: bool) -> Result<Profile, Error>
where
    S: Store,
{
    if acting_id == id && !is_admin {
        return Err(Error::BusinessError("cannot revoke your own admin rights".into()));
    }
    UserCommon::get(store, id).await?;
    UserCommon::patch(
        store,
        id,
        UserPatch {
            is_admin: Some(is_admin),
            ..Default::default()
        },
    )
    .await?;
    profile(store, id).await
}

pub async fn delete_user<S>(store: &mut S, acting_id: i32, id: i32) -> Result<u64, Error>
where
    S: Store,
{
    if acting_id == id {
        return Err(Error::BusinessError("cannot delete yourself".into()));
    }
    found(UserCommon::delete(store, id).await?, "user")
}
