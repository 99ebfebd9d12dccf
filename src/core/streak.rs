use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub current: i32,
    pub max: i32,
}

/// Streak after a login on `today`.
pub fn advance(last_login: Option<NaiveDate>, today: NaiveDate, streak: Streak) -> Streak {
    let current = match last_login {
        Some(last) if last == today => streak.current.max(1),
        Some(last) if today.pred_opt() == Some(last) => streak.current + 1,
        _ => 1,
    };
    Streak {
        current,
        max: streak.max.max(current),
    }
}
