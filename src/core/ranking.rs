use itertools::Itertools;
use std::cmp::Ordering;

use crate::core::models::attempt::{Ranking, RankingRow};

fn compare(a: &RankingRow, b: &RankingRow) -> Ordering {
    b.best_percentage
        .cmp(&a.best_percentage)
        .then_with(|| b.best_points.total_cmp(&a.best_points))
        .then_with(|| a.attempts.cmp(&b.attempts))
        .then_with(|| a.user_name.cmp(&b.user_name))
}

fn ties(a: &RankingRow, b: &RankingRow) -> bool {
    a.best_percentage == b.best_percentage && a.best_points == b.best_points
}

/// Orders aggregates and assigns competition positions (1, 1, 3).
pub fn rank(rows: Vec<RankingRow>) -> Vec<Ranking> {
    let sorted = rows.into_iter().sorted_by(compare).collect_vec();
    let mut rankings: Vec<Ranking> = Vec::with_capacity(sorted.len());
    for (i, row) in sorted.iter().enumerate() {
        let position = match i.checked_sub(1).map(|p| &sorted[p]) {
            Some(prev) if ties(prev, row) => rankings[i - 1].position,
            _ => i + 1,
        };
        rankings.push(Ranking {
            position,
            user_id: row.user_id,
            user_name: row.user_name.clone(),
            best_percentage: row.best_percentage,
            best_points: row.best_points,
            attempts: row.attempts,
            average_percentage: (row.average_percentage * 100.0).round() / 100.0,
        });
    }
    rankings
}
