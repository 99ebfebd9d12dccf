use std::collections::{HashMap, HashSet};

use crate::core::models::attempt::{Score, Selection};
use crate::core::models::bank::NormalizedQuestion;

pub const PENALTY: f64 = 0.33;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    Unanswered,
}

pub fn judge(question: &NormalizedQuestion, selection: Option<&Selection>) -> Outcome {
    let submitted = selection.map(Selection::letters).unwrap_or_default();
    if submitted.is_empty() {
        return Outcome::Unanswered;
    }
    let correct: Vec<String> = question.answer.iter().map(|a| a.to_lowercase()).collect();
    let is_correct = if question.multiple {
        let submitted: HashSet<&String> = submitted.iter().collect();
        let correct: HashSet<&String> = correct.iter().collect();
        submitted == correct
    } else {
        submitted.len() == 1 && correct.len() == 1 && submitted[0] == correct[0]
    };
    if is_correct {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn score(questions: &[NormalizedQuestion], answers: &HashMap<String, Selection>) -> Score {
    let (mut correct, mut incorrect, mut unanswered) = (0, 0, 0);
    for q in questions {
        match judge(q, answers.get(&q.id)) {
            Outcome::Correct => correct += 1,
            Outcome::Incorrect => incorrect += 1,
            Outcome::Unanswered => unanswered += 1,
        }
    }
    let total = questions.len() as i32;
    let points = (correct as f64 - PENALTY * incorrect as f64).max(0.0);
    let percentage = if total == 0 { 0 } else { (points / total as f64 * 100.0).round() as i32 };
    Score {
        correct,
        incorrect,
        unanswered,
        total,
        points: round2(points),
        percentage,
    }
}
