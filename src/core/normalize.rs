//! Coerces stored question banks into one shape: lettered options and
//! lettered answers.

use serde_json::Value;

use crate::core::models::bank::{Choice, NormalizedQuestion};

/// Letter for a 0-based option index: 0 -> "a", 25 -> "z", 26 -> "aa".
pub fn index_to_key(mut index: usize) -> String {
    let mut key = Vec::new();
    loop {
        key.push((b'a' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    key.into_iter().rev().collect()
}

fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn normalize_options(raw: Option<&Value>) -> Vec<Choice> {
    let Some(Value::Array(opts)) = raw else {
        return Vec::new();
    };
    opts.iter()
        .enumerate()
        .map(|(i, opt)| match opt {
            Value::Object(o) => {
                let key = o.get("key").map(text_of).unwrap_or_default().trim().to_lowercase();
                let text = o.get("text").or_else(|| o.get("label")).map(text_of).unwrap_or_default();
                Choice {
                    key: if key.is_empty() { index_to_key(i) } else { key },
                    text,
                }
            }
            other => Choice {
                key: index_to_key(i),
                text: text_of(other),
            },
        })
        .collect()
}

fn answer_letter(v: &Value) -> Option<String> {
    match v {
        Value::Number(n) => n.as_u64().map(|i| index_to_key(i as usize)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else if s.chars().all(|c| c.is_ascii_digit()) {
                s.parse::<usize>().ok().map(index_to_key)
            } else {
                Some(s.to_lowercase())
            }
        }
        _ => None,
    }
}

fn normalize_answer(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items.iter().filter_map(answer_letter).collect(),
        Some(v) => answer_letter(v).into_iter().collect(),
        None => Vec::new(),
    }
}

fn normalize_question(bank: &str, index: usize, raw: &Value) -> NormalizedQuestion {
    let empty = serde_json::Map::new();
    let q = raw.as_object().unwrap_or(&empty);
    let id = q.get("id").map(text_of).filter(|s| !s.is_empty()).unwrap_or_else(|| format!("{}-{}", bank, index));
    let question = q.get("question").or_else(|| q.get("text")).map(text_of).unwrap_or_default();
    let answer = normalize_answer(q.get("answer").or_else(|| q.get("answers")).or_else(|| q.get("correct")));
    let explanation = q.get("explanation").map(text_of).filter(|s| !s.is_empty());
    NormalizedQuestion {
        id,
        question,
        options: normalize_options(q.get("options")),
        multiple: answer.len() > 1,
        answer,
        explanation,
    }
}

/// Extracts the question list from either a bare array or an object with a
/// `questions` array. Anything else is an empty bank.
pub fn raw_questions(stored: &Value) -> &[Value] {
    match stored {
        Value::Array(items) => items.as_slice(),
        Value::Object(o) => match o.get("questions") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    }
}

pub fn normalize_bank(bank: &str, stored: &Value) -> Vec<NormalizedQuestion> {
    raw_questions(stored).iter().enumerate().map(|(i, q)| normalize_question(bank, i, q)).collect()
}
