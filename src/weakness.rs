use std::collections::HashMap;

use crate::models::{AnswerRecord, WeaknessReport};

/// Mistakes needed before a subtopic counts as weak
pub const WEAK_TOPIC_THRESHOLD: u32 = 2;

/// Tally mistakes per subtopic and report those at or above the threshold.
///
/// Subtopics come out in the order their first mistake appeared in `answers`.
pub fn analyze_weakness(answers: &[AnswerRecord]) -> WeaknessReport {
    let mut order: Vec<&str> = Vec::new();
    let mut mistakes: HashMap<&str, u32> = HashMap::new();

    for answer in answers.iter().filter(|a| !a.is_correct) {
        let count = mistakes.entry(answer.subtopic.as_str()).or_insert_with(|| {
            order.push(answer.subtopic.as_str());
            0
        });
        *count += 1;
    }

    let weak_topics = order
        .into_iter()
        .filter(|subtopic| mistakes.get(subtopic).copied().unwrap_or(0) >= WEAK_TOPIC_THRESHOLD)
        .map(str::to_string)
        .collect();

    WeaknessReport { weak_topics }
}
