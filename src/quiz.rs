use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;

use crate::models::{GeneratedMcq, Mcq};

/// Merge the correct answer into the distractors and shuffle the result
pub fn shuffle_mcq<R: Rng + ?Sized>(item: GeneratedMcq, rng: &mut R) -> Mcq {
    let GeneratedMcq {
        question,
        correct_answer,
        mut wrong_options,
    } = item;

    wrong_options.push(correct_answer.clone());
    wrong_options.shuffle(rng);

    Mcq {
        question,
        options: wrong_options,
        answer: correct_answer,
    }
}

pub fn shuffle_mcqs<R: Rng + ?Sized>(items: Vec<GeneratedMcq>, rng: &mut R) -> Vec<Mcq> {
    items
        .into_iter()
        .map(|item| shuffle_mcq(item, &mut *rng))
        .collect()
}

/// Distinct non-empty `topic` strings of the incorrect answers, in first-seen
/// order. Entries without a string topic are skipped.
pub fn weak_topics_from_details(details: &[Value]) -> Vec<String> {
    let mut weak_topics: Vec<String> = Vec::new();
    for topic in details.iter().filter_map(|d| d.get("topic").and_then(Value::as_str)) {
        if !topic.is_empty() && !weak_topics.iter().any(|t| t == topic) {
            weak_topics.push(topic.to_string());
        }
    }
    weak_topics
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn generated(question: &str, correct: &str, wrong: [&str; 3]) -> GeneratedMcq {
        GeneratedMcq {
            question: question.to_string(),
            correct_answer: correct.to_string(),
            wrong_options: wrong.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn detail(topic: &str) -> Value {
        json!({"question": "q", "user_answer": "a", "correct_answer": "b", "topic": topic})
    }

    #[test]
    fn test_shuffled_options_are_permutation_of_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        for seed_round in 0..50 {
            let item = generated("Q", "right", ["w1", "w2", "w3"]);
            let mcq = shuffle_mcq(item, &mut rng);

            let mut sorted = mcq.options.clone();
            sorted.sort();
            assert_eq!(sorted, vec!["right", "w1", "w2", "w3"], "round {}", seed_round);
            assert_eq!(mcq.answer, "right");
            assert!(mcq.options.contains(&mcq.answer));
        }
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let items = || vec![generated("Q1", "a", ["b", "c", "d"]), generated("Q2", "e", ["f", "g", "h"])];
        let first = shuffle_mcqs(items(), &mut StdRng::seed_from_u64(42));
        let second = shuffle_mcqs(items(), &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_shuffle_moves_correct_answer_around() {
        let mut rng = StdRng::seed_from_u64(1);
        let positions: std::collections::HashSet<usize> = (0..100)
            .map(|_| {
                let mcq = shuffle_mcq(generated("Q", "a", ["b", "c", "d"]), &mut rng);
                mcq.options.iter().position(|o| o == "a").unwrap()
            })
            .collect();
        assert!(positions.len() > 1);
    }

    #[test]
    fn test_duplicate_correct_answer_text_is_kept() {
        let mcq = shuffle_mcq(generated("Q", "same", ["same", "x", "y"]), &mut StdRng::seed_from_u64(3));
        assert_eq!(mcq.options.iter().filter(|o| *o == "same").count(), 2);
    }

    #[test]
    fn test_weak_topics_dedup_in_first_seen_order() {
        let details = vec![detail("t1"), detail("t2"), detail("t1"), detail("t3")];
        assert_eq!(weak_topics_from_details(&details), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_weak_topics_skip_empty_absent_and_non_string() {
        let details = vec![
            json!({"question": "q"}),
            detail(""),
            json!({"topic": 7}),
            json!({"topic": null}),
            json!("not an object"),
            detail("Borrowing"),
        ];
        assert_eq!(weak_topics_from_details(&details), vec!["Borrowing"]);
        assert!(weak_topics_from_details(&[]).is_empty());
    }
}
