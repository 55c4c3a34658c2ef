use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Learning content, quizzes, subtopic summaries and reviews are forwarded as
// the `serde_json::Value` the model produced. Only MCQs are typed, because
// shuffling needs their fields.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicQuery {
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtopicQuery {
    pub subtopic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRequest {
    pub topic: String,
    #[serde(default)]
    pub weak_topics: Option<Vec<String>>,
}

/// One item of the per-subtopic MCQ generation, before shuffling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMcq {
    pub question: String,
    pub correct_answer: String,
    pub wrong_options: Vec<String>,
}

/// A shuffled MCQ. The correct option is found by value, not by position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mcq {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Option numbers the user picked, index-aligned with `questions`
    pub answers: Vec<i64>,
    pub questions: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub subtopic: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeaknessReport {
    pub weak_topics: Vec<String>,
}
