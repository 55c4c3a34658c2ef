//! Prompt templates for every generation endpoint.
//!
//! Each builder is a pure function: caller strings are substituted verbatim,
//! followed by a literal example of the JSON the model must answer with.

use serde_json::{Map, Value};

/// Overview, subtopics and free resources for a topic, as one JSON object
pub fn learning_content_prompt(topic: &str) -> String {
    format!(
        r#"You are an educational content generator.
Topic: {}

Return JSON in the following format:
{{
    "overview": "Brief overview of the topic",
    "subtopics": [
        {{
            "name": "Subtopic Name",
            "description": "A short overview of the subtopic"
        }}
    ],
    "resources": [
        {{
            "title": "Resource Name",
            "link": "https://...",
            "type": "YouTube/Website/Course",
            "description": "Why this resource is good"
        }}
    ]
}}

Resources should be free and specific (e.g., Kaggle for Machine Learning, FreeCodeCamp, etc.)
Do not add anything outside JSON."#,
        topic
    )
}

/// Sentence steering the quiz toward weak topics, or nothing when there are none
fn weak_topic_focus(weak_topics: &[String]) -> String {
    if weak_topics.is_empty() {
        return String::new();
    }
    format!(
        "Focus 3 out of 5 questions on these weak topics: {}.",
        weak_topics.join(", ")
    )
}

/// Five-question quiz with numbered correct options
pub fn quiz_prompt(topic: &str, weak_topics: &[String]) -> String {
    format!(
        r#"Generate a quiz on the topic: {}.
{}

Return JSON in the following format:
{{
    "questions": [
        {{
            "question": "Question text",
            "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
            "correct_option": 2
        }}
    ]
}}

correct_option is the number (1-4) of the correct answer, not the full text.
Do not add explanations here.
Limit to exactly 5 questions.
Do not add anything outside JSON."#,
        topic,
        weak_topic_focus(weak_topics)
    )
}

/// Review of a finished quiz: the original questions and the user's option numbers
pub fn review_prompt(questions: &[Map<String, Value>], answers: &[i64]) -> String {
    let questions_json = serde_json::to_string(questions).unwrap_or_else(|_| "[]".to_string());
    let answers_list = answers
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are reviewing a quiz.
Questions with correct_option numbers:
{}

User answers (numbers only, same order as questions):
[{}]

Return JSON in the following format:
{{
    "correct_count": X,
    "incorrect_count": Y,
    "incorrect_details": [
        {{
            "question": "The question text",
            "user_answer": "User's chosen option text",
            "correct_answer": "Correct option text",
            "topic": "The topic this question belongs to",
            "explanation": "Why the correct answer is right and the user answer is wrong"
        }}
    ],
    "weak_topics": ["List of weak topics based on mistakes"]
}}
Do not add anything outside JSON."#,
        questions_json, answers_list
    )
}

/// Four or five subtopics with two-line summaries, as a bare JSON array
pub fn subtopic_summaries_prompt(topic: &str) -> String {
    format!(
        r#"List 4-5 important subtopics of the topic: "{}".

For each subtopic, include:
- "title": the subtopic name
- "summary": a short 2-line summary

IMPORTANT:
- Output should be a pure JSON array
- No explanations or text before/after
- Like this:

[
  {{
    "title": "Subtopic Name",
    "summary": "Brief summary."
  }},
  ...
]"#,
        topic
    )
}

/// Exactly five MCQs, each with one correct answer and three distractors
pub fn mcq_prompt(subtopic: &str) -> String {
    format!(
        r#"Generate exactly 5 multiple choice questions for the subtopic: "{}".

For each question, include:
- "question": the question text
- "correct_answer": the correct answer
- "wrong_options": list of 3 incorrect options

IMPORTANT:
- Respond ONLY with valid JSON array
- No explanations or text before/after
- Format:

[
  {{
    "question": "...",
    "correct_answer": "...",
    "wrong_options": ["...", "...", "..."]
  }},
  ...
]"#,
        subtopic
    )
}
