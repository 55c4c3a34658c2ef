use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    errors::{ErrorBody, ErrorContext, RawField},
    llm_service::LLMService,
    models::*,
    weakness,
};

// Import logging macros
use crate::{log_api_start, log_api_success};

#[derive(Clone)]
pub struct AppState {
    pub llm_service: LLMService,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: &'static str,
    pub model: String,
}

fn array_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

pub async fn root() -> Json<Value> {
    log_api_start!("root");
    Json(json!({ "message": "Learning API is running" }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider: state.llm_service.provider_name(),
        model: state.llm_service.model_name().to_string(),
    })
}

// Content endpoints
pub async fn generate_learning_content(
    State(state): State<AppState>,
    Json(request): Json<TopicQuery>,
) -> ApiResult<Value> {
    log_api_start!("generate_learning_content", topic = request.topic);

    match state.llm_service.generate_learning_content(&request).await {
        Ok(content) => {
            let count = array_len(content.get("subtopics"));
            log_api_success!(
                "generate_learning_content",
                topic = request.topic,
                count = count,
                "learning content generated"
            );
            Ok(Json(content))
        }
        Err(e) => {
            let context = ErrorContext::new("generate_learning_content", "learning_content")
                .with_topic(&request.topic);
            Err(e.to_response_with_context(context))
        }
    }
}

pub async fn generate_subtopic_summaries(
    State(state): State<AppState>,
    Json(request): Json<TopicQuery>,
) -> ApiResult<Value> {
    log_api_start!("generate_subtopic_summaries", topic = request.topic);

    match state.llm_service.generate_subtopic_summaries(&request).await {
        Ok(summaries) => {
            log_api_success!(
                "generate_subtopic_summaries",
                topic = request.topic,
                count = array_len(Some(&summaries)),
                "subtopics generated"
            );
            Ok(Json(summaries))
        }
        Err(e) => {
            let context = ErrorContext::new("generate_subtopic_summaries", "subtopic")
                .with_topic(&request.topic)
                .with_raw_field(RawField::Response);
            Err(e.to_response_with_context(context))
        }
    }
}

// Quiz endpoints
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(request): Json<QuizRequest>,
) -> ApiResult<Value> {
    info!(
        topic = %request.topic,
        weak_topics = ?request.weak_topics,
        "Generating quiz"
    );

    match state.llm_service.generate_quiz(&request).await {
        Ok(quiz) => {
            log_api_success!(
                "generate_quiz",
                topic = request.topic,
                count = array_len(quiz.get("questions")),
                "quiz generated"
            );
            Ok(Json(quiz))
        }
        Err(e) => {
            let context = ErrorContext::new("generate_quiz", "quiz").with_topic(&request.topic);
            Err(e.to_response_with_context(context))
        }
    }
}

pub async fn generate_mcqs(
    State(state): State<AppState>,
    Json(request): Json<SubtopicQuery>,
) -> ApiResult<Vec<Mcq>> {
    log_api_start!("generate_mcqs", topic = request.subtopic);

    match state.llm_service.generate_mcqs(&request).await {
        Ok(mcqs) => {
            log_api_success!(
                "generate_mcqs",
                topic = request.subtopic,
                count = mcqs.len(),
                "questions shuffled"
            );
            Ok(Json(mcqs))
        }
        Err(e) => {
            let context = ErrorContext::new("generate_mcqs", "mcq")
                .with_topic(&request.subtopic)
                .with_raw_field(RawField::Response);
            Err(e.to_response_with_context(context))
        }
    }
}

// Review endpoints
pub async fn review_answers(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Value> {
    info!(
        answer_count = request.answers.len(),
        question_count = request.questions.len(),
        "Reviewing quiz answers"
    );

    match state.llm_service.review_answers(&request).await {
        Ok(review) => {
            log_api_success!(
                "review_answers",
                count = array_len(review.get("weak_topics")),
                "answers reviewed"
            );
            Ok(Json(review))
        }
        Err(e) => {
            let context = ErrorContext::new("review_answers", "review");
            Err(e.to_response_with_context(context))
        }
    }
}

pub async fn analyze_weakness(Json(answers): Json<Vec<AnswerRecord>>) -> Json<WeaknessReport> {
    log_api_start!("analyze_weakness", count = answers.len());

    let report = weakness::analyze_weakness(&answers);
    log_api_success!(
        "analyze_weakness",
        count = report.weak_topics.len(),
        "weak topics identified"
    );
    Json(report)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Learning content routes
        .route("/v1/generate_subtopics", post(generate_learning_content))
        .route("/v2/generate_subtopics", post(generate_subtopic_summaries))
        .route("/generate_subtopics", post(generate_subtopic_summaries))
        // Quiz routes
        .route("/quiz", post(generate_quiz))
        .route("/generate_mcqs", post(generate_mcqs))
        // Review routes
        .route("/review_answers", post(review_answers))
        .route("/analyze_weakness", post(analyze_weakness))
        .with_state(state)
}
