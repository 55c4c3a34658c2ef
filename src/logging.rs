//! Standardized logging macros so every route and LLM call reports the same
//! field names (`operation`, `topic`, `provider`, `duration_ms`, ...).

// Macros file - tracing macros are imported within the macro definitions

// ============================================================================
// API Operation Logging Macros
// ============================================================================

/// Log the start of an API operation
#[macro_export]
macro_rules! log_api_start {
    ($operation:expr, topic = $topic:expr) => {
        tracing::debug!(
            operation = $operation,
            topic = %$topic,
            "API operation started"
        );
    };
    ($operation:expr, count = $count:expr) => {
        tracing::debug!(
            operation = $operation,
            count = $count,
            "API operation started"
        );
    };
    ($operation:expr) => {
        tracing::debug!(operation = $operation, "API operation started");
    };
}

/// Log successful completion of an API operation
#[macro_export]
macro_rules! log_api_success {
    ($operation:expr, topic = $topic:expr, count = $count:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            topic = %$topic,
            count = $count,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, count = $count:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            count = $count,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, $msg:expr) => {
        tracing::info!(operation = $operation, "API operation completed: {}", $msg);
    };
}

// ============================================================================
// LLM Service Logging Macros
// ============================================================================

/// Log LLM calls with provider context
#[macro_export]
macro_rules! log_llm_operation {
    (start, $operation:expr, provider = $provider:expr, model = $model:expr) => {
        tracing::info!(
            component = "llm_service",
            operation = $operation,
            provider = %$provider,
            model = %$model,
            "LLM operation started"
        );
    };
    (success, $operation:expr, provider = $provider:expr, duration_ms = $duration:expr, response_length = $len:expr) => {
        tracing::info!(
            component = "llm_service",
            operation = $operation,
            provider = %$provider,
            duration_ms = $duration,
            response_length = $len,
            "LLM operation completed successfully"
        );
    };
    (error, $operation:expr, provider = $provider:expr, duration_ms = $duration:expr, error = $error:expr) => {
        tracing::error!(
            component = "llm_service",
            operation = $operation,
            provider = %$provider,
            duration_ms = $duration,
            error = %$error,
            "LLM operation failed"
        );
    };
    (warn, $operation:expr, $msg:expr) => {
        tracing::warn!(
            component = "llm_service",
            operation = $operation,
            "LLM operation warning: {}", $msg
        );
    };
}

// ============================================================================
// System Event Logging Macros
// ============================================================================

/// Log system startup and shutdown events
#[macro_export]
macro_rules! log_system_event {
    (startup, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "startup",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (shutdown, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "shutdown",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (config, $msg:expr) => {
        tracing::info!(event_type = "configuration", "System event: {}", $msg);
    };
}

// ============================================================================
// Validation Logging Macros
// ============================================================================

/// Log validation results consistently
#[macro_export]
macro_rules! log_validation {
    (success, $component:expr, $msg:expr) => {
        tracing::debug!(
            event_type = "validation",
            component = $component,
            result = "success",
            "Validation completed: {}", $msg
        );
    };
    (failure, $component:expr, error = $error:expr) => {
        tracing::warn!(
            event_type = "validation",
            component = $component,
            result = "failure",
            error = %$error,
            "Validation failed"
        );
    };
}
