use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::utils::to_iso_millis;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("登录失败次数过多，请稍后再试")]
    RateLimited {
        attempt_count: u32,
        timestamp: DateTime<Utc>,
    },

    #[error("邮箱或密码错误")]
    InvalidCredentials {
        attempt_count: u32,
        timestamp: DateTime<Utc>,
    },

    #[error("认证失败: {0}")]
    Unauthorized(String),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("无法处理的请求: {0}")]
    UnprocessableEntity(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidCredentials { .. } => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::RateLimited { .. } => "rate_limited",
            AppError::InvalidCredentials { .. } => "invalid_credentials",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::BadRequest(_) => "bad_request",
            AppError::UnprocessableEntity(_) => "unprocessable_entity",
            AppError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();

        let body = match self {
            // 登录失败需要带上时间戳和失败次数
            AppError::RateLimited { attempt_count, timestamp }
            | AppError::InvalidCredentials { attempt_count, timestamp } => json!({
                "error": {
                    "code": code,
                    "message": message,
                    "details": {
                        "timestamp": to_iso_millis(timestamp),
                        "attemptCount": attempt_count
                    }
                }
            }),
            _ => json!({
                "error": {
                    "code": code,
                    "message": message
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

// 请求体无法解析时同样返回 JSON 格式的 400
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "请求体解析失败: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    }
}

// anyhow::Error 统一转换为 InternalError，错误链只写日志
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        let error_chain = err
            .chain()
            .enumerate()
            .map(|(i, e)| format!("[{}] {}", i, e))
            .collect::<Vec<_>>()
            .join(" ");

        tracing::error!(error = %err, chain = %error_chain, "anyhow::Error 被转换为 InternalError");

        AppError::InternalError(err.to_string())
    }
}
