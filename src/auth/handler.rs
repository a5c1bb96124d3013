use crate::{error::AppError, metrics::METRICS, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    fn validate(&self) -> Result<(), AppError> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::BadRequest("email 格式错误".to_string()));
        }
        if self.password.is_empty() {
            return Err(AppError::BadRequest("password 不能为空".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub token: String,
    pub expires_in: u64,
}

/// POST /auth/login
///
/// 先查锁定状态，再校验凭据，最后按结果更新失败计数。
/// 请求体格式错误不计入失败次数。
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let guard = &state.login_guard;

    if let Some(record) = guard.lock_status(&req.email) {
        METRICS.login("rate_limited");
        tracing::warn!(email = %req.email, attempts = record.attempts, "登录被限流");
        return Err(AppError::RateLimited {
            attempt_count: record.attempts,
            timestamp: guard.now(),
        });
    }

    let verified = state.verifier.verify(&req.email, &req.password).await?;

    let Some(user) = verified else {
        let record = guard.record_failure(&req.email);
        METRICS.login("invalid_credentials");
        if record.attempts == guard.policy().max_attempts {
            METRICS.login_lockouts.inc();
        }
        tracing::info!(
            email = %req.email,
            attempts = record.attempts,
            locked = guard.is_locked(&req.email),
            "登录失败：邮箱或密码错误"
        );
        return Err(AppError::InvalidCredentials {
            attempt_count: record.attempts,
            timestamp: guard.now(),
        });
    };

    guard.record_success(&req.email);

    let token = state.jwt_service.generate_token(&user)?;
    METRICS.login("success");
    tracing::info!(email = %user.email, user_id = %user.user_id, "登录成功");

    Ok(Json(LoginResponse {
        user_id: user.user_id,
        email: user.email,
        name: user.name,
        token,
        expires_in: state.jwt_service.ttl_seconds(),
    }))
}
