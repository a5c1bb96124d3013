use crate::{error::AppError, AppState};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

/// Token 验证中间件
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("缺少 Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization 格式错误".to_string()))?;

    let claims = state
        .jwt_service
        .validate_token(token)
        .map_err(|e| AppError::Unauthorized(format!("Token 无效: {}", e)))?;

    tracing::debug!(user_id = %claims.sub, "token 验证通过");

    // 将用户信息存入 request extensions
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
