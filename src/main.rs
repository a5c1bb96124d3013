mod auth;
mod config;
mod error;
mod logger;
mod metrics;
mod transaction;
mod utils;

use auth::{login, auth_middleware, CredentialVerifier, JwtService, LoginAttemptGuard, LoginPolicy, UserDirectory};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use config::Config;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use transaction::TransactionStore;

// 统一的应用状态
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: Arc<JwtService>,
    pub login_guard: Arc<LoginAttemptGuard>, // 登录防爆破，整个进程只有这一份
    pub verifier: Arc<dyn CredentialVerifier>,
    pub transactions: Arc<TransactionStore>,
}

pub fn build_router(state: AppState) -> Router {
    // 公开路由（无需认证）
    let public_routes = Router::new()
        .route("/auth/login", post(login))
        .route("/metrics", get(metrics::metrics_handler));

    // 受保护路由（需要 Token）
    let protected_routes = Router::new()
        .route(
            "/transactions",
            get(transaction::list_transactions).post(transaction::create_transaction),
        )
        .route(
            "/transactions/:id",
            get(transaction::get_transaction)
                .put(transaction::update_transaction)
                .delete(transaction::delete_transaction),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public_routes
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ledger_api hash-password <password>：生成配置用的密码哈希
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-password") {
        let Some(password) = args.get(2).filter(|p| !p.is_empty()) else {
            anyhow::bail!("用法: ledger_api hash-password <password>");
        };
        println!("{}", auth::password::hash_password(password)?);
        return Ok(());
    }

    let config = Config::load()?;
    let _log_guard = logger::init_logger(&config.logging)?;

    tracing::info!("配置加载成功");
    tracing::info!("服务器地址: {}:{}", config.server.host, config.server.port);

    let policy = LoginPolicy::from(&config.security);
    tracing::info!(
        "登录防爆破: 连续失败 {} 次锁定 {} 秒",
        policy.max_attempts,
        policy.window.num_seconds()
    );

    let jwt_service = Arc::new(JwtService::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_ttl_seconds,
    ).map_err(|e| anyhow::anyhow!("JWT服务初始化失败: {}", e))?);

    let users = UserDirectory::new(config.auth.users.clone())
        .map_err(|e| anyhow::anyhow!("用户表初始化失败: {}", e))?;
    if users.is_empty() {
        tracing::warn!("未配置任何用户，所有登录都会失败");
    } else {
        tracing::info!("已加载 {} 个用户", users.len());
    }

    let login_guard = Arc::new(LoginAttemptGuard::new(policy));
    let sweeper = LoginAttemptGuard::spawn_sweeper(
        login_guard.clone(),
        Duration::from_secs(config.security.sweep_interval_seconds),
    );

    let app_state = AppState {
        jwt_service,
        login_guard,
        verifier: Arc::new(users),
        transactions: Arc::new(TransactionStore::new()),
    };

    let app = build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 服务启动成功: http://{}", addr);
    tracing::info!("📝 登录接口: POST http://{}/auth/login", addr);
    tracing::info!("💳 交易接口: http://{}/transactions", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("服务已停止");

    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("无法监听 Ctrl+C 信号: {}", e);
        return;
    }
    tracing::info!("收到关闭信号，停止接收新请求");
}
