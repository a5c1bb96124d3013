use once_cell::sync::Lazy;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

pub struct Metrics {
    pub registry: Registry,
    /// result = success | invalid_credentials | rate_limited
    pub login_attempts: CounterVec,
    /// 失败次数刚好达到阈值、进入锁定的次数
    pub login_lockouts: Counter,
    /// op = list | create | get | update | delete
    pub transaction_operations: CounterVec,
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new();

        let login_attempts = CounterVec::new(
            Opts::new("login_attempts_total", "Login attempts grouped by result"),
            &["result"],
        )
        .expect("login_attempts_total 定义错误");
        registry
            .register(Box::new(login_attempts.clone()))
            .expect("login_attempts_total 注册失败");

        let login_lockouts = Counter::new("login_lockouts_total", "Identities that reached the lockout threshold")
            .expect("login_lockouts_total 定义错误");
        registry
            .register(Box::new(login_lockouts.clone()))
            .expect("login_lockouts_total 注册失败");

        let transaction_operations = CounterVec::new(
            Opts::new("transaction_operations_total", "Transaction operations grouped by kind"),
            &["op"],
        )
        .expect("transaction_operations_total 定义错误");
        registry
            .register(Box::new(transaction_operations.clone()))
            .expect("transaction_operations_total 注册失败");

        Self {
            registry,
            login_attempts,
            login_lockouts,
            transaction_operations,
        }
    }

    pub fn render(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|e| e.to_string())?;
        String::from_utf8(buffer).map_err(|e| e.to_string())
    }

    pub fn login(&self, result: &str) {
        self.login_attempts.with_label_values(&[result]).inc();
    }

    pub fn transaction(&self, op: &str) {
        self.transaction_operations.with_label_values(&[op]).inc();
    }
}

pub static METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// GET /metrics
pub async fn metrics_handler() -> Result<String, crate::error::AppError> {
    METRICS.render().map_err(crate::error::AppError::InternalError)
}
