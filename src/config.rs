use serde::Deserialize;

use crate::auth::{DEFAULT_LOCKOUT_WINDOW_SECONDS, DEFAULT_MAX_ATTEMPTS, MAX_LOCKOUT_WINDOW_SECONDS};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            jwt_secret: String::new(),
            token_ttl_seconds: default_token_ttl(),
        }
    }
}

fn default_token_ttl() -> u64 {
    3600
}

/// 配置文件中的用户，密码以 argon2 PHC 字符串保存
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password_hash: String,
}

/// 登录防爆破策略
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    #[serde(default = "default_lockout_window")]
    pub lockout_window_seconds: u64,
    /// 后台清理过期记录的间隔
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_login_attempts(),
            lockout_window_seconds: default_lockout_window(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_max_login_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_lockout_window() -> u64 {
    DEFAULT_LOCKOUT_WINDOW_SECONDS
}

fn default_sweep_interval() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_prefix: default_file_prefix(),
            max_files: default_max_files(),
            json: false,
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_file_prefix() -> String {
    "ledger_api".to_string()
}

fn default_max_files() -> usize {
    7
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // 加载 .env 文件 (如果存在)
        let _ = dotenvy::dotenv();

        // config.toml 可选，环境变量 LEDGER__AUTH__JWT_SECRET 这类写法优先级更高
        let config: Config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("LEDGER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("auth.jwt_secret 未设置! 请在 config.toml 或 LEDGER__AUTH__JWT_SECRET 中配置");
        }
        if self.security.max_login_attempts == 0 {
            anyhow::bail!("security.max_login_attempts 必须大于 0");
        }
        if self.security.lockout_window_seconds == 0
            || self.security.lockout_window_seconds > MAX_LOCKOUT_WINDOW_SECONDS
        {
            anyhow::bail!(
                "security.lockout_window_seconds 必须在 1..={} 之间",
                MAX_LOCKOUT_WINDOW_SECONDS
            );
        }
        if self.security.sweep_interval_seconds == 0 {
            anyhow::bail!("security.sweep_interval_seconds 必须大于 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_security_defaults_match_lockout_policy() {
        let config = parse(
            r#"
            [auth]
            jwt_secret = "secret"
            "#,
        );
        assert_eq!(config.security.max_login_attempts, 5);
        assert_eq!(config.security.lockout_window_seconds, 30 * 60);
        assert_eq!(config.server.port, 8080);
        assert!(config.auth.users.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_users_and_overrides_are_parsed() {
        let config = parse(
            r#"
            [auth]
            jwt_secret = "secret"
            token_ttl_seconds = 60

            [[auth.users]]
            id = "u-1"
            email = "alice@example.com"
            name = "Alice"
            password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"

            [security]
            max_login_attempts = 3
            lockout_window_seconds = 120
            "#,
        );
        assert_eq!(config.auth.users.len(), 1);
        assert_eq!(config.auth.users[0].email, "alice@example.com");
        assert_eq!(config.security.max_login_attempts, 3);
        assert_eq!(config.security.lockout_window_seconds, 120);
        assert_eq!(config.security.sweep_interval_seconds, 60);
    }

    #[test]
    fn test_empty_jwt_secret_is_rejected() {
        let config = parse("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let config = parse(
            r#"
            [auth]
            jwt_secret = "secret"

            [security]
            max_login_attempts = 0
            "#,
        );
        assert!(config.validate().is_err());
    }
}
