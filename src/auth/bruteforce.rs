use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::clock::{Clock, SystemClock};
use crate::config::SecurityConfig;

/// 锁定前允许的连续失败次数
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// 锁定窗口（秒），从最后一次失败开始计算
pub const DEFAULT_LOCKOUT_WINDOW_SECONDS: u64 = 30 * 60;
/// 窗口上限，保证换算成 chrono::Duration 不会溢出
pub const MAX_LOCKOUT_WINDOW_SECONDS: u64 = 365 * 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginPolicy {
    pub max_attempts: u32,
    pub window: Duration,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window: Duration::seconds(DEFAULT_LOCKOUT_WINDOW_SECONDS as i64),
        }
    }
}

impl From<&SecurityConfig> for LoginPolicy {
    fn from(cfg: &SecurityConfig) -> Self {
        let secs = cfg.lockout_window_seconds.min(MAX_LOCKOUT_WINDOW_SECONDS);
        Self {
            max_attempts: cfg.max_login_attempts,
            window: Duration::seconds(secs as i64),
        }
    }
}

/// 某个邮箱自上次重置以来的失败记录
///
/// 重置即删除，所以表里的记录总是 `attempts >= 1` 且带有时间戳；
/// 查不到记录等价于 `{ attempts: 0, last_attempt_at: None }`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub attempts: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

/// 登录防爆破守卫 (email -> AttemptRecord)
///
/// 同一个邮箱的读改写都在 DashMap 分片锁内完成，并发失败不会丢计数；
/// 不同邮箱之间互不影响。所有操作都是同步的，不会失败。
pub struct LoginAttemptGuard {
    records: DashMap<String, AttemptRecord>,
    policy: LoginPolicy,
    clock: Arc<dyn Clock>,
}

impl LoginAttemptGuard {
    pub fn new(policy: LoginPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: LoginPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> LoginPolicy {
        self.policy
    }

    /// 守卫使用的当前时间，响应里的时间戳也取自这里
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn is_expired(&self, record: &AttemptRecord, now: DateTime<Utc>) -> bool {
        match record.last_attempt_at {
            Some(at) => now - at >= self.policy.window,
            None => true,
        }
    }

    /// 当前是否处于锁定状态
    pub fn is_locked(&self, email: &str) -> bool {
        self.lock_status(email).is_some()
    }

    /// 锁定时返回对应记录（用于回报 attemptCount），否则返回 None。
    /// 窗口已过期的记录会在这里被清掉。
    pub fn lock_status(&self, email: &str) -> Option<AttemptRecord> {
        let now = self.clock.now();
        let record = self.records.get(email)?.value().clone();

        if self.is_expired(&record, now) {
            // 重新在锁内判断，避免把并发写入的新失败一起删掉
            if self
                .records
                .remove_if(email, |_, r| self.is_expired(r, now))
                .is_some()
            {
                tracing::debug!(email = %email, attempts = record.attempts, "锁定窗口已过，重置失败计数");
            }
            return None;
        }

        if record.attempts >= self.policy.max_attempts {
            return Some(record);
        }

        None
    }

    /// 记录一次失败，返回更新后的记录
    pub fn record_failure(&self, email: &str) -> AttemptRecord {
        let now = self.clock.now();
        let record = {
            let mut entry = self.records.entry(email.to_string()).or_default();
            entry.attempts = entry.attempts.saturating_add(1);
            entry.last_attempt_at = Some(now);
            entry.value().clone()
        };

        if record.attempts == self.policy.max_attempts {
            tracing::warn!(
                email = %email,
                attempts = record.attempts,
                window_seconds = self.policy.window.num_seconds(),
                "连续登录失败达到上限，账户进入锁定窗口"
            );
        } else {
            tracing::debug!(email = %email, attempts = record.attempts, "记录登录失败");
        }

        record
    }

    /// 登录成功，清除失败记录（没有记录时什么也不做）
    pub fn record_success(&self, email: &str) {
        if let Some((_, record)) = self.records.remove(email) {
            tracing::debug!(email = %email, attempts = record.attempts, "登录成功，清除失败计数");
        }
    }

    /// 当前失败次数，不触发过期重置
    #[cfg(test)]
    pub fn attempts(&self, email: &str) -> u32 {
        self.records.get(email).map(|r| r.attempts).unwrap_or(0)
    }

    /// 正在跟踪的邮箱数量
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 清理所有窗口已过期的记录，返回清理数量
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0usize;
        self.records.retain(|_, record| {
            let keep = !self.is_expired(record, now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// 后台定期清理，避免失败记录无限增长
    pub fn spawn_sweeper(guard: Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = guard.purge_expired();
                if removed > 0 {
                    tracing::debug!(
                        removed,
                        remaining = guard.len(),
                        "清理过期的登录失败记录"
                    );
                }
            }
        })
    }
}
