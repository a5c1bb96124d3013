use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

use super::password;
use crate::config::User;

/// 验证通过的用户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

/// 凭据校验
///
/// `Ok(None)` 表示邮箱或密码错误，会计入失败次数；
/// `Err` 表示校验本身出错，按内部错误处理，不计入失败次数。
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, email: &str, password: &str) -> anyhow::Result<Option<AuthenticatedUser>>;
}

/// 基于配置文件用户表的校验器（argon2 哈希）
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> anyhow::Result<Self> {
        let mut by_email = HashMap::with_capacity(users.len());
        for user in users {
            password::check_hash(&user.password_hash)
                .map_err(|e| anyhow::anyhow!("用户 {} 配置无效: {}", user.email, e))?;
            if by_email.contains_key(&user.email) {
                anyhow::bail!("用户邮箱重复: {}", user.email);
            }
            by_email.insert(user.email.clone(), user);
        }
        Ok(Self { users: by_email })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialVerifier for UserDirectory {
    async fn verify(&self, email: &str, password: &str) -> anyhow::Result<Option<AuthenticatedUser>> {
        let Some(user) = self.users.get(email) else {
            return Ok(None);
        };

        let hash = user.password_hash.clone();
        let candidate = password.to_string();
        // argon2 计算较重，放到阻塞线程池
        let matched = tokio::task::spawn_blocking(move || password::verify_password(&hash, &candidate))
            .await
            .map_err(|e| anyhow::anyhow!("密码校验任务失败: {e}"))??;

        if !matched {
            return Ok(None);
        }

        Ok(Some(AuthenticatedUser {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        }))
    }
}
