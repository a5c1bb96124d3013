use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthenticatedUser;

/// JWT 使用的算法（明确指定，避免依赖默认值）
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // user id
    pub email: String,
    pub exp: usize,    // 过期时间 (Unix timestamp)
}

pub struct JwtService {
    secret: String,
    ttl_seconds: i64,
}

impl JwtService {
    pub fn new(secret: String, ttl_seconds: u64) -> anyhow::Result<Self> {
        let ttl_i64 = i64::try_from(ttl_seconds)
            .map_err(|_| anyhow::anyhow!("TTL时间溢出：超过i64最大值"))?;

        if ttl_i64 <= 0 {
            anyhow::bail!("TTL时间必须大于0");
        }

        Ok(Self {
            secret,
            ttl_seconds: ttl_i64,
        })
    }

    /// 为登录成功的用户签发 token
    pub fn generate_token(&self, user: &AuthenticatedUser) -> anyhow::Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::seconds(self.ttl_seconds))
            .ok_or_else(|| anyhow::anyhow!("时间计算溢出"))?
            .timestamp();

        let exp_usize = usize::try_from(expiration)
            .map_err(|_| anyhow::anyhow!("过期时间转换失败"))?;

        let claims = Claims {
            sub: user.user_id.clone(),
            email: user.email.clone(),
            exp: exp_usize,
        };

        let token = encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// 验证 token（包括过期时间）
    pub fn validate_token(&self, token: &str) -> anyhow::Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(JWT_ALGORITHM),
        )?;

        Ok(token_data.claims)
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "u-1".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
        }
    }

    #[test]
    fn test_issued_token_carries_identity() {
        let jwt = JwtService::new("secret".to_string(), 60).unwrap();
        let token = jwt.generate_token(&alice()).unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email, "alice@example.com");
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = JwtService::new("secret-a".to_string(), 60).unwrap();
        let checker = JwtService::new("secret-b".to_string(), 60).unwrap();
        let token = issuer.generate_token(&alice()).unwrap();
        assert!(checker.validate_token(&token).is_err());
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        assert!(JwtService::new("secret".to_string(), 0).is_err());
    }
}
