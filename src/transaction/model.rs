use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub amount: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub user_id: String,
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    pub amount: Option<f64>,
    pub description: Option<String>,
}

fn check_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::BadRequest("amount 必须是正数".to_string()));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), AppError> {
    if description.trim().is_empty() {
        return Err(AppError::BadRequest("description 不能为空".to_string()));
    }
    Ok(())
}

impl CreateTransactionRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.user_id.trim().is_empty() {
            return Err(AppError::BadRequest("userId 不能为空".to_string()));
        }
        check_amount(self.amount)?;
        check_description(&self.description)
    }
}

impl UpdateTransactionRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.amount.is_none() && self.description.is_none() {
            return Err(AppError::BadRequest("amount 和 description 至少提供一个".to_string()));
        }
        if let Some(amount) = self.amount {
            check_amount(amount)?;
        }
        if let Some(description) = &self.description {
            check_description(description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(user_id: &str, amount: f64, description: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            user_id: user_id.to_string(),
            amount,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(create("u-1", 10.5, "coffee").validate().is_ok());
        assert!(create("", 10.5, "coffee").validate().is_err());
        assert!(create("u-1", 0.0, "coffee").validate().is_err());
        assert!(create("u-1", -3.0, "coffee").validate().is_err());
        assert!(create("u-1", f64::NAN, "coffee").validate().is_err());
        assert!(create("u-1", 1.0, "  ").validate().is_err());
    }

    #[test]
    fn test_update_needs_at_least_one_field() {
        assert!(UpdateTransactionRequest::default().validate().is_err());

        let amount_only = UpdateTransactionRequest { amount: Some(2.0), description: None };
        assert!(amount_only.validate().is_ok());

        let bad_amount = UpdateTransactionRequest { amount: Some(-1.0), description: None };
        assert!(bad_amount.validate().is_err());
    }

    #[test]
    fn test_transaction_serializes_camel_case() {
        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            user_id: "u-1".to_string(),
            amount: 12.5,
            description: "lunch".to_string(),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["userId"], "u-1");
        assert!(value.get("createdAt").is_some());
    }
}
