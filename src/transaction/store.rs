use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::model::{CreateTransactionRequest, Transaction, UpdateTransactionRequest};

/// 内存中的交易存储，进程重启后数据丢失
#[derive(Default)]
pub struct TransactionStore {
    items: DashMap<Uuid, Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按创建时间排序
    pub fn list(&self) -> Vec<Transaction> {
        let mut all: Vec<Transaction> = self.items.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }

    pub fn get(&self, id: &Uuid) -> Option<Transaction> {
        self.items.get(id).map(|e| e.value().clone())
    }

    pub fn create(&self, req: CreateTransactionRequest) -> Transaction {
        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            amount: req.amount,
            description: req.description,
            created_at: now,
            updated_at: now,
        };
        self.items.insert(tx.id, tx.clone());
        tx
    }

    /// 不存在时返回 None
    pub fn update(&self, id: &Uuid, req: UpdateTransactionRequest) -> Option<Transaction> {
        let mut entry = self.items.get_mut(id)?;
        if let Some(amount) = req.amount {
            entry.amount = amount;
        }
        if let Some(description) = req.description {
            entry.description = description;
        }
        entry.updated_at = Utc::now();
        Some(entry.value().clone())
    }

    pub fn delete(&self, id: &Uuid) -> Option<Transaction> {
        self.items.remove(id).map(|(_, tx)| tx)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(description: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            user_id: "u-1".to_string(),
            amount: 10.0,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_crud_lifecycle() {
        let store = TransactionStore::new();
        assert!(store.is_empty());

        let tx = store.create(req("rent"));
        assert_eq!(store.get(&tx.id).unwrap().description, "rent");

        let updated = store
            .update(&tx.id, UpdateTransactionRequest { amount: Some(20.0), description: None })
            .unwrap();
        assert_eq!(updated.amount, 20.0);
        assert_eq!(updated.description, "rent");
        assert!(updated.updated_at >= updated.created_at);

        assert!(store.delete(&tx.id).is_some());
        assert!(store.get(&tx.id).is_none());
        assert!(store.delete(&tx.id).is_none());
    }

    #[test]
    fn test_update_unknown_returns_none() {
        let store = TransactionStore::new();
        let res = store.update(&Uuid::new_v4(), UpdateTransactionRequest { amount: Some(1.0), description: None });
        assert!(res.is_none());
    }

    #[test]
    fn test_list_is_ordered_by_creation() {
        let store = TransactionStore::new();
        let a = store.create(req("a"));
        let b = store.create(req("b"));
        let listed = store.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(store.len(), 2);
        assert!(listed[0].created_at <= listed[1].created_at);
        assert!(listed.iter().any(|t| t.id == a.id));
        assert!(listed.iter().any(|t| t.id == b.id));
    }
}
