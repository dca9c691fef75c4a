use async_trait::async_trait;
use dashmap::DashMap;

use super::{GoalsStore, LedgerStore, UserStore};
use crate::models::goals::Goals;
use crate::models::ledger::{Purchase, Sale};
use crate::models::users::User;

/// Process-local store used by `--in-memory` mode and the unit tests.
/// Implements every store trait over the same collections.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    purchases: DashMap<String, Purchase>,
    sales: DashMap<String, Sale>,
    goals: DashMap<String, Goals>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, anyhow::Error> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, anyhow::Error> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn list_users(&self) -> Result<Vec<User>, anyhow::Error> {
        Ok(self
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn insert_purchase(&self, purchase: Purchase) -> Result<Purchase, anyhow::Error> {
        self.purchases.insert(purchase.id.clone(), purchase.clone());
        Ok(purchase)
    }

    async fn get_purchase(&self, id: &str) -> Result<Option<Purchase>, anyhow::Error> {
        Ok(self.purchases.get(id).map(|entry| entry.value().clone()))
    }

    async fn delete_purchase(&self, id: &str) -> Result<(), anyhow::Error> {
        self.purchases.remove(id);
        Ok(())
    }

    async fn list_purchases(&self, user_id: &str) -> Result<Vec<Purchase>, anyhow::Error> {
        Ok(self
            .purchases
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn insert_sale(&self, sale: Sale) -> Result<Sale, anyhow::Error> {
        self.sales.insert(sale.id.clone(), sale.clone());
        Ok(sale)
    }

    async fn list_sales(&self, user_id: &str) -> Result<Vec<Sale>, anyhow::Error> {
        Ok(self
            .sales
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[async_trait]
impl GoalsStore for MemoryStore {
    async fn get_goals(&self, user_id: &str) -> Result<Option<Goals>, anyhow::Error> {
        Ok(self.goals.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn upsert_goals(&self, goals: Goals) -> Result<Goals, anyhow::Error> {
        self.goals.insert(goals.user_id.clone(), goals.clone());
        Ok(goals)
    }
}
