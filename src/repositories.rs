use async_trait::async_trait;

use crate::models::goals::Goals;
use crate::models::ledger::{Purchase, Sale};
use crate::models::users::User;

pub mod goals;
pub mod ledger;
pub mod memory;
pub mod users;
pub mod voice;

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn insert_user(&self, user: User) -> Result<User, anyhow::Error>;
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, anyhow::Error>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
    async fn list_users(&self) -> Result<Vec<User>, anyhow::Error>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    async fn insert_purchase(&self, purchase: Purchase) -> Result<Purchase, anyhow::Error>;
    async fn get_purchase(&self, id: &str) -> Result<Option<Purchase>, anyhow::Error>;
    async fn delete_purchase(&self, id: &str) -> Result<(), anyhow::Error>;
    async fn list_purchases(&self, user_id: &str) -> Result<Vec<Purchase>, anyhow::Error>;
    async fn insert_sale(&self, sale: Sale) -> Result<Sale, anyhow::Error>;
    async fn list_sales(&self, user_id: &str) -> Result<Vec<Sale>, anyhow::Error>;
}

#[async_trait]
pub trait GoalsStore: Send + Sync + 'static {
    async fn get_goals(&self, user_id: &str) -> Result<Option<Goals>, anyhow::Error>;
    async fn upsert_goals(&self, goals: Goals) -> Result<Goals, anyhow::Error>;
}
