use anyhow::bail;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::LedgerStore;
use crate::models::ledger::{Category, Purchase, Sale};

#[derive(Clone)]
pub struct LedgerRepository {
    conn: PgPool,
}

#[derive(sqlx::FromRow)]
struct PurchaseRow {
    id: String,
    user_id: String,
    category: String,
    product: String,
    date: NaiveDate,
    value: f64,
}

impl PurchaseRow {
    fn into_purchase(self) -> Result<Purchase, anyhow::Error> {
        let category = match Category::parse(&self.category) {
            Some(category) => category,
            None => bail!(
                "Unknown category stored for purchase {}: {}",
                self.id,
                self.category
            ),
        };

        Ok(Purchase {
            id: self.id,
            user_id: self.user_id,
            category,
            product: self.product,
            date: self.date,
            value: self.value,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: String,
    user_id: String,
    date: NaiveDate,
    value: f64,
}

impl SaleRow {
    fn into_sale(self) -> Sale {
        Sale {
            id: self.id,
            user_id: self.user_id,
            date: self.date,
            value: self.value,
        }
    }
}

impl LedgerRepository {
    pub fn new(conn: PgPool) -> Self {
        LedgerRepository { conn }
    }
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn insert_purchase(&self, purchase: Purchase) -> Result<Purchase, anyhow::Error> {
        sqlx::query(
            r#"
                INSERT INTO purchases (id, user_id, category, product, date, value)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.user_id)
        .bind(purchase.category.as_str())
        .bind(&purchase.product)
        .bind(purchase.date)
        .bind(purchase.value)
        .execute(&self.conn)
        .await?;

        Ok(purchase)
    }

    async fn get_purchase(&self, id: &str) -> Result<Option<Purchase>, anyhow::Error> {
        let row = sqlx::query_as::<_, PurchaseRow>(
            "SELECT id, user_id, category, product, date, value FROM purchases WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.conn)
        .await?;

        row.map(PurchaseRow::into_purchase).transpose()
    }

    async fn delete_purchase(&self, id: &str) -> Result<(), anyhow::Error> {
        sqlx::query("DELETE FROM purchases WHERE id = $1")
            .bind(id)
            .execute(&self.conn)
            .await?;

        Ok(())
    }

    async fn list_purchases(&self, user_id: &str) -> Result<Vec<Purchase>, anyhow::Error> {
        let rows = sqlx::query_as::<_, PurchaseRow>(
            "SELECT id, user_id, category, product, date, value FROM purchases WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        rows.into_iter().map(PurchaseRow::into_purchase).collect()
    }

    async fn insert_sale(&self, sale: Sale) -> Result<Sale, anyhow::Error> {
        sqlx::query(
            r#"
                INSERT INTO sales (id, user_id, date, value)
                VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.user_id)
        .bind(sale.date)
        .bind(sale.value)
        .execute(&self.conn)
        .await?;

        Ok(sale)
    }

    async fn list_sales(&self, user_id: &str) -> Result<Vec<Sale>, anyhow::Error> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, user_id, date, value FROM sales WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(rows.into_iter().map(SaleRow::into_sale).collect())
    }
}
