use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::reports::{self, CsvReport};
use super::{RequestHandler, Service, ServiceError};
use crate::gauge;
use crate::models::goals::{Goals, GoalsUpdate};
use crate::models::ledger::{DashboardSummary, NewPurchase, NewSale, Purchase, Sale};
use crate::repositories::{GoalsStore, LedgerStore, UserStore};

pub enum LedgerRequest {
    RecordPurchase {
        user_id: String,
        purchase: NewPurchase,
        response: oneshot::Sender<Result<Purchase, ServiceError>>,
    },
    RecordSale {
        user_id: String,
        sale: NewSale,
        response: oneshot::Sender<Result<Sale, ServiceError>>,
    },
    DeletePurchase {
        caller_id: String,
        purchase_id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    ListPurchases {
        user_id: String,
        response: oneshot::Sender<Result<Vec<Purchase>, ServiceError>>,
    },
    ListSales {
        user_id: String,
        response: oneshot::Sender<Result<Vec<Sale>, ServiceError>>,
    },
    GetDashboard {
        user_id: String,
        response: oneshot::Sender<Result<DashboardSummary, ServiceError>>,
    },
    GetGoals {
        user_id: String,
        response: oneshot::Sender<Result<Goals, ServiceError>>,
    },
    UpdateGoals {
        user_id: String,
        update: GoalsUpdate,
        response: oneshot::Sender<Result<Goals, ServiceError>>,
    },
    ExportReport {
        user_id: String,
        response: oneshot::Sender<Result<CsvReport, ServiceError>>,
    },
}

/// Cost ratio against the configured revenue goal. Zero is the no-data
/// sentinel, not an error.
pub fn projected_ratio(total_purchases: f64, sales_goal: f64) -> f64 {
    if sales_goal > 0.0 {
        total_purchases / sales_goal * 100.0
    } else {
        0.0
    }
}

/// Cost ratio against actual recorded revenue. Unbounded above.
pub fn real_ratio(total_purchases: f64, total_sales: f64) -> f64 {
    if total_sales > 0.0 {
        total_purchases / total_sales * 100.0
    } else {
        0.0
    }
}

fn validate_value(value: f64) -> Result<(), ServiceError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ServiceError::Validation(
            "value must be a positive amount".to_string(),
        ));
    }

    Ok(())
}

#[derive(Clone)]
pub struct LedgerRequestHandler {
    ledger: Arc<dyn LedgerStore>,
    goals: Arc<dyn GoalsStore>,
    users: Arc<dyn UserStore>,
}

impl LedgerRequestHandler {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        goals: Arc<dyn GoalsStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        LedgerRequestHandler {
            ledger,
            goals,
            users,
        }
    }

    async fn require_user(&self, user_id: &str) -> Result<(), ServiceError> {
        let user = self
            .users
            .get_user_by_id(user_id)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if user.is_none() {
            return Err(ServiceError::NotFound(format!(
                "unknown account: {}",
                user_id
            )));
        }

        Ok(())
    }

    async fn record_purchase(
        &self,
        user_id: &str,
        purchase: NewPurchase,
    ) -> Result<Purchase, ServiceError> {
        if purchase.product.trim().is_empty() {
            return Err(ServiceError::Validation(
                "product description is required".to_string(),
            ));
        }
        validate_value(purchase.value)?;
        self.require_user(user_id).await?;

        self.ledger
            .insert_purchase(Purchase {
                id: Uuid::new_v4().hyphenated().to_string(),
                user_id: user_id.to_string(),
                category: purchase.category,
                product: purchase.product,
                date: purchase.date,
                value: purchase.value,
            })
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    async fn record_sale(&self, user_id: &str, sale: NewSale) -> Result<Sale, ServiceError> {
        validate_value(sale.value)?;
        self.require_user(user_id).await?;

        self.ledger
            .insert_sale(Sale {
                id: Uuid::new_v4().hyphenated().to_string(),
                user_id: user_id.to_string(),
                date: sale.date,
                value: sale.value,
            })
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    async fn delete_purchase(
        &self,
        caller_id: &str,
        purchase_id: &str,
    ) -> Result<(), ServiceError> {
        let purchase = self
            .ledger
            .get_purchase(purchase_id)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let purchase = match purchase {
            Some(purchase) => purchase,
            None => {
                return Err(ServiceError::NotFound(format!(
                    "purchase not found: {}",
                    purchase_id
                )))
            }
        };

        if purchase.user_id != caller_id {
            return Err(ServiceError::Forbidden(
                "purchase belongs to another account".to_string(),
            ));
        }

        self.ledger
            .delete_purchase(purchase_id)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    async fn list_purchases(&self, user_id: &str) -> Result<Vec<Purchase>, ServiceError> {
        let mut purchases = self
            .ledger
            .list_purchases(user_id)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        // Display order, newest first. Not a storage guarantee.
        purchases.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(purchases)
    }

    async fn list_sales(&self, user_id: &str) -> Result<Vec<Sale>, ServiceError> {
        let mut sales = self
            .ledger
            .list_sales(user_id)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        sales.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sales)
    }

    async fn total_purchases(&self, user_id: &str) -> Result<f64, ServiceError> {
        let purchases = self.list_purchases(user_id).await?;
        Ok(purchases.iter().map(|p| p.value).sum())
    }

    async fn total_sales(&self, user_id: &str) -> Result<f64, ServiceError> {
        let sales = self.list_sales(user_id).await?;
        Ok(sales.iter().map(|s| s.value).sum())
    }

    async fn goals_for(&self, user_id: &str) -> Result<Goals, ServiceError> {
        let goals = self
            .goals
            .get_goals(user_id)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        match goals {
            Some(goals) => Ok(goals),
            // First read materializes the defaults so later updates have a row.
            None => self
                .goals
                .upsert_goals(Goals::default_for(user_id))
                .await
                .map_err(|e| ServiceError::Storage(e.to_string())),
        }
    }

    async fn update_goals(&self, user_id: &str, update: GoalsUpdate) -> Result<Goals, ServiceError> {
        if !update.sales_goal.is_finite() || update.sales_goal <= 0.0 {
            return Err(ServiceError::Validation(
                "sales goal must be a positive amount".to_string(),
            ));
        }
        if !update.cmv_target.is_finite() || update.cmv_target < 0.0 {
            return Err(ServiceError::Validation(
                "cmv target must not be negative".to_string(),
            ));
        }
        self.require_user(user_id).await?;

        self.goals
            .upsert_goals(Goals {
                user_id: user_id.to_string(),
                sales_goal: update.sales_goal,
                cmv_target: update.cmv_target,
            })
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    async fn dashboard(&self, user_id: &str) -> Result<DashboardSummary, ServiceError> {
        let total_purchases = self.total_purchases(user_id).await?;
        let total_sales = self.total_sales(user_id).await?;
        let goals = self.goals_for(user_id).await?;

        let projected_cmv = projected_ratio(total_purchases, goals.sales_goal);
        let real_cmv = real_ratio(total_purchases, total_sales);

        Ok(DashboardSummary {
            total_purchases,
            total_sales,
            projected_cmv,
            real_cmv,
            projected_gauge: gauge::cmv_reading(projected_cmv, goals.cmv_target),
            real_gauge: gauge::cmv_reading(real_cmv, goals.cmv_target),
            revenue_gauge: gauge::revenue_reading(total_sales, goals.sales_goal),
            goals,
        })
    }

    async fn export_report(&self, user_id: &str) -> Result<CsvReport, ServiceError> {
        let user = self
            .users
            .get_user_by_id(user_id)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let user = match user {
            Some(user) => user,
            None => {
                return Err(ServiceError::NotFound(format!(
                    "unknown account: {}",
                    user_id
                )))
            }
        };

        let purchases = self.list_purchases(user_id).await?;
        let sales = self.list_sales(user_id).await?;
        let goals = self.goals_for(user_id).await?;

        let total_purchases: f64 = purchases.iter().map(|p| p.value).sum();
        let total_sales: f64 = sales.iter().map(|s| s.value).sum();

        Ok(reports::build_report(
            &user.company,
            &purchases,
            &sales,
            projected_ratio(total_purchases, goals.sales_goal),
            real_ratio(total_purchases, total_sales),
        ))
    }
}

#[async_trait]
impl RequestHandler<LedgerRequest> for LedgerRequestHandler {
    async fn handle_request(&self, request: LedgerRequest) {
        match request {
            LedgerRequest::RecordPurchase {
                user_id,
                purchase,
                response,
            } => {
                let result = self.record_purchase(&user_id, purchase).await;
                let _ = response.send(result);
            }
            LedgerRequest::RecordSale {
                user_id,
                sale,
                response,
            } => {
                let result = self.record_sale(&user_id, sale).await;
                let _ = response.send(result);
            }
            LedgerRequest::DeletePurchase {
                caller_id,
                purchase_id,
                response,
            } => {
                let result = self.delete_purchase(&caller_id, &purchase_id).await;
                let _ = response.send(result);
            }
            LedgerRequest::ListPurchases { user_id, response } => {
                let result = self.list_purchases(&user_id).await;
                let _ = response.send(result);
            }
            LedgerRequest::ListSales { user_id, response } => {
                let result = self.list_sales(&user_id).await;
                let _ = response.send(result);
            }
            LedgerRequest::GetDashboard { user_id, response } => {
                let result = self.dashboard(&user_id).await;
                let _ = response.send(result);
            }
            LedgerRequest::GetGoals { user_id, response } => {
                let result = self.goals_for(&user_id).await;
                let _ = response.send(result);
            }
            LedgerRequest::UpdateGoals {
                user_id,
                update,
                response,
            } => {
                let result = self.update_goals(&user_id, update).await;
                let _ = response.send(result);
            }
            LedgerRequest::ExportReport { user_id, response } => {
                let result = self.export_report(&user_id).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        LedgerService {}
    }
}

#[async_trait]
impl Service<LedgerRequest, LedgerRequestHandler> for LedgerService {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::ledger::Category;
    use crate::models::users::{Role, User};
    use crate::repositories::memory::MemoryStore;
    use crate::services::users::hash_password;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    fn purchase(product: &str, value: f64) -> NewPurchase {
        NewPurchase {
            category: Category::Food,
            product: product.to_string(),
            date: date("2026-08-01"),
            value,
        }
    }

    fn sale(value: f64) -> NewSale {
        NewSale {
            date: date("2026-08-01"),
            value,
        }
    }

    async fn setup() -> (LedgerRequestHandler, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());

        for (id, email) in [("u1", "u1@example.com"), ("u2", "u2@example.com")] {
            store
                .insert_user(User {
                    id: id.to_string(),
                    name: "Owner".to_string(),
                    email: email.to_string(),
                    password_hash: hash_password("pw"),
                    company: "Bar do Zé".to_string(),
                    phone: "1190000000".to_string(),
                    role: Role::User,
                })
                .await
                .unwrap();
        }

        let handler =
            LedgerRequestHandler::new(store.clone(), store.clone(), store.clone());
        (handler, store)
    }

    #[tokio::test]
    async fn recorded_purchase_round_trips_through_listing() {
        let (handler, _) = setup().await;

        let recorded = handler
            .record_purchase("u1", purchase("Coca-Cola 350ml", 120.5))
            .await
            .unwrap();

        let listed = handler.list_purchases("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], recorded);
        assert_eq!(listed[0].product, "Coca-Cola 350ml");
        assert_eq!(listed[0].category, Category::Food);
        assert_eq!(listed[0].value, 120.5);
        assert_eq!(listed[0].date, date("2026-08-01"));
    }

    #[tokio::test]
    async fn totals_only_cover_the_owning_account() {
        let (handler, _) = setup().await;

        handler
            .record_purchase("u1", purchase("Rice", 10000.0))
            .await
            .unwrap();
        handler
            .record_purchase("u1", purchase("Beans", 5000.0))
            .await
            .unwrap();
        handler
            .record_purchase("u2", purchase("Foreign", 9999.0))
            .await
            .unwrap();

        assert_eq!(handler.total_purchases("u1").await.unwrap(), 15000.0);
        let listed = handler.list_purchases("u1").await.unwrap();
        assert!(listed.iter().all(|p| p.user_id == "u1"));
        assert!(!listed.iter().any(|p| p.value == 9999.0));
    }

    #[tokio::test]
    async fn reference_scenario_yields_expected_ratios() {
        let (handler, _) = setup().await;

        handler
            .record_purchase("u1", purchase("Stock", 15000.0))
            .await
            .unwrap();
        handler.record_sale("u1", sale(60000.0)).await.unwrap();

        let summary = handler.dashboard("u1").await.unwrap();
        assert_eq!(summary.goals.sales_goal, 50000.0);
        assert_eq!(summary.goals.cmv_target, 30.0);
        assert_eq!(summary.projected_cmv, 30.0);
        assert_eq!(summary.real_cmv, 25.0);
        assert_eq!(summary.revenue_gauge.percentage, 100.0);
    }

    #[tokio::test]
    async fn ratios_fall_back_to_zero_without_data() {
        let (handler, store) = setup().await;

        handler
            .record_purchase("u1", purchase("Stock", 500.0))
            .await
            .unwrap();

        // No sales recorded yet.
        let summary = handler.dashboard("u1").await.unwrap();
        assert_eq!(summary.real_cmv, 0.0);

        // A non-positive goal written behind the validator still reads as zero.
        store
            .upsert_goals(Goals {
                user_id: "u1".to_string(),
                sales_goal: 0.0,
                cmv_target: 30.0,
            })
            .await
            .unwrap();
        let summary = handler.dashboard("u1").await.unwrap();
        assert_eq!(summary.projected_cmv, 0.0);
    }

    #[tokio::test]
    async fn validation_rejects_bad_purchases_before_any_write() {
        let (handler, store) = setup().await;

        assert!(matches!(
            handler.record_purchase("u1", purchase("  ", 10.0)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            handler.record_purchase("u1", purchase("Rice", 0.0)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            handler.record_purchase("u1", purchase("Rice", -5.0)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            handler.record_sale("u1", sale(f64::NAN)).await,
            Err(ServiceError::Validation(_))
        ));

        assert!(store.list_purchases("u1").await.unwrap().is_empty());
        assert!(store.list_sales("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_require_an_existing_account() {
        let (handler, _) = setup().await;

        assert!(matches!(
            handler.record_purchase("ghost", purchase("Rice", 10.0)).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            handler.record_sale("ghost", sale(10.0)).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_owned_purchase() {
        let (handler, _) = setup().await;

        let keep = handler
            .record_purchase("u1", purchase("Keep", 40.0))
            .await
            .unwrap();
        let drop = handler
            .record_purchase("u1", purchase("Drop", 60.0))
            .await
            .unwrap();

        handler.delete_purchase("u1", &drop.id).await.unwrap();

        let listed = handler.list_purchases("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);
        assert_eq!(handler.total_purchases("u1").await.unwrap(), 40.0);
    }

    #[tokio::test]
    async fn delete_rejects_foreign_and_unknown_purchases() {
        let (handler, _) = setup().await;

        let foreign = handler
            .record_purchase("u2", purchase("Foreign", 9999.0))
            .await
            .unwrap();

        assert!(matches!(
            handler.delete_purchase("u1", &foreign.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            handler.delete_purchase("u1", "no-such-id").await,
            Err(ServiceError::NotFound(_))
        ));

        // The foreign record survives untouched.
        assert_eq!(handler.total_purchases("u2").await.unwrap(), 9999.0);
    }

    #[tokio::test]
    async fn listings_come_back_newest_first() {
        let (handler, _) = setup().await;

        for (product, day) in [("Old", "2026-07-01"), ("New", "2026-08-20"), ("Mid", "2026-08-05")]
        {
            handler
                .record_purchase(
                    "u1",
                    NewPurchase {
                        category: Category::Beverage,
                        product: product.to_string(),
                        date: date(day),
                        value: 10.0,
                    },
                )
                .await
                .unwrap();
        }

        let listed = handler.list_purchases("u1").await.unwrap();
        let products: Vec<&str> = listed.iter().map(|p| p.product.as_str()).collect();
        assert_eq!(products, vec!["New", "Mid", "Old"]);
    }

    #[tokio::test]
    async fn goals_default_lazily_and_update_in_place() {
        let (handler, store) = setup().await;

        let goals = handler.goals_for("u1").await.unwrap();
        assert_eq!(goals.sales_goal, 50000.0);
        assert_eq!(goals.cmv_target, 30.0);
        // The default read materialized a row.
        assert!(store.get_goals("u1").await.unwrap().is_some());

        let updated = handler
            .update_goals(
                "u1",
                GoalsUpdate {
                    sales_goal: 80000.0,
                    cmv_target: 28.0,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.sales_goal, 80000.0);
        assert_eq!(handler.goals_for("u1").await.unwrap(), updated);

        assert!(matches!(
            handler
                .update_goals(
                    "u1",
                    GoalsUpdate {
                        sales_goal: 0.0,
                        cmv_target: 30.0,
                    },
                )
                .await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn export_report_carries_totals_and_ratios() {
        let (handler, _) = setup().await;

        handler
            .record_purchase("u1", purchase("Stock", 15000.0))
            .await
            .unwrap();
        handler.record_sale("u1", sale(60000.0)).await.unwrap();

        let report = handler.export_report("u1").await.unwrap();
        assert_eq!(report.filename, "CMV_Report_Bar_do_Zé.csv");
        assert!(report.content.contains("15000,00"));
        assert!(report.content.contains("60000,00"));
        assert!(report.content.contains("30.00%"));
        assert!(report.content.contains("25.00%"));
    }
}
