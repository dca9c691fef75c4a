use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::gauge::GaugeReading;
use crate::models::goals::Goals;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Beverage,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Beverage => "beverage",
        }
    }

    pub fn parse(value: &str) -> Option<Category> {
        match value {
            "food" => Some(Category::Food),
            "beverage" => Some(Category::Beverage),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Purchase {
    pub id: String,
    pub user_id: String,
    pub category: Category,
    pub product: String,
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sale {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewPurchase {
    pub category: Category,
    pub product: String,
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewSale {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StructuredPurchase {
    pub product: String,
    pub category: Category,
    pub value: f64,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, Serialize)]
pub struct DashboardSummary {
    pub total_purchases: f64,
    pub total_sales: f64,
    pub projected_cmv: f64,
    pub real_cmv: f64,
    pub goals: Goals,
    pub projected_gauge: GaugeReading,
    pub real_gauge: GaugeReading,
    pub revenue_gauge: GaugeReading,
}
