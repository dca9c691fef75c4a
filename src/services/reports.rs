use std::fmt::Write;

use crate::models::ledger::{Purchase, Sale};

// Leading BOM so spreadsheet tools pick up UTF-8.
const BOM: char = '\u{feff}';

#[derive(Clone, Debug, PartialEq)]
pub struct CsvReport {
    pub filename: String,
    pub content: String,
}

fn format_amount(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

fn sanitize_company(company: &str) -> String {
    company.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Consolidated semicolon-delimited report: purchases, sales, then the two
/// CMV indicators. Monetary cells use comma decimals.
pub fn build_report(
    company: &str,
    purchases: &[Purchase],
    sales: &[Sale],
    projected_cmv: f64,
    real_cmv: f64,
) -> CsvReport {
    let total_purchases: f64 = purchases.iter().map(|p| p.value).sum();
    let total_sales: f64 = sales.iter().map(|s| s.value).sum();

    let mut content = String::new();
    content.push(BOM);

    content.push_str("PURCHASE REPORT\n");
    content.push_str("ID;Product;Category;Date;Value\n");
    for purchase in purchases {
        let _ = writeln!(
            content,
            "{};{};{};{};{}",
            purchase.id,
            purchase.product,
            purchase.category.as_str(),
            purchase.date,
            format_amount(purchase.value)
        );
    }
    let _ = writeln!(
        content,
        "\nTOTAL PURCHASES:; ; ; ;{}\n",
        format_amount(total_purchases)
    );

    content.push_str("SALES REPORT (REVENUE)\n");
    content.push_str("ID;Date;Value\n");
    for sale in sales {
        let _ = writeln!(
            content,
            "{};{};{}",
            sale.id,
            sale.date,
            format_amount(sale.value)
        );
    }
    let _ = writeln!(
        content,
        "\nTOTAL SALES:; ;{}\n",
        format_amount(total_sales)
    );

    content.push_str("CMV INDICATORS\n");
    let _ = writeln!(content, "Projected CMV (goal based);{:.2}%", projected_cmv);
    let _ = writeln!(content, "Real CMV (actual sales);{:.2}%", real_cmv);

    CsvReport {
        filename: format!("CMV_Report_{}.csv", sanitize_company(company)),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::ledger::Category;

    fn sample_purchase() -> Purchase {
        Purchase {
            id: "p-1".to_string(),
            user_id: "u1".to_string(),
            category: Category::Beverage,
            product: "Coca-Cola 350ml".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            value: 1234.5,
        }
    }

    fn sample_sale() -> Sale {
        Sale {
            id: "s-1".to_string(),
            user_id: "u1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 2).unwrap(),
            value: 5000.0,
        }
    }

    #[test]
    fn report_starts_with_a_bom() {
        let report = build_report("Bar do Zé", &[], &[], 0.0, 0.0);
        assert!(report.content.starts_with('\u{feff}'));
    }

    #[test]
    fn report_has_all_three_sections() {
        let report = build_report("Bar do Zé", &[sample_purchase()], &[sample_sale()], 30.0, 25.0);

        assert!(report.content.contains("PURCHASE REPORT"));
        assert!(report.content.contains("SALES REPORT (REVENUE)"));
        assert!(report.content.contains("CMV INDICATORS"));
        assert!(report.content.contains("Projected CMV (goal based);30.00%"));
        assert!(report.content.contains("Real CMV (actual sales);25.00%"));
    }

    #[test]
    fn monetary_cells_use_comma_decimals() {
        let report = build_report("Bar", &[sample_purchase()], &[sample_sale()], 0.0, 0.0);

        assert!(report.content.contains("p-1;Coca-Cola 350ml;beverage;2026-08-01;1234,50"));
        assert!(report.content.contains("s-1;2026-08-02;5000,00"));
        assert!(report.content.contains("TOTAL PURCHASES:; ; ; ;1234,50"));
        assert!(report.content.contains("TOTAL SALES:; ;5000,00"));
    }

    #[test]
    fn filename_collapses_whitespace_in_the_company_name() {
        let report = build_report("  Bar  do  Zé ", &[], &[], 0.0, 0.0);
        assert_eq!(report.filename, "CMV_Report_Bar_do_Zé.csv");
    }
}
