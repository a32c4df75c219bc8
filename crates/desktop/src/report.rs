//! Text reports for the reports view (monospaced layout).

use std::fmt::Write as _;

use stockroom_inventory::{CategorySummary, InventoryResult, InventoryService, Item, ItemStore};

use crate::types::SummaryStats;

/// `$` followed by the amount with two decimals.
pub fn format_currency(value: f64) -> String {
    format!("${value:.2}")
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Items at or below `threshold`, one row per item.
pub fn low_stock_report(threshold: i64, items: &[Item]) -> String {
    let mut report = format!("Items with quantity <= {threshold}:\n\n");

    if items.is_empty() {
        report.push_str("No low stock items found.");
        return report;
    }

    let _ = writeln!(report, "{:<20} {:<10} {:<10}", "Name", "Quantity", "Category");
    let _ = writeln!(report, "{}", "-".repeat(45));
    for item in items {
        let _ = writeln!(
            report,
            "{:<20} {:<10} {:<10}",
            truncate(&item.name, 20),
            item.quantity,
            truncate(&item.category, 10)
        );
    }
    let _ = write!(report, "\nTotal low stock items: {}", items.len());
    report
}

/// Item count and stock value per category, with a grand total row.
pub fn category_breakdown_report(summaries: &[CategorySummary]) -> String {
    let mut report = String::from("Category Breakdown:\n\n");
    let _ = writeln!(report, "{:<15} {:<8} {:<12}", "Category", "Items", "Total Value");
    let _ = writeln!(report, "{}", "-".repeat(40));

    let mut total_items = 0usize;
    let mut grand_total = 0.0f64;
    for summary in summaries {
        let _ = writeln!(
            report,
            "{:<15} {:<8} {:<12}",
            truncate(&summary.category, 15),
            summary.item_count,
            format_currency(summary.total_value)
        );
        total_items += summary.item_count;
        grand_total += summary.total_value;
    }

    let _ = writeln!(report, "{}", "-".repeat(40));
    let _ = writeln!(
        report,
        "{:<15} {:<8} {:<12}",
        "TOTAL",
        total_items,
        format_currency(grand_total)
    );
    report
}

/// Everything the reports view shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportsView {
    pub summary: SummaryStats,
    pub low_stock: String,
    pub category_breakdown: String,
}

impl ReportsView {
    pub async fn load<S: ItemStore>(
        service: &InventoryService<S>,
        low_stock_threshold: i64,
    ) -> InventoryResult<Self> {
        let summary = SummaryStats::load(service).await?;
        let low_items = service.low_stock_items(low_stock_threshold).await?;
        let breakdown = service.category_breakdown().await?;

        Ok(Self {
            summary,
            low_stock: low_stock_report(low_stock_threshold, &low_items),
            category_breakdown: category_breakdown_report(&breakdown),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_inventory::{InMemoryItemStore, ItemDraft};

    #[test]
    fn currency_has_two_decimals() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(11.0), "$11.00");
        assert_eq!(format_currency(1234.567), "$1234.57");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Short", 10), "Short");
        assert_eq!(truncate("Exactly10!", 10), "Exactly10!");
        assert_eq!(truncate("Construction Supplies", 15), "Construction...");
        assert_eq!(truncate("Ünïcödé wörds", 8), "Ünïcö...");
    }

    #[test]
    fn empty_low_stock_report_says_so() {
        assert_eq!(
            low_stock_report(5, &[]),
            "Items with quantity <= 5:\n\nNo low stock items found."
        );
    }

    #[tokio::test]
    async fn low_stock_report_lists_rows_and_total() {
        let service = InventoryService::new(InMemoryItemStore::new());
        service
            .add_item(ItemDraft::new("Bolt", "Parts").with_quantity(3))
            .await
            .unwrap();
        service
            .add_item(ItemDraft::new("Extremely Long Item Name", "Hardware Supplies").with_quantity(0))
            .await
            .unwrap();
        service
            .add_item(ItemDraft::new("Nut", "Parts").with_quantity(50))
            .await
            .unwrap();

        let items = service.low_stock_items(5).await.unwrap();
        let report = low_stock_report(5, &items);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "Items with quantity <= 5:");
        assert_eq!(lines[2], format!("{:<20} {:<10} {:<10}", "Name", "Quantity", "Category"));
        assert_eq!(lines[3], "-".repeat(45));
        assert_eq!(lines[4], format!("{:<20} {:<10} {:<10}", "Bolt", 3, "Parts"));
        assert_eq!(lines[5], format!("{:<20} {:<10} {:<10}", "Extremely Long It...", 0, "Hardwar..."));
        assert_eq!(lines.last(), Some(&"Total low stock items: 2"));
    }

    #[test]
    fn category_breakdown_has_total_row() {
        let summaries = vec![
            CategorySummary {
                category: "Parts".to_string(),
                item_count: 2,
                total_value: 10.5,
            },
            CategorySummary {
                category: "Tools".to_string(),
                item_count: 1,
                total_value: 45.0,
            },
        ];
        let report = category_breakdown_report(&summaries);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "Category Breakdown:");
        assert_eq!(lines[3], "-".repeat(40));
        assert_eq!(lines[4], format!("{:<15} {:<8} ${:<11}", "Parts", 2, "10.50"));
        assert_eq!(lines[5], format!("{:<15} {:<8} ${:<11}", "Tools", 1, "45.00"));
        assert_eq!(lines[7], format!("{:<15} {:<8} ${:<11}", "TOTAL", 3, "55.50"));
    }

    #[tokio::test]
    async fn reports_view_combines_summary_and_text() {
        let service = InventoryService::new(InMemoryItemStore::new());
        service
            .add_item(ItemDraft::new("Hammer", "Tools").with_quantity(2).with_price(3.0))
            .await
            .unwrap();
        service
            .add_item(ItemDraft::new("Bolt", "Parts").with_quantity(1).with_price(5.0))
            .await
            .unwrap();

        let view = ReportsView::load(&service, 5).await.unwrap();
        assert_eq!(view.summary.total_items, 2);
        assert_eq!(format_currency(view.summary.total_value), "$11.00");
        assert_eq!(view.summary.category_count, 2);
        assert!(view.low_stock.ends_with("Total low stock items: 2"));
        assert!(view.category_breakdown.contains("TOTAL"));
    }

    #[tokio::test]
    async fn empty_inventory_reports_zero_totals() {
        let service = InventoryService::new(InMemoryItemStore::new());
        let view = ReportsView::load(&service, 5).await.unwrap();

        assert_eq!(format_currency(view.summary.total_value), "$0.00");
        assert_eq!(view.low_stock, "Items with quantity <= 5:\n\nNo low stock items found.");
        let total = view.category_breakdown.lines().last().unwrap();
        assert_eq!(total, format!("{:<15} {:<8} {:<12}", "TOTAL", 0, "$0.00"));
    }
}
