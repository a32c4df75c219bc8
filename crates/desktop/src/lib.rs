//! `stockroom-desktop`
//!
//! **Responsibility:** the presentation-facing layer of the inventory app.
//!
//! This crate provides:
//! - Environment configuration and bootstrap (`AppConfig`, `AppContext`)
//! - Dashboard snapshot loading on a background task (`DashboardRefresher`)
//! - Text reports for the reports view
//!
//! Widgets and event wiring live in the GUI shell; everything it shows comes
//! through the shared `InventoryService` held by `AppContext`.

pub mod app;
pub mod config;
pub mod dashboard;
pub mod refresh;
pub mod report;
pub mod types;

pub use app::AppContext;
pub use config::AppConfig;
pub use refresh::DashboardRefresher;
pub use report::ReportsView;
pub use types::{DashboardSnapshot, ItemRow, StockStatus, SummaryStats};
