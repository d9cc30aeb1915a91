//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;

pub use error::{BookingRepoError, map_db_error};
pub use repositories::{
    AdminRepository, BookingRepository, CompletedCheckout, CustomerRepository,
    DashboardRepository, DashboardStats, EnquiryFields, EnquiryRepository, ExpenseFields,
    ExpensePatch, ExpenseRepository, NewOrder, PartnerRepository, SubscriptionRepository,
    SystemSettingRepository, TripFields, TripPatch, TripRepository, TripWithStats,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tripdesk_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Opens a connection pool sized from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
