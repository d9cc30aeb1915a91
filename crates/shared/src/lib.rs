//! Shared types, errors, and configuration for Tripdesk.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types with their HTTP mapping
//! - Configuration management
//! - JWT claims and token service
//! - Outbound clients (SMTP email, WhatsApp gateway, payment gateway)
//! - Pagination types for list endpoints

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod payment_gateway;
pub mod types;
pub mod whatsapp;

pub use auth::Claims;
pub use config::{AppConfig, EmailConfig};
pub use email::{EmailError, EmailService};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use payment_gateway::{GatewayError, GatewayOrder, PaymentGatewayClient};
pub use whatsapp::{WhatsappClient, WhatsappError};
