//! Core business logic for Tripdesk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `booking` - Booking cost, payment and cancellation reconciliation
//! - `subscription` - Plan access predicate and gateway signature checks
//! - `auth` - Password hashing, OTPs and reset tokens
//! - `expense` - Trip expense summaries and analytics
//! - `customer` - Customer directory built from booking rosters
//! - `receipt` - Booking confirmation and payment receipt PDFs
//! - `storage` - Object storage for uploads

pub mod auth;
pub mod booking;
pub mod customer;
pub mod expense;
pub mod receipt;
pub mod storage;
pub mod subscription;
