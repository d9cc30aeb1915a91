//! `SeaORM` entity definitions.

pub mod bookings;
pub mod customers;
pub mod enquiries;
pub mod expenses;
pub mod partners;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod subscription_histories;
pub mod system_settings;
pub mod trips;
