//! `SeaORM` active enums backed by Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tripdesk_core::{booking, expense, subscription};

/// Partner account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "partner_status")]
#[serde(rename_all = "snake_case")]
pub enum PartnerStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

/// Subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "plan_type")]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "pro")]
    Pro,
}

/// Trip kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "trip_type")]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    #[sea_orm(string_value = "package")]
    Package,
    #[sea_orm(string_value = "camp")]
    Camp,
}

/// Trip lifecycle flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "trip_status")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// Booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "partial_cancelled")]
    PartialCancelled,
}

/// Booking member status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "member_status")]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Member gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "gender")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Payment row kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_type")]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[sea_orm(string_value = "full")]
    Full,
    #[sea_orm(string_value = "advance")]
    Advance,
    #[sea_orm(string_value = "custom")]
    Custom,
    #[sea_orm(string_value = "balance")]
    Balance,
    #[sea_orm(string_value = "refund")]
    Refund,
}

/// Settlement state of a payment or subscription purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_category")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    #[sea_orm(string_value = "accommodation")]
    Accommodation,
    #[sea_orm(string_value = "food")]
    Food,
    #[sea_orm(string_value = "transportation")]
    Transportation,
    #[sea_orm(string_value = "activities")]
    Activities,
    #[sea_orm(string_value = "equipment")]
    Equipment,
    #[sea_orm(string_value = "permits")]
    Permits,
    #[sea_orm(string_value = "guide_fees")]
    GuideFees,
    #[sea_orm(string_value = "medical")]
    Medical,
    #[sea_orm(string_value = "miscellaneous")]
    Miscellaneous,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Lead temperature of an enquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "enquiry_status")]
#[serde(rename_all = "snake_case")]
pub enum EnquiryStatus {
    #[sea_orm(string_value = "hot")]
    Hot,
    #[sea_orm(string_value = "warm")]
    Warm,
    #[sea_orm(string_value = "cold")]
    Cold,
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

macro_rules! mirror_enum {
    ($db:ident, $domain:ty, [$($variant:ident),+ $(,)?]) => {
        impl From<$db> for $domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$domain> for $db {
            fn from(value: $domain) -> Self {
                type Domain = $domain;
                match value {
                    $(Domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(
    BookingStatus,
    booking::BookingStatus,
    [Pending, Confirmed, Cancelled, PartialCancelled]
);
mirror_enum!(MemberStatus, booking::MemberStatus, [Active, Cancelled]);
mirror_enum!(Gender, booking::Gender, [Male, Female, Other]);
mirror_enum!(
    PaymentType,
    booking::PaymentType,
    [Full, Advance, Custom, Balance, Refund]
);
mirror_enum!(PlanType, subscription::Plan, [Free, Pro]);
mirror_enum!(
    ExpenseCategory,
    expense::ExpenseCategory,
    [
        Accommodation,
        Food,
        Transportation,
        Activities,
        Equipment,
        Permits,
        GuideFees,
        Medical,
        Miscellaneous,
        Other,
    ]
);

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_booking_status_round_trip() {
        for status in BookingStatus::iter() {
            let domain: booking::BookingStatus = status.into();
            assert_eq!(BookingStatus::from(domain), status);
            assert_eq!(domain.as_str(), status.to_value());
        }
    }

    #[test]
    fn test_expense_category_values_match_domain() {
        for category in ExpenseCategory::iter() {
            let domain: expense::ExpenseCategory = category.into();
            assert_eq!(domain.as_str(), category.to_value());
        }
    }
}
