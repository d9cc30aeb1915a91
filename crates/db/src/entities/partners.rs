//! `SeaORM` Entity for partners table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PartnerStatus, PlanType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub otp: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTimeWithTimeZone>,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_expires_at: Option<DateTimeWithTimeZone>,
    pub status: PartnerStatus,
    pub plan: PlanType,
    pub subscription_expires_at: Option<DateTimeWithTimeZone>,
    pub is_whatsapp_enabled: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trips::Entity")]
    Trips,
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::enquiries::Entity")]
    Enquiries,
    #[sea_orm(has_many = "super::subscription_histories::Entity")]
    SubscriptionHistories,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::enquiries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enquiries.def()
    }
}

impl Related<super::subscription_histories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubscriptionHistories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Subscription fields as seen by the access gate.
    #[must_use]
    pub fn subscription_state(&self) -> tripdesk_core::subscription::SubscriptionState {
        tripdesk_core::subscription::SubscriptionState {
            plan: self.plan.into(),
            expires_at: self.subscription_expires_at.map(|t| t.to_utc()),
        }
    }
}
