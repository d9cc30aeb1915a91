//! Partner dashboard figures.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{bookings, trips};

/// Headline numbers of a partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Trips, including inactive ones.
    pub total_trips: u64,
    /// Bookings.
    pub total_bookings: u64,
    /// Net amount held across all bookings.
    pub total_earnings: Decimal,
    /// Net amount held by bookings created this calendar month.
    pub monthly_earnings: Decimal,
}

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes the partner's figures as of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn stats(&self, partner_id: Uuid, now: DateTime<Utc>) -> Result<DashboardStats, DbErr> {
        let total_trips = trips::Entity::find()
            .filter(trips::Column::PartnerId.eq(partner_id))
            .count(&self.db)
            .await?;
        let total_bookings = bookings::Entity::find()
            .filter(bookings::Column::PartnerId.eq(partner_id))
            .count(&self.db)
            .await?;

        let total_earnings = self.sum_amount(partner_id, None).await?;
        let monthly_earnings = self.sum_amount(partner_id, Some(month_start(now))).await?;

        Ok(DashboardStats {
            total_trips,
            total_bookings,
            total_earnings,
            monthly_earnings,
        })
    }

    async fn sum_amount(
        &self,
        partner_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Decimal, DbErr> {
        let mut query = bookings::Entity::find()
            .select_only()
            .column_as(bookings::Column::Amount.sum(), "total")
            .filter(bookings::Column::PartnerId.eq(partner_id));
        if let Some(since) = since {
            query = query.filter(bookings::Column::CreatedAt.gte(since));
        }

        let total = query.into_tuple::<Option<Decimal>>().one(&self.db).await?;
        Ok(total.flatten().unwrap_or_default())
    }
}

/// Midnight UTC on the first day of `now`'s month.
#[must_use]
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}
