//! Trip repository. Trips are never deleted; `delete` marks them inactive.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::entities::{
    bookings, expenses,
    sea_orm_active_enums::{BookingStatus, TripStatus, TripType},
    trips,
};

/// Editable trip fields.
#[derive(Debug, Clone)]
pub struct TripFields {
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Price per member.
    pub price: Decimal,
    /// Destination.
    pub destination: Option<String>,
    /// Advance per member.
    pub advance_amount: Decimal,
    /// Package or camp.
    pub trip_type: TripType,
    /// First day.
    pub start_date: Option<NaiveDate>,
    /// Last day.
    pub end_date: Option<NaiveDate>,
    /// Seats.
    pub capacity: Option<i32>,
    /// Free-form group size, e.g. "10-15".
    pub group_size: Option<String>,
    /// Category.
    pub category: Option<String>,
}

/// Partial trip update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TripPatch {
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Price per member.
    pub price: Option<Decimal>,
    /// Destination.
    pub destination: Option<String>,
    /// Advance per member.
    pub advance_amount: Option<Decimal>,
    /// Package or camp.
    pub trip_type: Option<TripType>,
    /// First day.
    pub start_date: Option<NaiveDate>,
    /// Last day.
    pub end_date: Option<NaiveDate>,
    /// Seats.
    pub capacity: Option<i32>,
    /// Group size.
    pub group_size: Option<String>,
    /// Category.
    pub category: Option<String>,
}

/// A trip with its list-view figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripWithStats {
    /// Trip row.
    #[serde(flatten)]
    pub trip: trips::Model,
    /// Sum of recorded expenses.
    pub total_expenses: Decimal,
    /// Bookings that are not cancelled.
    pub booking_count: i64,
}

/// Trip repository.
#[derive(Debug, Clone)]
pub struct TripRepository {
    db: DatabaseConnection,
}

impl TripRepository {
    /// Creates a new trip repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an active trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn create(&self, partner_id: Uuid, fields: TripFields) -> Result<trips::Model, DbErr> {
        let now = Utc::now().into();
        let trip = trips::ActiveModel {
            id: Set(Uuid::new_v4()),
            partner_id: Set(partner_id),
            title: Set(fields.title),
            description: Set(fields.description),
            price: Set(fields.price),
            destination: Set(fields.destination),
            advance_amount: Set(fields.advance_amount),
            trip_type: Set(fields.trip_type),
            start_date: Set(fields.start_date),
            end_date: Set(fields.end_date),
            capacity: Set(fields.capacity),
            group_size: Set(fields.group_size),
            category: Set(fields.category),
            status: Set(TripStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(trip_id = %trip.id, %partner_id, "Trip created");
        Ok(trip)
    }

    /// Active trips of a partner, newest first, with expense totals and
    /// booking counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self, partner_id: Uuid) -> Result<Vec<TripWithStats>, DbErr> {
        let trips = trips::Entity::find()
            .filter(trips::Column::PartnerId.eq(partner_id))
            .filter(trips::Column::Status.eq(TripStatus::Active))
            .order_by_desc(trips::Column::CreatedAt)
            .all(&self.db)
            .await?;
        self.with_stats(trips).await
    }

    /// Inactive trips of a partner, most recently changed first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_inactive(&self, partner_id: Uuid) -> Result<Vec<trips::Model>, DbErr> {
        trips::Entity::find()
            .filter(trips::Column::PartnerId.eq(partner_id))
            .filter(trips::Column::Status.eq(TripStatus::Inactive))
            .order_by_desc(trips::Column::UpdatedAt)
            .all(&self.db)
            .await
    }

    /// Every trip on the platform, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<TripWithStats>, DbErr> {
        let trips = trips::Entity::find()
            .order_by_desc(trips::Column::CreatedAt)
            .all(&self.db)
            .await?;
        self.with_stats(trips).await
    }

    /// Finds a trip of the partner with the given status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_owned(
        &self,
        partner_id: Uuid,
        id: Uuid,
        status: Option<TripStatus>,
    ) -> Result<Option<trips::Model>, DbErr> {
        let mut query = trips::Entity::find_by_id(id).filter(trips::Column::PartnerId.eq(partner_id));
        if let Some(status) = status {
            query = query.filter(trips::Column::Status.eq(status));
        }
        query.one(&self.db).await
    }

    /// Finds a trip by ID regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<trips::Model>, DbErr> {
        trips::Entity::find_by_id(id).one(&self.db).await
    }

    /// Applies a patch to an active trip of the partner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update(
        &self,
        partner_id: Uuid,
        id: Uuid,
        patch: TripPatch,
    ) -> Result<Option<trips::Model>, DbErr> {
        let Some(trip) = self.find_owned(partner_id, id, Some(TripStatus::Active)).await? else {
            return Ok(None);
        };

        let mut active = trip.into_active_model();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = patch.price {
            active.price = Set(price);
        }
        if let Some(destination) = patch.destination {
            active.destination = Set(Some(destination));
        }
        if let Some(advance_amount) = patch.advance_amount {
            active.advance_amount = Set(advance_amount);
        }
        if let Some(trip_type) = patch.trip_type {
            active.trip_type = Set(trip_type);
        }
        if let Some(start_date) = patch.start_date {
            active.start_date = Set(Some(start_date));
        }
        if let Some(end_date) = patch.end_date {
            active.end_date = Set(Some(end_date));
        }
        if let Some(capacity) = patch.capacity {
            active.capacity = Set(Some(capacity));
        }
        if let Some(group_size) = patch.group_size {
            active.group_size = Set(Some(group_size));
        }
        if let Some(category) = patch.category {
            active.category = Set(Some(category));
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Moves a trip of the partner to `status`. `delete` passes inactive for
    /// any owned trip; `recover` only matches inactive trips.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set_status(
        &self,
        partner_id: Uuid,
        id: Uuid,
        from: Option<TripStatus>,
        to: TripStatus,
    ) -> Result<Option<trips::Model>, DbErr> {
        let Some(trip) = self.find_owned(partner_id, id, from).await? else {
            return Ok(None);
        };

        let mut active = trip.into_active_model();
        active.status = Set(to);
        active.updated_at = Set(Utc::now().into());
        let trip = active.update(&self.db).await?;

        info!(trip_id = %id, status = ?to, "Trip status changed");
        Ok(Some(trip))
    }

    /// Attaches expense totals and non-cancelled booking counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn with_stats(&self, trips: Vec<trips::Model>) -> Result<Vec<TripWithStats>, DbErr> {
        if trips.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = trips.iter().map(|t| t.id).collect();

        let expense_totals: HashMap<Uuid, Decimal> = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::TripId)
            .column_as(expenses::Column::Amount.sum(), "total")
            .filter(expenses::Column::TripId.is_in(ids.clone()))
            .group_by(expenses::Column::TripId)
            .into_tuple::<(Uuid, Option<Decimal>)>()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(id, total)| (id, total.unwrap_or_default()))
            .collect();

        let booking_counts: HashMap<Uuid, i64> = bookings::Entity::find()
            .select_only()
            .column(bookings::Column::TripId)
            .column_as(bookings::Column::Id.count(), "count")
            .filter(bookings::Column::TripId.is_in(ids))
            .filter(bookings::Column::Status.ne(BookingStatus::Cancelled))
            .group_by(bookings::Column::TripId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        Ok(trips
            .into_iter()
            .map(|trip| TripWithStats {
                total_expenses: expense_totals.get(&trip.id).copied().unwrap_or_default(),
                booking_count: booking_counts.get(&trip.id).copied().unwrap_or_default(),
                trip,
            })
            .collect())
    }
}
