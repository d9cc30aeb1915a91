//! Platform-wide queries for administrators.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use tripdesk_shared::types::{PageRequest, PageResponse};
use uuid::Uuid;

use super::booking::{BookingOverview, BookingRepository, Scope};
use super::trip::{TripRepository, TripWithStats};
use crate::entities::{
    bookings, enquiries, partners, payments,
    sea_orm_active_enums::{PaymentStatus, PaymentType},
    trips,
};

/// Platform totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    /// Registered partners.
    pub total_partners: u64,
    /// Trips.
    pub total_trips: u64,
    /// Bookings.
    pub total_bookings: u64,
    /// Completed payments minus completed refunds.
    pub total_earnings: Decimal,
}

/// A partner row with its trip count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSummary {
    /// Partner.
    #[serde(flatten)]
    pub partner: partners::Model,
    /// Trips owned, including inactive ones.
    pub trip_count: i64,
}

/// A trip with the bookings made on it.
#[derive(Debug, Clone)]
pub struct PartnerTrip {
    /// Trip with list figures.
    pub trip: TripWithStats,
    /// Bookings, newest first.
    pub bookings: Vec<BookingOverview>,
}

/// Everything an administrator sees about one partner.
#[derive(Debug, Clone)]
pub struct PartnerDetails {
    /// Partner.
    pub partner: partners::Model,
    /// Trips with bookings.
    pub trips: Vec<PartnerTrip>,
    /// Enquiries, newest first.
    pub enquiries: Vec<enquiries::Model>,
}

/// A trip with its owner.
#[derive(Debug, Clone)]
pub struct OwnedTrip {
    /// Trip with list figures.
    pub trip: TripWithStats,
    /// Owner, if still present.
    pub partner: Option<partners::Model>,
}

/// Admin repository.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    db: DatabaseConnection,
}

impl AdminRepository {
    /// Creates a new admin repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Platform totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn stats(&self) -> Result<PlatformStats, DbErr> {
        let total_partners = partners::Entity::find().count(&self.db).await?;
        let total_trips = trips::Entity::find().count(&self.db).await?;
        let total_bookings = bookings::Entity::find().count(&self.db).await?;

        let collected = self.completed_sum(false).await?;
        let refunded = self.completed_sum(true).await?;

        Ok(PlatformStats {
            total_partners,
            total_trips,
            total_bookings,
            total_earnings: collected - refunded,
        })
    }

    /// One page of partners, newest first, with trip counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn partners(&self, page: &PageRequest) -> Result<PageResponse<PartnerSummary>, DbErr> {
        let paginator = partners::Entity::find()
            .order_by_desc(partners::Column::CreatedAt)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(u64::from(page.page() - 1)).await?;

        let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
        let counts: HashMap<Uuid, i64> = trips::Entity::find()
            .select_only()
            .column(trips::Column::PartnerId)
            .column_as(trips::Column::Id.count(), "count")
            .filter(trips::Column::PartnerId.is_in(ids))
            .group_by(trips::Column::PartnerId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        let items = rows
            .into_iter()
            .map(|partner| PartnerSummary {
                trip_count: counts.get(&partner.id).copied().unwrap_or_default(),
                partner,
            })
            .collect();

        Ok(PageResponse::new(items, page, total))
    }

    /// A partner with trips, bookings and enquiries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn partner_details(&self, id: Uuid) -> Result<Option<PartnerDetails>, DbErr> {
        let Some(partner) = partners::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let trips = TripRepository::new(self.db.clone());
        let owned = trips::Entity::find()
            .filter(trips::Column::PartnerId.eq(id))
            .order_by_desc(trips::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let owned = trips.with_stats(owned).await?;

        let mut by_trip: HashMap<Uuid, Vec<BookingOverview>> = HashMap::new();
        for booking in BookingRepository::new(self.db.clone())
            .list(Scope::Partner(id), None, true)
            .await?
        {
            by_trip.entry(booking.trip.id).or_default().push(booking);
        }

        let enquiries = enquiries::Entity::find()
            .filter(enquiries::Column::PartnerId.eq(id))
            .order_by_desc(enquiries::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(Some(PartnerDetails {
            partner,
            trips: owned
                .into_iter()
                .map(|trip| PartnerTrip {
                    bookings: by_trip.remove(&trip.trip.id).unwrap_or_default(),
                    trip,
                })
                .collect(),
            enquiries,
        }))
    }

    /// Every trip with its owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn trips(&self) -> Result<Vec<OwnedTrip>, DbErr> {
        let trips = TripRepository::new(self.db.clone()).list_all().await?;
        let owner_ids: Vec<Uuid> = trips.iter().map(|t| t.trip.partner_id).collect();
        let owners: HashMap<Uuid, partners::Model> = partners::Entity::find()
            .filter(partners::Column::Id.is_in(owner_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(trips
            .into_iter()
            .map(|trip| OwnedTrip {
                partner: owners.get(&trip.trip.partner_id).cloned(),
                trip,
            })
            .collect())
    }

    async fn completed_sum(&self, refunds: bool) -> Result<Decimal, DbErr> {
        let kind = if refunds {
            payments::Column::PaymentType.eq(PaymentType::Refund)
        } else {
            payments::Column::PaymentType.ne(PaymentType::Refund)
        };

        let total = payments::Entity::find()
            .select_only()
            .column_as(payments::Column::Amount.sum(), "total")
            .filter(payments::Column::Status.eq(PaymentStatus::Completed))
            .filter(kind)
            .into_tuple::<Option<Decimal>>()
            .one(&self.db)
            .await?;
        Ok(total.flatten().unwrap_or_default())
    }
}
