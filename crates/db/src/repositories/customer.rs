//! Roster rows feeding the customer directory.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tripdesk_core::customer::RosterRow;
use uuid::Uuid;

use crate::entities::{bookings, customers, trips};

/// Customer repository.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every member of every booking of the partner, joined with its booking
    /// and trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn roster(&self, partner_id: Uuid) -> Result<Vec<RosterRow>, DbErr> {
        let rows = customers::Entity::find()
            .find_also_related(bookings::Entity)
            .filter(bookings::Column::PartnerId.eq(partner_id))
            .all(&self.db)
            .await?;

        let trip_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, booking)| booking.as_ref().map(|b| b.trip_id))
            .collect();
        let titles: HashMap<Uuid, String> = trips::Entity::find()
            .filter(trips::Column::Id.is_in(trip_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t.title))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|(customer, booking)| {
                let booking = booking?;
                Some(RosterRow {
                    customer_id: customer.id,
                    name: customer.name,
                    contact_number: customer.contact_number,
                    gender: customer.gender.into(),
                    age: customer.age,
                    member_status: customer.status.into(),
                    booking_id: booking.id,
                    booking_status: booking.status.into(),
                    booking_date: booking.booking_date.to_utc(),
                    trip_id: booking.trip_id,
                    trip_title: titles.get(&booking.trip_id).cloned().unwrap_or_default(),
                })
            })
            .collect())
    }
}
