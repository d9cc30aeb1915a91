//! Customer directory built from booking rosters.
//!
//! Customers are not first-class records: the same traveller appears once
//! per booking. The directory merges those rows by contact number, falling
//! back to the name when no number was captured.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::booking::{BookingStatus, Gender, MemberStatus};

/// One booking member joined with its booking and trip.
#[derive(Debug, Clone)]
pub struct RosterRow {
    /// Customer row id.
    pub customer_id: Uuid,
    /// Name.
    pub name: String,
    /// Contact number.
    pub contact_number: Option<String>,
    /// Gender.
    pub gender: Gender,
    /// Age.
    pub age: i32,
    /// Member status.
    pub member_status: MemberStatus,
    /// Booking id.
    pub booking_id: Uuid,
    /// Booking status.
    pub booking_status: BookingStatus,
    /// Booking date.
    pub booking_date: DateTime<Utc>,
    /// Trip id.
    pub trip_id: Uuid,
    /// Trip title.
    pub trip_title: String,
}

/// A trip taken by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripVisit {
    /// Booking id.
    pub booking_id: Uuid,
    /// Trip id.
    pub trip_id: Uuid,
    /// Trip title.
    pub title: String,
    /// Booking date.
    pub date: DateTime<Utc>,
    /// `Active` or `Cancelled`.
    pub status: &'static str,
}

/// A traveller with their booking history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    /// Id of the most recent customer row.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Contact number or `N/A`.
    pub contact_number: String,
    /// Gender.
    pub gender: Gender,
    /// Age.
    pub age: i32,
    /// Bookings the customer appears in.
    pub total_trips: usize,
    /// Bookings still active for the customer.
    pub active_trips: usize,
    /// Bookings cancelled for the customer.
    pub cancelled_trips: usize,
    /// Most recent trip.
    pub last_trip: Option<TripVisit>,
    /// All trips, newest first.
    pub trips: Vec<TripVisit>,
}

/// Builds the directory, sorted by name.
#[must_use]
pub fn build_directory(mut rows: Vec<RosterRow>) -> Vec<CustomerRecord> {
    rows.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut records: Vec<CustomerRecord> = Vec::new();

    for row in rows {
        let key = row
            .contact_number
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map_or_else(|| format!("name-{}", row.name), str::to_string);

        let slot = *index.entry(key).or_insert_with(|| {
            records.push(CustomerRecord {
                id: row.customer_id,
                name: row.name.clone(),
                contact_number: row
                    .contact_number
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| "N/A".to_string()),
                gender: row.gender,
                age: row.age,
                total_trips: 0,
                active_trips: 0,
                cancelled_trips: 0,
                last_trip: None,
                trips: Vec::new(),
            });
            records.len() - 1
        });

        let cancelled = row.member_status == MemberStatus::Cancelled
            || row.booking_status == BookingStatus::Cancelled;
        let visit = TripVisit {
            booking_id: row.booking_id,
            trip_id: row.trip_id,
            title: row.trip_title,
            date: row.booking_date,
            status: if cancelled { "Cancelled" } else { "Active" },
        };

        let record = &mut records[slot];
        record.total_trips += 1;
        if cancelled {
            record.cancelled_trips += 1;
        } else {
            record.active_trips += 1;
        }
        if record.last_trip.is_none() {
            record.last_trip = Some(visit.clone());
        }
        record.trips.push(visit);
    }

    records.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(name: &str, phone: Option<&str>, day: u32, member: MemberStatus) -> RosterRow {
        RosterRow {
            customer_id: Uuid::new_v4(),
            name: name.to_string(),
            contact_number: phone.map(str::to_string),
            gender: Gender::Female,
            age: 30,
            member_status: member,
            booking_id: Uuid::new_v4(),
            booking_status: BookingStatus::Confirmed,
            booking_date: Utc.with_ymd_and_hms(2026, 4, day, 9, 0, 0).unwrap(),
            trip_id: Uuid::new_v4(),
            trip_title: format!("Trip {day}"),
        }
    }

    #[test]
    fn test_merges_by_contact_number() {
        let rows = vec![
            row("Meera", Some("9876543210"), 1, MemberStatus::Active),
            row("Meera K", Some("9876543210"), 5, MemberStatus::Cancelled),
            row("Arjun", Some("9000000000"), 3, MemberStatus::Active),
        ];

        let directory = build_directory(rows);

        assert_eq!(directory.len(), 2);
        assert_eq!(directory[0].name, "Arjun");
        let meera = &directory[1];
        assert_eq!(meera.name, "Meera K");
        assert_eq!(meera.total_trips, 2);
        assert_eq!(meera.active_trips, 1);
        assert_eq!(meera.cancelled_trips, 1);
        let last = meera.last_trip.as_ref().unwrap();
        assert_eq!(last.title, "Trip 5");
        assert_eq!(last.status, "Cancelled");
        assert_eq!(meera.trips.len(), 2);
    }

    #[test]
    fn test_falls_back_to_name_without_number() {
        let rows = vec![
            row("Kabir", None, 1, MemberStatus::Active),
            row("Kabir", Some(""), 2, MemberStatus::Active),
            row("kabir", None, 3, MemberStatus::Active),
        ];

        let directory = build_directory(rows);

        assert_eq!(directory.len(), 2);
        let kabir = directory.iter().find(|c| c.name == "Kabir").unwrap();
        assert_eq!(kabir.total_trips, 2);
        assert_eq!(kabir.contact_number, "N/A");
    }

    #[test]
    fn test_cancelled_booking_marks_trip_cancelled() {
        let mut r = row("Isha", Some("9111111111"), 2, MemberStatus::Active);
        r.booking_status = BookingStatus::Cancelled;

        let directory = build_directory(vec![r]);

        assert_eq!(directory[0].cancelled_trips, 1);
        assert_eq!(directory[0].active_trips, 0);
    }
}
