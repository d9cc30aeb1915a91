//! Booking repository: creation, statements, payments and cancellations.
//!
//! Every write runs in a database transaction. Payment and cancellation take
//! a row lock on the booking (`SELECT ... FOR UPDATE`) before reading its
//! amount, so concurrent writers serialize on the booking row.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use tripdesk_core::booking::{
    BookingError, BookingFigures, BookingStatement, CostBasis, InitialPayment, MemberRef,
    NewMember, PaymentLine, PaymentMode, TripBookingSummary, initial_amount, initial_status,
    plan_cancellation, plan_payment, validate_roster,
};

use crate::entities::{
    bookings, customers, payments, trips,
    sea_orm_active_enums::{Gender, MemberStatus, PaymentStatus, PaymentType, TripStatus},
};
use crate::error::BookingRepoError;

/// Whose bookings a query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only bookings of this partner.
    Partner(Uuid),
    /// Every booking (administrators).
    Any,
}

impl Scope {
    fn apply(self, query: Select<bookings::Entity>) -> Select<bookings::Entity> {
        match self {
            Self::Partner(partner_id) => query.filter(bookings::Column::PartnerId.eq(partner_id)),
            Self::Any => query,
        }
    }
}

/// A member supplied on creation or participant update.
#[derive(Debug, Clone)]
pub struct MemberInput {
    /// Existing member id; `None` adds a new member.
    pub id: Option<Uuid>,
    /// Name.
    pub name: String,
    /// Gender.
    pub gender: Gender,
    /// Age.
    pub age: i32,
    /// Contact number.
    pub contact_number: Option<String>,
    /// Booking contact flag.
    pub is_primary: bool,
    /// Home town.
    pub place: Option<String>,
}

/// Input for creating a booking.
#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    /// Owning partner.
    pub partner_id: Uuid,
    /// Trip to book.
    pub trip_id: Uuid,
    /// Roster.
    pub members: Vec<MemberInput>,
    /// First payment.
    pub payment: InitialPayment,
    /// Payment method.
    pub payment_method: Option<String>,
    /// Gateway or bank reference.
    pub transaction_id: Option<String>,
    /// When the first payment was made.
    pub payment_date: DateTime<Utc>,
    /// Uploaded payment screenshot.
    pub screenshot_url: Option<String>,
    /// Members booked; defaults to the roster size.
    pub member_count: Option<i32>,
    /// Preferred travel date.
    pub preferred_date: Option<NaiveDate>,
    /// Package price overriding per-member pricing.
    pub total_package_price: Option<Decimal>,
    /// Discount.
    pub concession_amount: Decimal,
}

/// Input for a follow-up payment.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    /// Balance or custom amount.
    pub mode: PaymentMode,
    /// Replacement concession.
    pub concession: Option<Decimal>,
    /// Payment method.
    pub method: Option<String>,
    /// Gateway or bank reference.
    pub transaction_id: Option<String>,
    /// When the payment was made.
    pub payment_date: DateTime<Utc>,
    /// Uploaded payment screenshot.
    pub screenshot_url: Option<String>,
}

/// Input for cancelling members.
#[derive(Debug, Clone)]
pub struct CancelMembersInput {
    /// Members to cancel.
    pub member_ids: Vec<Uuid>,
    /// Amount returned to the customer.
    pub refund_amount: Option<Decimal>,
    /// Reason, kept on the refund row.
    pub reason: Option<String>,
    /// Refund method.
    pub method: Option<String>,
    /// Refund date; defaults to now.
    pub payment_date: Option<DateTime<Utc>>,
    /// Uploaded refund screenshot.
    pub screenshot_url: Option<String>,
}

/// A booking with everything needed to show its statement.
#[derive(Debug, Clone)]
pub struct BookingDetails {
    /// Booking row.
    pub booking: bookings::Model,
    /// Booked trip.
    pub trip: trips::Model,
    /// Members, primary first.
    pub customers: Vec<customers::Model>,
    /// Payments, newest first.
    pub payments: Vec<payments::Model>,
    /// Derived figures.
    pub statement: BookingStatement,
}

impl BookingDetails {
    /// Primary member, or the first member with a contact number.
    #[must_use]
    pub fn contact(&self) -> Option<&customers::Model> {
        self.customers
            .iter()
            .find(|c| c.is_primary && c.contact_number.is_some())
            .or_else(|| self.customers.iter().find(|c| c.contact_number.is_some()))
    }
}

/// A booking row in list views.
#[derive(Debug, Clone)]
pub struct BookingOverview {
    /// Booking row.
    pub booking: bookings::Model,
    /// Booked trip.
    pub trip: trips::Model,
    /// Members.
    pub customers: Vec<customers::Model>,
    /// Cost of the active members.
    pub total_cost: Decimal,
    /// Members still travelling.
    pub active_member_count: i32,
}

impl BookingOverview {
    fn figures(&self) -> BookingFigures {
        BookingFigures {
            status: self.booking.status.into(),
            active_member_count: self.active_member_count,
            total_cost: self.total_cost,
            net_paid: self.booking.amount,
        }
    }
}

/// Bookings of one trip with their collection summary.
#[derive(Debug, Clone)]
pub struct TripBookings {
    /// Roll-up over non-cancelled bookings.
    pub summary: TripBookingSummary,
    /// Bookings, newest first.
    pub bookings: Vec<BookingOverview>,
}

/// Result of a payment.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The recorded payment.
    pub payment: payments::Model,
    /// Booking after the payment.
    pub details: BookingDetails,
}

/// Result of a cancellation.
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    /// Members flipped to cancelled.
    pub cancelled_member_ids: Vec<Uuid>,
    /// Refund row, if money was returned.
    pub refund: Option<payments::Model>,
    /// Booking after the cancellation.
    pub details: BookingDetails,
}

/// Cost inputs of a booking.
#[must_use]
pub fn cost_basis(
    booking: &bookings::Model,
    trip: &trips::Model,
    members: &[customers::Model],
) -> CostBasis {
    CostBasis {
        trip_price: trip.price,
        member_count: booking.member_count,
        cancelled_members: members
            .iter()
            .filter(|c| c.status == MemberStatus::Cancelled)
            .count(),
        total_package_price: booking.total_package_price,
        concession: booking.concession_amount,
    }
}

/// Payment rows as ledger lines.
#[must_use]
pub fn payment_lines(rows: &[payments::Model]) -> Vec<PaymentLine> {
    rows.iter()
        .map(|p| PaymentLine {
            amount: p.amount,
            payment_type: p.payment_type.into(),
        })
        .collect()
}

/// Booking repository.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    db: DatabaseConnection,
}

impl BookingRepository {
    /// Creates a new booking repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a booking with its members and first payment.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidRoster` for a bad roster,
    /// `BookingError::TripUnavailable` when the trip is not an active trip of
    /// the partner, `BookingError::InvalidAmount` for a bad custom amount, or
    /// a database error.
    pub async fn create(&self, input: CreateBookingInput) -> Result<BookingDetails, BookingRepoError> {
        let roster: Vec<NewMember<'_>> = input
            .members
            .iter()
            .map(|m| NewMember {
                is_primary: m.is_primary,
                contact_number: m.contact_number.as_deref(),
            })
            .collect();
        validate_roster(&roster)?;

        let txn = self.db.begin().await?;

        let trip = trips::Entity::find_by_id(input.trip_id)
            .filter(trips::Column::PartnerId.eq(input.partner_id))
            .filter(trips::Column::Status.eq(TripStatus::Active))
            .one(&txn)
            .await?
            .ok_or(BookingError::TripUnavailable)?;

        let listed = i32::try_from(input.members.len()).unwrap_or(i32::MAX);
        let member_count = input.member_count.unwrap_or(listed).max(listed);

        let amount = initial_amount(input.payment, trip.price, trip.advance_amount, member_count)?;
        let basis = CostBasis {
            trip_price: trip.price,
            member_count,
            cancelled_members: 0,
            total_package_price: input.total_package_price,
            concession: input.concession_amount,
        };
        let status = initial_status(&basis, amount);

        let now = Utc::now().into();
        let booking_id = Uuid::new_v4();

        bookings::ActiveModel {
            id: Set(booking_id),
            trip_id: Set(trip.id),
            partner_id: Set(input.partner_id),
            member_count: Set(member_count),
            amount: Set(amount),
            total_package_price: Set(basis.package_price()),
            concession_amount: Set(input.concession_amount),
            preferred_date: Set(input.preferred_date),
            booking_date: Set(now),
            is_active: Set(true),
            status: Set(status.into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let members = input.members.into_iter().map(|m| new_member(booking_id, m));
        customers::Entity::insert_many(members).exec(&txn).await?;

        payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(booking_id),
            amount: Set(amount),
            method: Set(input.payment_method),
            payment_type: Set(PaymentType::from(
                tripdesk_core::booking::PaymentType::from(input.payment.payment_type),
            )),
            status: Set(PaymentStatus::Completed),
            transaction_id: Set(input.transaction_id),
            payment_date: Set(input.payment_date.into()),
            screenshot_url: Set(input.screenshot_url),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(%booking_id, trip_id = %trip.id, %amount, %status, "Booking created");

        self.find(Scope::Partner(input.partner_id), booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound.into())
    }

    /// Loads a booking with its trip, members, payments and statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, scope: Scope, id: Uuid) -> Result<Option<BookingDetails>, DbErr> {
        load_details(&self.db, scope, id).await
    }

    /// Lists bookings newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        scope: Scope,
        trip_id: Option<Uuid>,
        include_inactive: bool,
    ) -> Result<Vec<BookingOverview>, DbErr> {
        let mut query = scope.apply(bookings::Entity::find());
        if let Some(trip_id) = trip_id {
            query = query.filter(bookings::Column::TripId.eq(trip_id));
        }
        if !include_inactive {
            query = query.filter(bookings::Column::IsActive.eq(true));
        }

        let rows = query
            .order_by_desc(bookings::Column::CreatedAt)
            .all(&self.db)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let trip_ids: Vec<Uuid> = rows.iter().map(|b| b.trip_id).collect();
        let booking_ids: Vec<Uuid> = rows.iter().map(|b| b.id).collect();

        let trips: HashMap<Uuid, trips::Model> = trips::Entity::find()
            .filter(trips::Column::Id.is_in(trip_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let mut members: HashMap<Uuid, Vec<customers::Model>> = HashMap::new();
        for customer in customers::Entity::find()
            .filter(customers::Column::BookingId.is_in(booking_ids))
            .order_by_desc(customers::Column::IsPrimary)
            .order_by_asc(customers::Column::CreatedAt)
            .all(&self.db)
            .await?
        {
            members.entry(customer.booking_id).or_default().push(customer);
        }

        let overviews = rows
            .into_iter()
            .filter_map(|booking| {
                let trip = trips.get(&booking.trip_id)?.clone();
                let customers = members.remove(&booking.id).unwrap_or_default();
                let basis = cost_basis(&booking, &trip, &customers);
                Some(BookingOverview {
                    total_cost: basis.total_cost(),
                    active_member_count: basis.effective_member_count(),
                    booking,
                    trip,
                    customers,
                })
            })
            .collect();

        Ok(overviews)
    }

    /// Lists the bookings of a trip with the collection summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_trip(
        &self,
        scope: Scope,
        trip_id: Uuid,
        include_inactive: bool,
    ) -> Result<TripBookings, DbErr> {
        let bookings = self.list(scope, Some(trip_id), include_inactive).await?;
        let figures: Vec<BookingFigures> = bookings.iter().map(BookingOverview::figures).collect();

        Ok(TripBookings {
            summary: TripBookingSummary::from_bookings(&figures),
            bookings,
        })
    }

    /// Records a balance or custom payment.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::NotFound`, `BookingError::AlreadySettled`,
    /// `BookingError::InvalidAmount` or a database error. Nothing is written
    /// on error.
    pub async fn apply_payment(
        &self,
        scope: Scope,
        id: Uuid,
        input: PaymentInput,
    ) -> Result<PaymentOutcome, BookingRepoError> {
        let txn = self.db.begin().await?;

        let booking = lock_booking(&txn, scope, id).await?;
        let trip = booking_trip(&txn, &booking).await?;
        let cancelled_members = customers::Entity::find()
            .filter(customers::Column::BookingId.eq(id))
            .filter(customers::Column::Status.eq(MemberStatus::Cancelled))
            .count(&txn)
            .await?;

        let basis = CostBasis {
            trip_price: trip.price,
            member_count: booking.member_count,
            cancelled_members: usize::try_from(cancelled_members).unwrap_or(usize::MAX),
            total_package_price: booking.total_package_price,
            concession: booking.concession_amount,
        };
        let plan = plan_payment(
            &basis,
            booking.status.into(),
            booking.amount,
            input.mode,
            input.concession,
        )?;

        let now = Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(id),
            amount: Set(plan.amount),
            method: Set(input.method),
            payment_type: Set(plan.payment_type.into()),
            status: Set(PaymentStatus::Completed),
            transaction_id: Set(input.transaction_id),
            payment_date: Set(input.payment_date.into()),
            screenshot_url: Set(input.screenshot_url),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let previous_status = booking.status;
        let mut active = booking.into_active_model();
        active.amount = Set(plan.new_net_paid);
        active.concession_amount = Set(plan.concession);
        active.status = Set(plan.next_status.into());
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            booking_id = %id,
            amount = %plan.amount,
            payment_type = %plan.payment_type,
            net_paid = %plan.new_net_paid,
            from = ?previous_status,
            to = %plan.next_status,
            "Payment recorded"
        );

        let details = load_details(&self.db, scope, id)
            .await?
            .ok_or(BookingError::NotFound)?;
        Ok(PaymentOutcome { payment, details })
    }

    /// Cancels members and records an optional refund.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::NotFound`, `BookingError::NoMembersSelected`,
    /// `BookingError::InvalidMembers`, `BookingError::InvalidAmount`,
    /// or a database error. Nothing is
    /// written on error.
    pub async fn cancel_members(
        &self,
        scope: Scope,
        id: Uuid,
        input: CancelMembersInput,
    ) -> Result<CancellationOutcome, BookingRepoError> {
        let txn = self.db.begin().await?;

        let booking = lock_booking(&txn, scope, id).await?;
        let members = customers::Entity::find()
            .filter(customers::Column::BookingId.eq(id))
            .all(&txn)
            .await?;

        let refs: Vec<MemberRef> = members
            .iter()
            .map(|c| MemberRef {
                id: c.id,
                status: c.status.into(),
            })
            .collect();
        let plan = plan_cancellation(&refs, &input.member_ids, input.refund_amount, booking.amount)?;

        let now = Utc::now().into();
        for member in members.into_iter().filter(|c| plan.member_ids.contains(&c.id)) {
            let mut active = member.into_active_model();
            active.status = Set(MemberStatus::Cancelled);
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }

        let refund = match plan.refund {
            Some(amount) => Some(
                payments::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    booking_id: Set(id),
                    amount: Set(amount),
                    method: Set(input.method),
                    payment_type: Set(PaymentType::Refund),
                    status: Set(PaymentStatus::Completed),
                    transaction_id: Set(None),
                    payment_date: Set(input.payment_date.unwrap_or_else(Utc::now).into()),
                    screenshot_url: Set(input.screenshot_url),
                    notes: Set(input.reason),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?,
            ),
            None => None,
        };

        let mut active = booking.into_active_model();
        active.amount = Set(plan.new_net_paid);
        active.status = Set(plan.next_status.into());
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            booking_id = %id,
            cancelled = plan.member_ids.len(),
            remaining_active = plan.remaining_active,
            refund = ?plan.refund,
            status = %plan.next_status,
            "Booking members cancelled"
        );

        let details = load_details(&self.db, scope, id)
            .await?
            .ok_or(BookingError::NotFound)?;
        Ok(CancellationOutcome {
            cancelled_member_ids: plan.member_ids,
            refund,
            details,
        })
    }

    /// Updates existing members and adds new ones, raising `member_count`
    /// when the roster outgrows it. Ids not on the booking are ignored.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::NotFound` or a database error.
    pub async fn update_participants(
        &self,
        scope: Scope,
        id: Uuid,
        participants: Vec<MemberInput>,
    ) -> Result<BookingDetails, BookingRepoError> {
        let txn = self.db.begin().await?;

        let booking = lock_booking(&txn, scope, id).await?;
        let mut existing: HashMap<Uuid, customers::Model> = customers::Entity::find()
            .filter(customers::Column::BookingId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let current = existing.len();

        let now = Utc::now().into();
        let mut added = 0_usize;
        for participant in participants {
            match participant.id {
                Some(member_id) => {
                    let Some(member) = existing.remove(&member_id) else {
                        debug!(booking_id = %id, %member_id, "Skipping unknown member");
                        continue;
                    };
                    let mut active = member.into_active_model();
                    active.name = Set(participant.name);
                    active.gender = Set(participant.gender);
                    active.age = Set(participant.age);
                    active.contact_number = Set(participant.contact_number);
                    active.is_primary = Set(participant.is_primary);
                    active.place = Set(participant.place);
                    active.updated_at = Set(now);
                    active.update(&txn).await?;
                }
                None => {
                    new_member(id, participant).insert(&txn).await?;
                    added += 1;
                }
            }
        }

        let total = i32::try_from(current + added).unwrap_or(i32::MAX);
        if total > booking.member_count {
            let mut active = booking.into_active_model();
            active.member_count = Set(total);
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }

        txn.commit().await?;

        info!(booking_id = %id, added, "Participants updated");

        Ok(load_details(&self.db, scope, id)
            .await?
            .ok_or(BookingError::NotFound)?)
    }

    /// Shows or hides a booking in default listings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set_active(
        &self,
        scope: Scope,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<bookings::Model>, DbErr> {
        let Some(booking) = scope
            .apply(bookings::Entity::find_by_id(id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active = booking.into_active_model();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map(Some)
    }

    /// Payments of a booking, newest first. `None` when the booking is not
    /// visible in `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn payments(
        &self,
        scope: Scope,
        booking_id: Uuid,
    ) -> Result<Option<Vec<payments::Model>>, DbErr> {
        let visible = scope
            .apply(bookings::Entity::find_by_id(booking_id))
            .count(&self.db)
            .await?;
        if visible == 0 {
            return Ok(None);
        }

        payments::Entity::find()
            .filter(payments::Column::BookingId.eq(booking_id))
            .order_by_desc(payments::Column::PaymentDate)
            .all(&self.db)
            .await
            .map(Some)
    }
}

fn new_member(booking_id: Uuid, member: MemberInput) -> customers::ActiveModel {
    let now = Utc::now().into();
    customers::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking_id),
        name: Set(member.name),
        gender: Set(member.gender),
        age: Set(member.age),
        contact_number: Set(member.contact_number.filter(|c| !c.trim().is_empty())),
        is_primary: Set(member.is_primary),
        place: Set(member.place.filter(|p| !p.trim().is_empty())),
        status: Set(MemberStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

async fn lock_booking<C: ConnectionTrait>(
    conn: &C,
    scope: Scope,
    id: Uuid,
) -> Result<bookings::Model, BookingRepoError> {
    scope
        .apply(bookings::Entity::find_by_id(id))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| BookingError::NotFound.into())
}

async fn booking_trip<C: ConnectionTrait>(
    conn: &C,
    booking: &bookings::Model,
) -> Result<trips::Model, DbErr> {
    trips::Entity::find_by_id(booking.trip_id)
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("trip {} of booking", booking.trip_id)))
}

async fn load_details<C: ConnectionTrait>(
    conn: &C,
    scope: Scope,
    id: Uuid,
) -> Result<Option<BookingDetails>, DbErr> {
    let Some(booking) = scope.apply(bookings::Entity::find_by_id(id)).one(conn).await? else {
        return Ok(None);
    };
    let trip = booking_trip(conn, &booking).await?;

    let customers = customers::Entity::find()
        .filter(customers::Column::BookingId.eq(id))
        .order_by_desc(customers::Column::IsPrimary)
        .order_by_asc(customers::Column::CreatedAt)
        .all(conn)
        .await?;
    let payments = payments::Entity::find()
        .filter(payments::Column::BookingId.eq(id))
        .order_by_desc(payments::Column::PaymentDate)
        .all(conn)
        .await?;

    let statement = BookingStatement::compute(
        &cost_basis(&booking, &trip, &customers),
        &payment_lines(&payments),
    );

    Ok(Some(BookingDetails {
        booking,
        trip,
        customers,
        payments,
        statement,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::entities::sea_orm_active_enums::{BookingStatus, TripType};

    fn trip(price: Decimal) -> trips::Model {
        let now = Utc::now().into();
        trips::Model {
            id: Uuid::new_v4(),
            partner_id: Uuid::new_v4(),
            title: "Spiti Valley".to_string(),
            description: None,
            price,
            destination: None,
            advance_amount: dec!(500),
            trip_type: TripType::Package,
            start_date: None,
            end_date: None,
            capacity: None,
            group_size: None,
            category: None,
            status: TripStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn booking(trip: &trips::Model, members: i32) -> bookings::Model {
        let now = Utc::now().into();
        bookings::Model {
            id: Uuid::new_v4(),
            trip_id: trip.id,
            partner_id: trip.partner_id,
            member_count: members,
            amount: Decimal::ZERO,
            total_package_price: None,
            concession_amount: Decimal::ZERO,
            preferred_date: None,
            booking_date: now,
            is_active: true,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    fn member(booking_id: Uuid, status: MemberStatus) -> customers::Model {
        let now = Utc::now().into();
        customers::Model {
            id: Uuid::new_v4(),
            booking_id,
            name: "Asha".to_string(),
            gender: Gender::Female,
            age: 28,
            contact_number: Some("9876543210".to_string()),
            is_primary: false,
            place: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cost_basis_counts_cancelled_rows() {
        let trip = trip(dec!(1000));
        let booking = booking(&trip, 3);
        let members = vec![
            member(booking.id, MemberStatus::Active),
            member(booking.id, MemberStatus::Cancelled),
        ];

        let basis = cost_basis(&booking, &trip, &members);

        assert_eq!(basis.cancelled_members, 1);
        assert_eq!(basis.effective_member_count(), 2);
        assert_eq!(basis.total_cost(), dec!(2000));
    }

    #[test]
    fn test_payment_lines_keep_refund_type() {
        let trip = trip(dec!(1000));
        let booking = booking(&trip, 2);
        let now = Utc::now().into();
        let row = |amount, payment_type| payments::Model {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            amount,
            method: None,
            payment_type,
            status: PaymentStatus::Completed,
            transaction_id: None,
            payment_date: now,
            screenshot_url: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let lines = payment_lines(&[
            row(dec!(2000), PaymentType::Custom),
            row(dec!(1000), PaymentType::Refund),
        ]);
        let statement = BookingStatement::compute(&cost_basis(&booking, &trip, &[]), &lines);

        assert_eq!(statement.paid_amount, dec!(2000));
        assert_eq!(statement.refund_amount, dec!(1000));
        assert_eq!(statement.net_paid_amount, dec!(1000));
    }

    #[test]
    fn test_contact_prefers_primary() {
        let trip = trip(dec!(1000));
        let booking = booking(&trip, 2);
        let other = member(booking.id, MemberStatus::Active);
        let mut primary = member(booking.id, MemberStatus::Active);
        primary.is_primary = true;
        primary.contact_number = Some("9000000001".to_string());

        let details = BookingDetails {
            statement: BookingStatement::compute(&cost_basis(&booking, &trip, &[]), &[]),
            booking,
            trip,
            customers: vec![other, primary.clone()],
            payments: Vec::new(),
        };

        assert_eq!(details.contact().map(|c| c.id), Some(primary.id));
    }

    #[test]
    fn test_scope_any_leaves_query_unfiltered() {
        use sea_orm::{DbBackend, QueryTrait};

        let id = Uuid::new_v4();
        let partner = Uuid::new_v4();
        let scoped = Scope::Partner(partner)
            .apply(bookings::Entity::find_by_id(id))
            .build(DbBackend::Postgres)
            .to_string();
        let any = Scope::Any
            .apply(bookings::Entity::find_by_id(id))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(scoped.contains(&partner.to_string()));
        assert!(!any.contains("partner_id"));
    }

    #[test]
    fn test_lock_adds_for_update() {
        use sea_orm::{DbBackend, QueryTrait};

        let sql = Scope::Any
            .apply(bookings::Entity::find_by_id(Uuid::new_v4()))
            .lock_exclusive()
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.ends_with("FOR UPDATE"));
    }
}
