//! Repository abstractions for data access.

pub mod admin;
pub mod booking;
pub mod customer;
pub mod dashboard;
pub mod enquiry;
pub mod expense;
pub mod partner;
pub mod subscription;
pub mod system_setting;
pub mod trip;

pub use admin::{AdminRepository, OwnedTrip, PartnerDetails, PartnerSummary, PartnerTrip, PlatformStats};
pub use booking::{
    BookingDetails, BookingOverview, BookingRepository, CancelMembersInput, CancellationOutcome,
    CreateBookingInput, MemberInput, PaymentInput, PaymentOutcome, Scope, TripBookings,
};
pub use customer::CustomerRepository;
pub use dashboard::{DashboardRepository, DashboardStats};
pub use enquiry::{EnquiryFields, EnquiryRepository};
pub use expense::{ExpenseFields, ExpensePatch, ExpenseRepository};
pub use partner::{NewPartner, PartnerRepository};
pub use subscription::{CompletedCheckout, NewOrder, SubscriptionRepository};
pub use system_setting::{MAINTENANCE_MODE_KEY, SystemSettingRepository};
pub use trip::{TripFields, TripPatch, TripRepository, TripWithStats};
