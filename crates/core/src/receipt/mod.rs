//! Booking confirmation and payment receipt documents.
//!
//! Documents are first laid out as plain [`Document`] values (titled sections
//! of label/value rows) and then rendered to PDF bytes, so the content can be
//! checked without parsing PDF output.

mod document;
mod render;

pub use document::{
    BookingConfirmation, Document, PaymentReceipt, Section, booking_confirmation,
    format_amount, payment_receipt,
};
pub use render::{ReceiptError, render_pdf};
