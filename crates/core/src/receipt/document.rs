//! Document layout for confirmations and receipts.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::booking::{BookingStatus, PaymentType};

/// A titled list of sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Document title.
    pub title: String,
    /// Issuing partner, printed under the title.
    pub issuer: String,
    /// Body sections.
    pub sections: Vec<Section>,
    /// Closing line.
    pub footer: String,
}

/// A heading followed by label/value rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section heading.
    pub heading: String,
    /// Rows.
    pub rows: Vec<(String, String)>,
}

impl Section {
    fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            rows: Vec::new(),
        }
    }

    fn row(mut self, label: &str, value: impl Into<String>) -> Self {
        self.rows.push((label.to_string(), value.into()));
        self
    }

    fn row_opt(self, label: &str, value: Option<String>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => self.row(label, v),
            _ => self,
        }
    }
}

/// Data printed on a booking confirmation.
#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    /// Partner business name.
    pub partner_name: String,
    /// Partner phone.
    pub partner_phone: Option<String>,
    /// Booking id.
    pub booking_id: Uuid,
    /// Booking date.
    pub booking_date: DateTime<Utc>,
    /// Booking status.
    pub status: BookingStatus,
    /// Trip title.
    pub trip_title: String,
    /// Trip destination.
    pub destination: Option<String>,
    /// Trip start date.
    pub start_date: Option<NaiveDate>,
    /// Trip end date.
    pub end_date: Option<NaiveDate>,
    /// Names of active members, primary first.
    pub members: Vec<String>,
    /// Primary contact number.
    pub contact_number: Option<String>,
    /// Cost of the active members.
    pub total_cost: Decimal,
    /// Net amount held.
    pub net_paid: Decimal,
}

/// Data printed on a payment receipt.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    /// Partner business name.
    pub partner_name: String,
    /// Payment id.
    pub payment_id: Uuid,
    /// Payment date.
    pub payment_date: DateTime<Utc>,
    /// Amount received.
    pub amount: Decimal,
    /// Payment type.
    pub payment_type: PaymentType,
    /// Payment method.
    pub method: Option<String>,
    /// Booking id.
    pub booking_id: Uuid,
    /// Trip title.
    pub trip_title: String,
    /// Primary member name.
    pub customer_name: String,
    /// Cost of the active members.
    pub total_cost: Decimal,
    /// Net amount held after this payment.
    pub net_paid: Decimal,
}

/// Formats an amount in rupees with two decimals.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("INR {:.2}", amount.round_dp(2))
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

/// Lays out a booking confirmation.
#[must_use]
pub fn booking_confirmation(data: &BookingConfirmation) -> Document {
    let dates = match (data.start_date, data.end_date) {
        (Some(start), Some(end)) => Some(format!(
            "{} to {}",
            start.format("%d %b %Y"),
            end.format("%d %b %Y")
        )),
        (Some(start), None) => Some(start.format("%d %b %Y").to_string()),
        _ => None,
    };

    let booking = Section::new("Booking")
        .row("Booking No.", short_id(data.booking_id))
        .row("Booked On", data.booking_date.format("%d %b %Y").to_string())
        .row("Status", data.status.as_str().replace('_', " "));

    let trip = Section::new("Trip")
        .row("Trip", data.trip_title.clone())
        .row_opt("Destination", data.destination.clone())
        .row_opt("Dates", dates);

    let travellers = data.members.iter().enumerate().fold(
        Section::new("Travellers").row_opt("Contact", data.contact_number.clone()),
        |section, (i, name)| section.row(&format!("{}.", i + 1), name.clone()),
    );

    let payment = Section::new("Payment")
        .row("Total Cost", format_amount(data.total_cost))
        .row("Paid", format_amount(data.net_paid))
        .row(
            "Balance Due",
            format_amount((data.total_cost - data.net_paid).max(Decimal::ZERO)),
        );

    Document {
        title: "Booking Confirmation".to_string(),
        issuer: issuer_line(&data.partner_name, data.partner_phone.as_deref()),
        sections: vec![booking, trip, travellers, payment],
        footer: "Thank you for booking with us.".to_string(),
    }
}

/// Lays out a payment receipt.
#[must_use]
pub fn payment_receipt(data: &PaymentReceipt) -> Document {
    let receipt = Section::new("Receipt")
        .row("Receipt No.", short_id(data.payment_id))
        .row("Date", data.payment_date.format("%d %b %Y").to_string())
        .row("Received From", data.customer_name.clone())
        .row("Amount", format_amount(data.amount))
        .row("Type", data.payment_type.as_str().to_string())
        .row_opt("Method", data.method.clone());

    let booking = Section::new("Booking")
        .row("Booking No.", short_id(data.booking_id))
        .row("Trip", data.trip_title.clone())
        .row("Total Cost", format_amount(data.total_cost))
        .row("Paid To Date", format_amount(data.net_paid))
        .row(
            "Balance Due",
            format_amount((data.total_cost - data.net_paid).max(Decimal::ZERO)),
        );

    Document {
        title: "Payment Receipt".to_string(),
        issuer: data.partner_name.clone(),
        sections: vec![receipt, booking],
        footer: "This is a computer generated receipt.".to_string(),
    }
}

fn issuer_line(name: &str, phone: Option<&str>) -> String {
    match phone.filter(|p| !p.trim().is_empty()) {
        Some(phone) => format!("{name} | {phone}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn value<'a>(doc: &'a Document, heading: &str, label: &str) -> Option<&'a str> {
        doc.sections
            .iter()
            .find(|s| s.heading == heading)?
            .rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    fn confirmation() -> BookingConfirmation {
        BookingConfirmation {
            partner_name: "Himalayan Trails".to_string(),
            partner_phone: Some("9876543210".to_string()),
            booking_id: Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap(),
            booking_date: Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap(),
            status: BookingStatus::Pending,
            trip_title: "Hampta Pass".to_string(),
            destination: Some("Manali".to_string()),
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 5),
            members: vec!["Asha".to_string(), "Ravi".to_string()],
            contact_number: Some("9123456780".to_string()),
            total_cost: dec!(12000),
            net_paid: dec!(4000),
        }
    }

    #[test]
    fn test_amount_format() {
        assert_eq!(format_amount(dec!(1000)), "INR 1000.00");
        assert_eq!(format_amount(dec!(99.999)), "INR 100.00");
    }

    #[test]
    fn test_confirmation_layout() {
        let doc = booking_confirmation(&confirmation());

        assert_eq!(doc.title, "Booking Confirmation");
        assert_eq!(doc.issuer, "Himalayan Trails | 9876543210");
        assert_eq!(value(&doc, "Booking", "Booking No."), Some("6BA7B810"));
        assert_eq!(
            value(&doc, "Trip", "Dates"),
            Some("01 Jun 2026 to 05 Jun 2026")
        );
        assert_eq!(value(&doc, "Travellers", "2."), Some("Ravi"));
        assert_eq!(value(&doc, "Payment", "Balance Due"), Some("INR 8000.00"));
    }

    #[test]
    fn test_confirmation_skips_blank_fields() {
        let mut data = confirmation();
        data.destination = None;
        data.partner_phone = Some(" ".to_string());
        data.net_paid = dec!(15000);

        let doc = booking_confirmation(&data);

        assert_eq!(doc.issuer, "Himalayan Trails");
        assert_eq!(value(&doc, "Trip", "Destination"), None);
        assert_eq!(value(&doc, "Payment", "Balance Due"), Some("INR 0.00"));
    }

    #[test]
    fn test_payment_receipt_layout() {
        let doc = payment_receipt(&PaymentReceipt {
            partner_name: "Himalayan Trails".to_string(),
            payment_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            payment_date: Utc.with_ymd_and_hms(2026, 5, 9, 8, 30, 0).unwrap(),
            amount: dec!(2500.5),
            payment_type: PaymentType::Custom,
            method: Some("upi".to_string()),
            booking_id: Uuid::new_v4(),
            trip_title: "Hampta Pass".to_string(),
            customer_name: "Asha".to_string(),
            total_cost: dec!(12000),
            net_paid: dec!(6500.5),
        });

        assert_eq!(value(&doc, "Receipt", "Receipt No."), Some("550E8400"));
        assert_eq!(value(&doc, "Receipt", "Amount"), Some("INR 2500.50"));
        assert_eq!(value(&doc, "Receipt", "Method"), Some("upi"));
        assert_eq!(value(&doc, "Booking", "Balance Due"), Some("INR 5499.50"));
    }
}
