//! Custom `validator` rules for money and date fields.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::ValidationError;

/// Rejects negative amounts.
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative").with_message("must not be negative".into()));
    }
    Ok(())
}

/// Rejects zero and negative amounts.
pub fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("positive").with_message("must be greater than zero".into()));
    }
    Ok(())
}

/// Largest amount the `NUMERIC(12,2)` money columns hold.
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Rejects negative amounts, amounts above [`MAX_MONEY`] and fractions of a
/// paisa.
pub fn money(value: &Decimal) -> Result<(), ValidationError> {
    non_negative(value)?;
    if *value > MAX_MONEY {
        return Err(ValidationError::new("money").with_message("is too large".into()));
    }
    if value.normalize().scale() > 2 {
        return Err(ValidationError::new("money")
            .with_message("must have at most two decimal places".into()));
    }
    Ok(())
}

/// [`money`] and greater than zero.
pub fn positive_money(value: &Decimal) -> Result<(), ValidationError> {
    positive(value)?;
    money(value)
}

/// Rejects an end date before the start date.
pub fn date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::new("date_order")
            .with_message("End date must not be before start date".into())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_rules() {
        assert!(non_negative(&dec!(0)).is_ok());
        assert!(non_negative(&dec!(-0.01)).is_err());
        assert!(positive(&dec!(0)).is_err());
        assert!(positive(&dec!(0.01)).is_ok());
    }

    #[test]
    fn test_money_bounds() {
        assert_eq!(MAX_MONEY, dec!(9999999999.99));
        assert!(money(&dec!(0)).is_ok());
        assert!(money(&dec!(9999999999.99)).is_ok());
        assert!(money(&dec!(10000000000.00)).is_err());
        assert!(money(&Decimal::MAX).is_err());
        assert!(money(&dec!(-1)).is_err());
        assert!(money(&dec!(12.50)).is_ok());
        assert!(money(&dec!(12.500)).is_ok());
        assert!(money(&dec!(12.505)).is_err());
        assert!(positive_money(&dec!(0)).is_err());
        assert!(positive_money(&Decimal::MAX).is_err());
        assert!(positive_money(&dec!(0.01)).is_ok());
    }

    #[test]
    fn test_date_order() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 5, day);
        assert!(date_order(d(1), d(1)).is_ok());
        assert!(date_order(d(2), d(1)).is_err());
        assert!(date_order(None, d(1)).is_ok());
    }
}
