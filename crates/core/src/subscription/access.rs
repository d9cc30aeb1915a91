//! Subscription access predicate.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// Partner plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Free tier.
    Free,
    /// Paid tier.
    Pro,
}

/// What the gate needs to know about a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionState {
    /// Current plan.
    pub plan: Plan,
    /// End of the paid period, if any.
    pub expires_at: Option<DateTime<Utc>>,
}

impl SubscriptionState {
    /// True during the global trial window, or while a pro plan is unexpired.
    #[must_use]
    pub fn is_active(&self, trial_ends_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if now < trial_ends_at {
            return true;
        }
        self.plan == Plan::Pro && self.expires_at.is_some_and(|expiry| now < expiry)
    }
}

/// Expiry after buying one more month.
///
/// The month is added to the latest of the current expiry, the trial end and
/// `now`, so purchases during the trial or before expiry are not wasted.
#[must_use]
pub fn renewed_expiry(
    current: Option<DateTime<Utc>>,
    trial_ends_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let base = current.unwrap_or(now).max(trial_ends_at).max(now);
    base.checked_add_months(Months::new(1)).unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn trial_end() -> DateTime<Utc> {
        at(2026, 3, 1)
    }

    #[test]
    fn test_everyone_is_active_during_trial() {
        let free = SubscriptionState {
            plan: Plan::Free,
            expires_at: None,
        };
        assert!(free.is_active(trial_end(), at(2026, 2, 28)));
        assert!(!free.is_active(trial_end(), at(2026, 3, 1)));
    }

    #[test]
    fn test_pro_requires_future_expiry() {
        let pro = SubscriptionState {
            plan: Plan::Pro,
            expires_at: Some(at(2026, 6, 1)),
        };
        assert!(pro.is_active(trial_end(), at(2026, 5, 31)));
        assert!(!pro.is_active(trial_end(), at(2026, 6, 1)));

        let no_expiry = SubscriptionState {
            plan: Plan::Pro,
            expires_at: None,
        };
        assert!(!no_expiry.is_active(trial_end(), at(2026, 4, 1)));
    }

    #[test]
    fn test_free_with_stale_expiry_is_inactive() {
        let free = SubscriptionState {
            plan: Plan::Free,
            expires_at: Some(at(2027, 1, 1)),
        };
        assert!(!free.is_active(trial_end(), at(2026, 4, 1)));
    }

    #[rstest]
    #[case::during_trial(None, at(2026, 1, 15), at(2026, 4, 1))]
    #[case::extends_unexpired(Some(at(2026, 7, 10)), at(2026, 7, 1), at(2026, 8, 10))]
    #[case::after_lapse(Some(at(2026, 5, 1)), at(2026, 9, 20), at(2026, 10, 20))]
    #[case::trial_end_beats_earlier_expiry(Some(at(2026, 1, 31)), at(2026, 1, 20), at(2026, 4, 1))]
    fn test_renewed_expiry(
        #[case] current: Option<DateTime<Utc>>,
        #[case] now: DateTime<Utc>,
        #[case] expected: DateTime<Utc>,
    ) {
        assert_eq!(renewed_expiry(current, trial_end(), now), expected);
    }
}
