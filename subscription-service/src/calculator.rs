//! Subscription fee calculation.
//!
//! A teacher owes the platform a monthly commission per batch:
//!
//! ```text
//! commission_per_student  = max(batch_fees * 7%, 35)
//! effective_student_count = max(max_student_limit or current_student_count, 20)
//! monthly_fee             = commission_per_student * effective_student_count
//! minimum_met             = current_student_count >= 20
//! ```
//!
//! Arithmetic saturates at `Decimal::MAX`, so any input yields a result.
//!
//! The fee is locked to the configured seat limit, so enrollment changes do not
//! move a teacher's monthly commitment. Every surface that shows a fee goes
//! through [`FeePolicy::compute`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Commission rules applied to a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Fraction of the per-student batch fee, e.g. `0.07`.
    pub commission_rate: Decimal,
    /// Flat floor for the per-student commission.
    pub min_per_student: Decimal,
    /// Billing never uses fewer students than this.
    pub min_students: u32,
}

impl FeePolicy {
    /// 7% of the batch fee, at least ₹35 per student, at least 20 students.
    pub fn standard() -> Self {
        Self {
            commission_rate: Decimal::new(7, 2),
            min_per_student: Decimal::new(35, 0),
            min_students: 20,
        }
    }

    /// Compute the subscription for a batch.
    pub fn compute(&self, profile: &BatchFeeProfile) -> SubscriptionCalculation {
        let commission_per_student = profile
            .batch_fees
            .saturating_mul(self.commission_rate)
            .max(self.min_per_student);

        let billing_base_count = profile
            .max_student_limit
            .unwrap_or(profile.current_student_count);
        let effective_student_count = billing_base_count.max(self.min_students);

        let monthly_fee =
            commission_per_student.saturating_mul(Decimal::from(effective_student_count));

        SubscriptionCalculation {
            commission_per_student,
            effective_student_count,
            monthly_fee,
            minimum_met: profile.current_student_count >= self.min_students,
            batch_fees: profile.batch_fees,
            commission_rate: (self.commission_rate * Decimal::ONE_HUNDRED).normalize(),
            min_students: self.min_students,
            min_per_student: self.min_per_student,
        }
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Fee structure and enrollment of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFeeProfile {
    /// Monthly fee charged per student.
    pub batch_fees: Decimal,
    /// Configured seat limit. `None` means no limit is configured, which is
    /// not the same as `Some(0)`.
    pub max_student_limit: Option<u32>,
    /// Currently enrolled (approved) students.
    pub current_student_count: u32,
}

impl BatchFeeProfile {
    /// Build a profile from raw values. Negative inputs are clamped to zero.
    pub fn new(
        batch_fees: Decimal,
        max_student_limit: Option<i64>,
        current_student_count: i64,
    ) -> Self {
        Self {
            batch_fees: batch_fees.max(Decimal::ZERO),
            max_student_limit: max_student_limit.map(clamp_count),
            current_student_count: clamp_count(current_student_count),
        }
    }
}

fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Derived subscription figures. Recomputed on demand, never stored as truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCalculation {
    pub commission_per_student: Decimal,
    pub effective_student_count: u32,
    pub monthly_fee: Decimal,
    /// Whether actual enrollment reaches the minimum. Display only.
    pub minimum_met: bool,
    pub batch_fees: Decimal,
    /// Commission rate in percent.
    pub commission_rate: Decimal,
    pub min_students: u32,
    pub min_per_student: Decimal,
}

/// Compute a subscription with the standard policy.
pub fn compute_subscription(
    batch_fees: Decimal,
    max_student_limit: Option<i64>,
    current_student_count: i64,
) -> SubscriptionCalculation {
    FeePolicy::standard().compute(&BatchFeeProfile::new(
        batch_fees,
        max_student_limit,
        current_student_count,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn high_fee_batch_below_minimum_enrollment() {
        let calc = compute_subscription(dec(1000), None, 5);
        assert_eq!(calc.commission_per_student, dec(70));
        assert_eq!(calc.effective_student_count, 20);
        assert_eq!(calc.monthly_fee, dec(1400));
        assert!(!calc.minimum_met);
    }

    #[test]
    fn low_fee_batch_above_minimum_enrollment() {
        let calc = compute_subscription(dec(100), None, 25);
        assert_eq!(calc.commission_per_student, dec(35));
        assert_eq!(calc.effective_student_count, 25);
        assert_eq!(calc.monthly_fee, dec(875));
        assert!(calc.minimum_met);
    }

    #[test]
    fn seat_limit_drives_billing() {
        let calc = compute_subscription(dec(500), Some(50), 10);
        assert_eq!(calc.commission_per_student, dec(35));
        assert_eq!(calc.effective_student_count, 50);
        assert_eq!(calc.monthly_fee, dec(1750));
        assert!(!calc.minimum_met);
    }

    #[test]
    fn empty_batch_pays_the_floor() {
        let calc = compute_subscription(Decimal::ZERO, None, 0);
        assert_eq!(calc.commission_per_student, dec(35));
        assert_eq!(calc.effective_student_count, 20);
        assert_eq!(calc.monthly_fee, dec(700));
        assert!(!calc.minimum_met);
    }

    #[test]
    fn commission_keeps_paise() {
        let calc = compute_subscription(dec(1010), None, 0);
        assert_eq!(calc.commission_per_student, Decimal::new(7070, 2));
        assert_eq!(calc.monthly_fee, Decimal::new(1414, 0));
    }

    #[test]
    fn negative_inputs_are_treated_as_zero() {
        let calc = compute_subscription(dec(-500), Some(-3), -7);
        assert_eq!(calc.batch_fees, Decimal::ZERO);
        assert_eq!(calc.commission_per_student, dec(35));
        assert_eq!(calc.effective_student_count, 20);
        assert!(!calc.minimum_met);
    }

    #[test]
    fn explicit_zero_limit_is_not_an_absent_limit() {
        let zero_limit = BatchFeeProfile::new(dec(100), Some(0), 30);
        let no_limit = BatchFeeProfile::new(dec(100), None, 30);
        assert_eq!(zero_limit.max_student_limit, Some(0));

        let policy = FeePolicy::standard();
        assert_eq!(policy.compute(&zero_limit).effective_student_count, 20);
        assert_eq!(policy.compute(&no_limit).effective_student_count, 30);
    }

    #[test]
    fn limit_below_enrollment_still_wins_over_enrollment() {
        let calc = compute_subscription(dec(100), Some(22), 40);
        assert_eq!(calc.effective_student_count, 22);
        assert!(calc.minimum_met);
    }

    #[test]
    fn commission_never_drops_below_floor() {
        for fees in [0, 1, 100, 499, 500, 501, 10_000] {
            let calc = compute_subscription(dec(fees), None, 0);
            assert!(calc.commission_per_student >= dec(35), "fees={fees}");
        }
    }

    #[test]
    fn limit_above_floor_is_the_billed_count() {
        for limit in [21_i64, 35, 120] {
            for current in [0_i64, 5, 20, 500] {
                let calc = compute_subscription(dec(300), Some(limit), current);
                assert_eq!(i64::from(calc.effective_student_count), limit);
            }
        }
    }

    #[test]
    fn enrollment_floor_applies_without_limit() {
        for current in 0..20 {
            let calc = compute_subscription(dec(300), None, current);
            assert_eq!(calc.effective_student_count, 20);
        }
    }

    #[test]
    fn monthly_fee_is_monotonic() {
        let fees = [0, 100, 499, 500, 501, 750, 2_000];
        let counts = [0_i64, 10, 20, 21, 40, 90];

        for pair in fees.windows(2) {
            for count in counts {
                let lower = compute_subscription(dec(pair[0]), None, count);
                let upper = compute_subscription(dec(pair[1]), None, count);
                assert!(lower.monthly_fee <= upper.monthly_fee);
            }
        }

        for pair in counts.windows(2) {
            for fee in fees {
                let lower = compute_subscription(dec(fee), None, pair[0]);
                let upper = compute_subscription(dec(fee), None, pair[1]);
                assert!(lower.monthly_fee <= upper.monthly_fee);
            }
        }
    }

    #[test]
    fn minimum_met_ignores_the_limit() {
        for limit in [None, Some(0_i64), Some(10), Some(200)] {
            assert!(!compute_subscription(dec(100), limit, 19).minimum_met);
            assert!(compute_subscription(dec(100), limit, 20).minimum_met);
        }
    }

    #[test]
    fn echoes_the_policy() {
        let calc = compute_subscription(dec(100), None, 0);
        assert_eq!(calc.commission_rate, dec(7));
        assert_eq!(calc.min_students, 20);
        assert_eq!(calc.min_per_student, dec(35));
    }

    #[test]
    fn huge_inputs_saturate_instead_of_overflowing() {
        let calc = compute_subscription(Decimal::MAX, Some(1_000_000), 0);
        assert_eq!(calc.effective_student_count, 1_000_000);
        assert_eq!(calc.monthly_fee, Decimal::MAX);
        assert!(calc.commission_per_student > dec(35));
    }
}
