use contracts::shared::kpi::{Compliance, ComplianceStatus, MonthProgress};

/// Compute the expected-vs-actual revenue deviation for a site.
///
/// `expected` spreads the monthly goal over the month's effective business
/// days and takes the share belonging to the elapsed part. Degenerate inputs
/// (zero goal, zero total effective weight) are defined edge cases, not
/// errors: expected is 0 and the whole revenue counts as deviation.
///
/// Pure and deterministic; exactly zero difference is a genuine tie, not a
/// rounding artifact to be smoothed.
pub fn compute_compliance(
    revenue_to_date: f64,
    monthly_goal: f64,
    progress: &MonthProgress,
) -> Compliance {
    let effective_total = progress.effective_total();

    let (expected, difference) = if monthly_goal == 0.0 || effective_total == 0.0 {
        (0.0, revenue_to_date)
    } else {
        let daily_goal = monthly_goal / effective_total;
        let expected = daily_goal * progress.effective_past;
        (expected, revenue_to_date - expected)
    };

    let status = if difference > 0.0 {
        ComplianceStatus::Above
    } else if difference < 0.0 {
        ComplianceStatus::Below
    } else {
        ComplianceStatus::OnTrack
    };

    Compliance {
        expected,
        difference,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(effective_past: f64, effective_remaining: f64) -> MonthProgress {
        MonthProgress {
            total_days: 30,
            elapsed_days: 15,
            effective_past,
            effective_remaining,
        }
    }

    #[test]
    fn test_zero_revenue_zero_goal_is_on_track() {
        let c = compute_compliance(0.0, 0.0, &progress(10.0, 10.0));
        assert_eq!(c.expected, 0.0);
        assert_eq!(c.difference, 0.0);
        assert_eq!(c.status, ComplianceStatus::OnTrack);
    }

    #[test]
    fn test_revenue_with_zero_goal_counts_fully_as_deviation() {
        let c = compute_compliance(1000.0, 0.0, &progress(10.0, 10.0));
        assert_eq!(c.expected, 0.0);
        assert_eq!(c.difference, 1000.0);
        assert_eq!(c.status, ComplianceStatus::Above);
    }

    #[test]
    fn test_zero_effective_days_counts_fully_as_deviation() {
        let c = compute_compliance(500.0, 30_000.0, &progress(0.0, 0.0));
        assert_eq!(c.expected, 0.0);
        assert_eq!(c.difference, 500.0);
        assert_eq!(c.status, ComplianceStatus::Above);
    }

    #[test]
    fn test_below_goal_mid_month() {
        let c = compute_compliance(5_000_000.0, 30_000_000.0, &progress(10.0, 10.0));
        // daily goal 1_500_000, expected 15_000_000
        assert_eq!(c.expected, 15_000_000.0);
        assert_eq!(c.difference, -10_000_000.0);
        assert_eq!(c.status, ComplianceStatus::Below);
    }

    #[test]
    fn test_exact_expected_is_on_track() {
        let c = compute_compliance(15_000_000.0, 30_000_000.0, &progress(10.0, 10.0));
        assert_eq!(c.difference, 0.0);
        assert_eq!(c.status, ComplianceStatus::OnTrack);
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let p = progress(7.5, 16.5);
        let a = compute_compliance(123_456.78, 950_000.0, &p);
        let b = compute_compliance(123_456.78, 950_000.0, &p);
        assert_eq!(a, b);
    }
}
