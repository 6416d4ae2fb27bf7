use super::types::{CompoundingMode, PaymentFrequency};

/// Rate per payment period for a nominal annual rate.
///
/// Semi-annual compounding converts through the true effective yield,
/// `(1 + r/2)^(2/n) - 1`; monthly (nominal) compounding just pro-rates, `r/n`.
pub fn effective_periodic_rate(
    annual_rate_percent: f64,
    mode: CompoundingMode,
    periods_per_year: u32,
) -> f64 {
    let annual_rate = annual_rate_percent / 100.0;
    let periods = periods_per_year.max(1) as f64;
    match mode {
        CompoundingMode::SemiAnnual => (1.0 + annual_rate / 2.0).powf(2.0 / periods) - 1.0,
        CompoundingMode::Monthly => annual_rate / periods,
    }
}

/// Level annuity payment that retires `principal` over `total_periods`.
/// `total_periods` must be positive; a zero rate amortizes straight-line.
pub fn fixed_payment(principal: f64, periodic_rate: f64, total_periods: f64) -> f64 {
    if periodic_rate == 0.0 {
        return principal / total_periods;
    }
    // Discount form: (1+r)^-n underflows to 0 instead of overflowing to inf.
    principal * periodic_rate / (1.0 - (1.0 + periodic_rate).powf(-total_periods))
}

/// Standard monthly P&I for a loan, independent of the chosen frequency.
pub fn standard_monthly_payment(
    principal: f64,
    annual_rate_percent: f64,
    mode: CompoundingMode,
    amortization_years: f64,
) -> f64 {
    let monthly_rate = effective_periodic_rate(annual_rate_percent, mode, 12);
    let total_months = (amortization_years * 12.0).max(1.0);
    fixed_payment(principal, monthly_rate, total_months)
}

/// Periodic P&I for a frequency, derived from the standard monthly figure.
pub fn periodic_principal_and_interest(monthly_payment: f64, frequency: PaymentFrequency) -> f64 {
    match frequency {
        PaymentFrequency::Monthly => monthly_payment,
        PaymentFrequency::SemiMonthly | PaymentFrequency::AcceleratedBiWeekly => {
            monthly_payment / 2.0
        }
        PaymentFrequency::BiWeekly => monthly_payment * 12.0 / 26.0,
    }
}

/// Per-period growth equivalent to an effective annual investment return.
pub fn investment_periodic_rate(invest_rate_percent: f64, periods_per_year: u32) -> f64 {
    let periods = periods_per_year.max(1) as f64;
    (1.0 + invest_rate_percent / 100.0).powf(1.0 / periods) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64, eps: f64) {
        assert!(
            (actual - expected).abs() <= eps,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn semi_annual_monthly_rate_is_not_a_simple_twelfth() {
        let rate = effective_periodic_rate(6.0, CompoundingMode::SemiAnnual, 12);
        assert_approx(rate, 1.03f64.powf(1.0 / 6.0) - 1.0, 1e-15);
        assert_approx(rate * 100.0, 0.4939, 5e-5);
        assert!(rate < 0.005);
    }

    #[test]
    fn semi_annual_rate_preserves_effective_yield_across_frequencies() {
        for periods in [12, 24, 26] {
            let rate = effective_periodic_rate(6.0, CompoundingMode::SemiAnnual, periods);
            assert_approx((1.0 + rate).powi(periods as i32), 1.0609, 1e-12);
        }
    }

    #[test]
    fn monthly_mode_pro_rates_the_nominal_rate() {
        assert_approx(
            effective_periodic_rate(6.0, CompoundingMode::Monthly, 12),
            0.005,
            1e-15,
        );
        assert_approx(
            effective_periodic_rate(5.2, CompoundingMode::Monthly, 26),
            0.002,
            1e-15,
        );
    }

    #[test]
    fn zero_rate_is_zero_in_both_modes() {
        assert_eq!(effective_periodic_rate(0.0, CompoundingMode::Monthly, 26), 0.0);
        assert_eq!(
            effective_periodic_rate(0.0, CompoundingMode::SemiAnnual, 24),
            0.0
        );
    }

    #[test]
    fn fixed_payment_matches_textbook_thirty_year_loan() {
        let payment = fixed_payment(240_000.0, 0.005, 360.0);
        assert_approx(payment, 1438.92, 0.005);
    }

    #[test]
    fn fixed_payment_at_zero_rate_is_straight_line() {
        assert_approx(fixed_payment(120_000.0, 0.0, 240.0), 500.0, 1e-12);
    }

    #[test]
    fn fixed_payment_stays_finite_for_very_long_amortizations() {
        let payment = standard_monthly_payment(240_000.0, 6.0, CompoundingMode::Monthly, 15_000.0);
        assert!(payment.is_finite());
        // Interest-only in the limit.
        assert_approx(payment, 1_200.0, 1e-6);
    }

    #[test]
    fn fixed_payment_of_zero_principal_is_zero() {
        assert_eq!(fixed_payment(0.0, 0.004, 300.0), 0.0);
        assert_eq!(fixed_payment(0.0, 0.0, 300.0), 0.0);
    }

    #[test]
    fn faster_frequencies_derive_from_the_monthly_payment() {
        let monthly = 1200.0;
        assert_approx(
            periodic_principal_and_interest(monthly, PaymentFrequency::Monthly),
            1200.0,
            1e-12,
        );
        assert_approx(
            periodic_principal_and_interest(monthly, PaymentFrequency::SemiMonthly),
            600.0,
            1e-12,
        );
        assert_approx(
            periodic_principal_and_interest(monthly, PaymentFrequency::AcceleratedBiWeekly),
            600.0,
            1e-12,
        );
        assert_approx(
            periodic_principal_and_interest(monthly, PaymentFrequency::BiWeekly),
            1200.0 * 12.0 / 26.0,
            1e-12,
        );
    }

    #[test]
    fn standard_monthly_payment_ignores_frequency() {
        let payment = standard_monthly_payment(240_000.0, 6.0, CompoundingMode::Monthly, 30.0);
        assert_approx(payment, 1438.92, 0.005);
    }

    #[test]
    fn investment_rate_compounds_back_to_the_annual_return() {
        let rate = investment_periodic_rate(7.0, 26);
        assert_approx((1.0 + rate).powi(26), 1.07, 1e-12);
        assert_eq!(investment_periodic_rate(0.0, 12), 0.0);
    }
}
