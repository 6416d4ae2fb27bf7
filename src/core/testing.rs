use super::types::{CompoundingMode, LoanInputs, PaymentFrequency};

/// 300k home, 60k down, 6% nominal, 30 years, monthly, no escrow or extras.
pub(crate) fn sample_inputs() -> LoanInputs {
    LoanInputs {
        home_price: 300_000.0,
        down_payment: 60_000.0,
        annual_rate_percent: 6.0,
        amortization_years: 30.0,
        term_years: 5.0,
        compounding_mode: CompoundingMode::Monthly,
        payment_frequency: PaymentFrequency::Monthly,
        use_escrow: false,
        tax_rate_percent_of_price: 0.0,
        ins_annual_amount: 0.0,
        hoa_monthly_amount: 0.0,
        pmi_rate_percent: 0.0,
        use_opportunity_cost: false,
        invest_rate_percent: 7.0,
        extra_payment_amount: 0.0,
        start_date: None,
    }
}
