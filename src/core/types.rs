use chrono::NaiveDate;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompoundingMode {
    Monthly,
    SemiAnnual,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentFrequency {
    Monthly,
    SemiMonthly,
    BiWeekly,
    AcceleratedBiWeekly,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::SemiMonthly => 24,
            PaymentFrequency::BiWeekly | PaymentFrequency::AcceleratedBiWeekly => 26,
        }
    }

    pub fn is_bi_weekly(self) -> bool {
        matches!(
            self,
            PaymentFrequency::BiWeekly | PaymentFrequency::AcceleratedBiWeekly
        )
    }
}

/// Snapshot of everything one computation needs. Percent fields are in
/// percent (6.0 means 6%), amounts in currency units.
#[derive(Debug, Clone)]
pub struct LoanInputs {
    pub home_price: f64,
    pub down_payment: f64,
    pub annual_rate_percent: f64,
    pub amortization_years: f64,
    pub term_years: f64,
    pub compounding_mode: CompoundingMode,
    pub payment_frequency: PaymentFrequency,
    pub use_escrow: bool,
    pub tax_rate_percent_of_price: f64,
    pub ins_annual_amount: f64,
    pub hoa_monthly_amount: f64,
    pub pmi_rate_percent: f64,
    pub use_opportunity_cost: bool,
    pub invest_rate_percent: f64,
    pub extra_payment_amount: f64,
    pub start_date: Option<NaiveDate>,
}

impl LoanInputs {
    pub fn principal(&self) -> f64 {
        self.home_price - self.down_payment
    }

    /// True when the actual schedule differs from the standard monthly one.
    pub fn has_strategy(&self) -> bool {
        self.extra_payment_amount > 0.0 || self.payment_frequency != PaymentFrequency::Monthly
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub period_index: u32,
    pub year_fraction: f64,
    pub date_label: String,
    pub date: Option<NaiveDate>,
    pub loan_to_value_percent: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub tax_portion: f64,
    pub insurance_portion: f64,
    pub hoa_portion: f64,
    pub pmi_portion: f64,
    pub escrow_portion: f64,
    pub extra_portion: f64,
    pub total_payment: f64,
    pub ending_balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
    pub cumulative_extra: f64,
    pub cumulative_escrow: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub periods_to_payoff: u32,
    pub periods_per_year: u32,
    pub total_interest: f64,
    pub total_principal: f64,
    pub total_extra: f64,
    pub total_escrow: f64,
    pub paid_off: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub records: Vec<PeriodRecord>,
    pub summary: ScheduleSummary,
}

impl ScheduleResult {
    pub fn first(&self) -> Option<&PeriodRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&PeriodRecord> {
        self.records.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub year_fraction: f64,
    pub net_worth: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPath {
    pub points: Vec<ProjectionPoint>,
}

impl ProjectionPath {
    pub fn final_net_worth(&self) -> Option<f64> {
        self.points.last().map(|p| p.net_worth)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityCost {
    pub pay_off_first: ProjectionPath,
    pub invest_extra: ProjectionPath,
}
