use chrono::{Datelike, Days, Months, NaiveDate};
use tracing::warn;

use super::rates::{
    effective_periodic_rate, periodic_principal_and_interest, standard_monthly_payment,
};
use super::types::{LoanInputs, PaymentFrequency, PeriodRecord, ScheduleResult, ScheduleSummary};

/// Balance at or below which the loan counts as repaid.
pub const PAYOFF_EPSILON: f64 = 0.009;
/// Ending balances below this snap to zero.
const BALANCE_SNAP: f64 = 0.01;
/// PMI stops once the balance falls to this share of the original price.
pub const PMI_LTV_THRESHOLD: f64 = 0.80;
/// Years of slack past the amortization length before the builder gives up.
const CAP_EXTRA_YEARS: u32 = 5;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScheduleMode {
    /// Standard monthly payments, no extra payment.
    Baseline,
    /// The caller's frequency and extra payment.
    Actual,
}

/// The per-run knobs that differ between the baseline and actual schedules.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScheduleConfig {
    pub frequency: PaymentFrequency,
    pub extra_payment: f64,
}

impl ScheduleConfig {
    pub fn baseline() -> Self {
        Self {
            frequency: PaymentFrequency::Monthly,
            extra_payment: 0.0,
        }
    }

    pub fn actual(inputs: &LoanInputs) -> Self {
        Self {
            frequency: inputs.payment_frequency,
            extra_payment: inputs.extra_payment_amount,
        }
    }

    pub fn for_mode(inputs: &LoanInputs, mode: ScheduleMode) -> Self {
        match mode {
            ScheduleMode::Baseline => Self::baseline(),
            ScheduleMode::Actual => Self::actual(inputs),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct EscrowRates {
    tax: f64,
    insurance: f64,
    hoa: f64,
    pmi: f64,
}

impl EscrowRates {
    fn new(inputs: &LoanInputs, periods_per_year: u32) -> Self {
        if !inputs.use_escrow {
            return Self {
                tax: 0.0,
                insurance: 0.0,
                hoa: 0.0,
                pmi: 0.0,
            };
        }
        let periods = periods_per_year as f64;
        Self {
            tax: inputs.home_price * (inputs.tax_rate_percent_of_price / 100.0) / periods,
            insurance: inputs.ins_annual_amount / periods,
            hoa: inputs.hoa_monthly_amount * 12.0 / periods,
            pmi: inputs.principal() * (inputs.pmi_rate_percent / 100.0) / periods,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RunningTotals {
    interest: f64,
    principal: f64,
    extra: f64,
    escrow: f64,
}

impl RunningTotals {
    fn accumulate(self, interest: f64, principal: f64, extra: f64, escrow: f64) -> Self {
        Self {
            interest: self.interest + interest,
            principal: self.principal + principal,
            extra: self.extra + extra,
            escrow: self.escrow + escrow,
        }
    }
}

pub fn build_schedule(inputs: &LoanInputs, mode: ScheduleMode) -> ScheduleResult {
    build_schedule_with(inputs, ScheduleConfig::for_mode(inputs, mode))
}

/// Hard upper bound on schedule length for a frequency. Pathological inputs
/// (a payment below the interest due) would otherwise never converge.
pub fn max_periods(amortization_years: f64, periods_per_year: u32) -> u32 {
    let nominal = (amortization_years * periods_per_year as f64).ceil().max(0.0) as u32;
    nominal.saturating_add(periods_per_year * CAP_EXTRA_YEARS)
}

pub fn build_schedule_with(inputs: &LoanInputs, config: ScheduleConfig) -> ScheduleResult {
    let principal = inputs.principal();
    let periods_per_year = config.frequency.periods_per_year();
    let monthly_payment = standard_monthly_payment(
        principal,
        inputs.annual_rate_percent,
        inputs.compounding_mode,
        inputs.amortization_years,
    );
    let periodic_pi = periodic_principal_and_interest(monthly_payment, config.frequency);
    let periodic_rate = effective_periodic_rate(
        inputs.annual_rate_percent,
        inputs.compounding_mode,
        periods_per_year,
    );
    let escrow = EscrowRates::new(inputs, periods_per_year);
    let pmi_drop_balance = inputs.home_price * PMI_LTV_THRESHOLD;
    let cap = max_periods(inputs.amortization_years, periods_per_year);

    let mut balance = principal;
    let mut pmi_active = escrow.pmi > 0.0;
    let mut totals = RunningTotals::default();
    let mut records = Vec::new();

    for period in 1..=cap {
        if balance <= PAYOFF_EPSILON {
            break;
        }

        if pmi_active && balance <= pmi_drop_balance {
            pmi_active = false;
        }
        let pmi = if pmi_active { escrow.pmi } else { 0.0 };
        let escrow_total = escrow.tax + escrow.insurance + escrow.hoa + pmi;

        let interest = balance * periodic_rate;
        let mut principal_part = periodic_pi - interest;
        let mut extra = config.extra_payment;

        if principal_part + extra > balance {
            principal_part = balance - extra;
            if principal_part < 0.0 {
                extra = balance;
                principal_part = 0.0;
            }
        }

        balance -= principal_part + extra;
        if balance < BALANCE_SNAP {
            balance = 0.0;
        }

        totals = totals.accumulate(interest, principal_part, extra, escrow_total);

        let date = inputs
            .start_date
            .and_then(|start| period_date(start, config.frequency, period - 1));
        let (date_label, year_fraction) = match date {
            Some(date) => (date_label(date), date_year_fraction(date)),
            None => (
                format!("P{period}"),
                period as f64 / periods_per_year as f64,
            ),
        };

        records.push(PeriodRecord {
            period_index: period,
            year_fraction,
            date_label,
            date,
            loan_to_value_percent: balance / inputs.home_price * 100.0,
            principal_portion: principal_part,
            interest_portion: interest,
            tax_portion: escrow.tax,
            insurance_portion: escrow.insurance,
            hoa_portion: escrow.hoa,
            pmi_portion: pmi,
            escrow_portion: escrow_total,
            extra_portion: extra,
            total_payment: principal_part + interest + escrow_total + extra,
            ending_balance: balance,
            cumulative_interest: totals.interest,
            cumulative_principal: totals.principal,
            cumulative_extra: totals.extra,
            cumulative_escrow: totals.escrow,
        });
    }

    let paid_off = balance <= PAYOFF_EPSILON;
    if !paid_off {
        warn!(
            periods = records.len(),
            balance, "schedule reached its period cap without paying off"
        );
    }

    ScheduleResult {
        summary: ScheduleSummary {
            periods_to_payoff: records.len() as u32,
            periods_per_year,
            total_interest: totals.interest,
            total_principal: totals.principal,
            total_extra: totals.extra,
            total_escrow: totals.escrow,
            paid_off,
        },
        records,
    }
}

/// Calendar date of the period `offset` periods after `start`. Semi-monthly
/// and bi-weekly schedules step a fixed 15 or 14 days rather than following
/// true calendar alignment.
fn period_date(start: NaiveDate, frequency: PaymentFrequency, offset: u32) -> Option<NaiveDate> {
    match frequency {
        PaymentFrequency::Monthly => add_months_rolling(start, offset),
        PaymentFrequency::SemiMonthly => start.checked_add_days(Days::new(15 * u64::from(offset))),
        PaymentFrequency::BiWeekly | PaymentFrequency::AcceleratedBiWeekly => {
            start.checked_add_days(Days::new(14 * u64::from(offset)))
        }
    }
}

// Keeps the day of month and lets it spill into the following month
// (Jan 31 + 1 month = Mar 3), instead of clamping to the month end.
fn add_months_rolling(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(start.year(), start.month(), 1)?
        .checked_add_months(Months::new(months))?
        .checked_add_days(Days::new(u64::from(start.day() - 1)))
}

fn date_year_fraction(date: NaiveDate) -> f64 {
    date.year() as f64 + date.month0() as f64 / 12.0 + date.day() as f64 / 365.0
}

fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
