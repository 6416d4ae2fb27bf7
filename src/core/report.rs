use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::projection::opportunity_cost;
use super::rates::{periodic_principal_and_interest, standard_monthly_payment};
use super::schedule::{ScheduleMode, build_schedule};
use super::types::{LoanInputs, OpportunityCost, ScheduleResult};

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub principal: f64,
    pub interest: f64,
    pub tax: f64,
    pub insurance: f64,
    pub hoa: f64,
    pub pmi: f64,
    pub extra: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidOffIn {
    pub years: u32,
    pub periods: u32,
    pub unit: &'static str,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualTotals {
    pub year: i64,
    pub principal: f64,
    pub interest: f64,
    pub extra: f64,
    pub escrow: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanReport {
    pub mortgage_amount: f64,
    pub periodic_principal_and_interest: f64,
    pub first_period: PaymentBreakdown,
    pub paid_off_in: PaidOffIn,
    pub balance_at_term: f64,
    pub has_strategy: bool,
    pub baseline_total_cost: f64,
    pub actual_total_cost: f64,
    pub cost_savings: f64,
    pub baseline_years_to_payoff: f64,
    pub actual_years_to_payoff: f64,
    pub annual_breakdown: Vec<AnnualTotals>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanAnalysis {
    pub report: LoanReport,
    pub baseline: ScheduleResult,
    pub actual: ScheduleResult,
    pub opportunity_cost: Option<OpportunityCost>,
}

/// Builds both schedules, the optional projection, and the summary figures.
pub fn analyze(inputs: &LoanInputs) -> LoanAnalysis {
    let baseline = build_schedule(inputs, ScheduleMode::Baseline);
    let actual = build_schedule(inputs, ScheduleMode::Actual);
    let opportunity_cost = opportunity_cost(inputs, &baseline, &actual);
    let report = build_report(inputs, &baseline, &actual);

    debug!(
        baseline_periods = baseline.summary.periods_to_payoff,
        actual_periods = actual.summary.periods_to_payoff,
        projection = opportunity_cost.is_some(),
        "loan analysis complete"
    );

    LoanAnalysis {
        report,
        baseline,
        actual,
        opportunity_cost,
    }
}

pub fn build_report(
    inputs: &LoanInputs,
    baseline: &ScheduleResult,
    actual: &ScheduleResult,
) -> LoanReport {
    let monthly_payment = standard_monthly_payment(
        inputs.principal(),
        inputs.annual_rate_percent,
        inputs.compounding_mode,
        inputs.amortization_years,
    );
    let baseline_total_cost = total_cost(baseline);
    let actual_total_cost = total_cost(actual);
    let actual_periods = actual.summary.periods_per_year.max(1);

    LoanReport {
        mortgage_amount: inputs.principal(),
        periodic_principal_and_interest: periodic_principal_and_interest(
            monthly_payment,
            inputs.payment_frequency,
        ),
        first_period: first_period_breakdown(actual),
        paid_off_in: paid_off_in(actual, inputs),
        balance_at_term: balance_at_term(actual, inputs.term_years),
        has_strategy: inputs.has_strategy(),
        baseline_total_cost,
        actual_total_cost,
        cost_savings: baseline_total_cost - actual_total_cost,
        baseline_years_to_payoff: baseline.summary.periods_to_payoff as f64 / 12.0,
        actual_years_to_payoff: actual.summary.periods_to_payoff as f64 / actual_periods as f64,
        annual_breakdown: annual_breakdown(actual),
    }
}

fn total_cost(schedule: &ScheduleResult) -> f64 {
    schedule.summary.total_interest + schedule.summary.total_escrow
}

fn first_period_breakdown(schedule: &ScheduleResult) -> PaymentBreakdown {
    let Some(first) = schedule.first() else {
        return PaymentBreakdown::default();
    };
    PaymentBreakdown {
        principal: first.principal_portion,
        interest: first.interest_portion,
        tax: first.tax_portion,
        insurance: first.insurance_portion,
        hoa: first.hoa_portion,
        pmi: first.pmi_portion,
        extra: first.extra_portion,
        total: first.total_payment,
    }
}

pub fn paid_off_in(schedule: &ScheduleResult, inputs: &LoanInputs) -> PaidOffIn {
    let per_year = schedule.summary.periods_per_year.max(1);
    let periods = schedule.summary.periods_to_payoff;
    PaidOffIn {
        years: periods / per_year,
        periods: periods % per_year,
        unit: if inputs.payment_frequency.is_bi_weekly() {
            "periods"
        } else {
            "months"
        },
    }
}

/// Balance still owed when the term ends, or 0 if the loan is already repaid.
pub fn balance_at_term(schedule: &ScheduleResult, term_years: f64) -> f64 {
    let per_year = schedule.summary.periods_per_year as f64;
    let term_periods = (term_years * per_year).ceil().max(0.0) as usize;
    if term_periods < schedule.records.len() {
        schedule.records[term_periods.saturating_sub(1)].ending_balance
    } else {
        0.0
    }
}

pub fn annual_breakdown(schedule: &ScheduleResult) -> Vec<AnnualTotals> {
    let mut years: BTreeMap<i64, AnnualTotals> = BTreeMap::new();
    for record in &schedule.records {
        let year = record.year_fraction.floor() as i64;
        let totals = years.entry(year).or_insert(AnnualTotals {
            year,
            ..AnnualTotals::default()
        });
        totals.principal += record.principal_portion;
        totals.interest += record.interest_portion;
        totals.extra += record.extra_portion;
        totals.escrow += record.escrow_portion;
    }
    years.into_values().collect()
}
