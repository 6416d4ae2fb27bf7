use super::rates::investment_periodic_rate;
use super::types::{
    LoanInputs, OpportunityCost, PeriodRecord, ProjectionPath, ProjectionPoint, ScheduleResult,
};

/// Runs the projection only when the feature is on and the actual schedule
/// differs from the baseline.
pub fn opportunity_cost(
    inputs: &LoanInputs,
    baseline: &ScheduleResult,
    actual: &ScheduleResult,
) -> Option<OpportunityCost> {
    if !inputs.use_opportunity_cost || !inputs.has_strategy() {
        return None;
    }
    Some(project_opportunity_cost(baseline, actual, inputs))
}

/// Two net-worth curves over the baseline's horizon: accelerate payoff then
/// invest the freed payment, versus stay on the baseline and invest the
/// difference in annual outlay.
pub fn project_opportunity_cost(
    baseline: &ScheduleResult,
    actual: &ScheduleResult,
    inputs: &LoanInputs,
) -> OpportunityCost {
    let (Some(actual_first), Some(baseline_first)) = (actual.first(), baseline.first()) else {
        return OpportunityCost::default();
    };

    let actual_periods = actual.summary.periods_per_year;
    let baseline_periods = baseline.summary.periods_per_year;
    let actual_outlay = scheduled_outlay(actual_first);
    let baseline_pi = baseline_first.principal_portion + baseline_first.interest_portion;

    let annual_budget = actual_outlay * actual_periods as f64;
    let annual_baseline = baseline_pi * baseline_periods as f64;
    let invest_per_period = (annual_budget - annual_baseline).max(0.0) / baseline_periods as f64;

    let horizon = baseline
        .last()
        .map(|r| r.year_fraction)
        .unwrap_or_default();

    OpportunityCost {
        pay_off_first: pay_off_first_path(
            &actual.records,
            inputs,
            actual_outlay,
            actual_periods,
            horizon,
        ),
        invest_extra: invest_extra_path(
            &baseline.records,
            inputs,
            invest_per_period,
            baseline_periods,
        ),
    }
}

fn scheduled_outlay(record: &PeriodRecord) -> f64 {
    record.principal_portion + record.interest_portion + record.extra_portion
}

fn pay_off_first_path(
    records: &[PeriodRecord],
    inputs: &LoanInputs,
    outlay: f64,
    periods_per_year: u32,
    horizon: f64,
) -> ProjectionPath {
    let home_price = inputs.home_price;
    let growth = 1.0 + investment_periodic_rate(inputs.invest_rate_percent, periods_per_year);
    let step = 1.0 / periods_per_year as f64;

    let mut points: Vec<ProjectionPoint> = records
        .iter()
        .map(|r| ProjectionPoint {
            year_fraction: r.year_fraction,
            net_worth: home_price - r.ending_balance,
        })
        .collect();

    let mut year = points.last().map(|p| p.year_fraction).unwrap_or_default();
    let mut invested = 0.0;
    while year < horizon {
        year += step;
        invested = (invested + outlay) * growth;
        points.push(ProjectionPoint {
            year_fraction: year,
            net_worth: home_price + invested,
        });
    }

    ProjectionPath { points }
}

fn invest_extra_path(
    records: &[PeriodRecord],
    inputs: &LoanInputs,
    invest_per_period: f64,
    periods_per_year: u32,
) -> ProjectionPath {
    let home_price = inputs.home_price;
    let growth = 1.0 + investment_periodic_rate(inputs.invest_rate_percent, periods_per_year);

    let points = records
        .iter()
        .scan(0.0, |invested, r| {
            *invested = (*invested + invest_per_period) * growth;
            Some(ProjectionPoint {
                year_fraction: r.year_fraction,
                net_worth: home_price - r.ending_balance + *invested,
            })
        })
        .collect();

    ProjectionPath { points }
}
