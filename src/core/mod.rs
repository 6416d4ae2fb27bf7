mod projection;
mod rates;
mod report;
mod schedule;
mod types;

#[cfg(test)]
mod testing;

pub use projection::{opportunity_cost, project_opportunity_cost};
pub use rates::{
    effective_periodic_rate, fixed_payment, investment_periodic_rate,
    periodic_principal_and_interest, standard_monthly_payment,
};
pub use report::{
    AnnualTotals, LoanAnalysis, LoanReport, PaidOffIn, PaymentBreakdown, analyze,
    annual_breakdown, balance_at_term, build_report, paid_off_in,
};
pub use schedule::{
    PAYOFF_EPSILON, PMI_LTV_THRESHOLD, ScheduleConfig, ScheduleMode, build_schedule,
    build_schedule_with, max_periods,
};
pub use types::{
    CompoundingMode, LoanInputs, OpportunityCost, PaymentFrequency, PeriodRecord,
    ProjectionPath, ProjectionPoint, ScheduleResult, ScheduleSummary,
};
