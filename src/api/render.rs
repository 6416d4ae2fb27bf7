use std::fmt;

use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Columns},
};

use crate::core::{LoanAnalysis, LoanInputs, ScheduleResult};

/// US-style currency, `$1,234.56` / `-$1,234.56`, rounded to cents.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn styled(builder: Builder) -> Table {
    let mut table = Table::from(builder);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()));
    table
}

/// Headline figures as a Field/Value table.
pub struct ReportTable<'a> {
    analysis: &'a LoanAnalysis,
    inputs: &'a LoanInputs,
}

impl<'a> ReportTable<'a> {
    pub fn new(analysis: &'a LoanAnalysis, inputs: &'a LoanInputs) -> Self {
        Self { analysis, inputs }
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        let report = &self.analysis.report;
        let summary = &self.analysis.actual.summary;
        let paid = &report.paid_off_in;

        let mut rows = vec![
            ("Mortgage amount", format_currency(report.mortgage_amount)),
            (
                "Periodic payment (P & I)",
                format_currency(report.periodic_principal_and_interest),
            ),
        ];
        if self.inputs.use_escrow {
            rows.push((
                "True periodic payment (PITI)",
                format_currency(report.first_period.total),
            ));
        }
        rows.push((
            "Paid off in",
            format!("{} yrs, {} {}", paid.years, paid.periods, paid.unit),
        ));
        if !summary.paid_off {
            rows.push(("Status", "not repaid within the schedule cap".to_string()));
        }
        rows.push(("Balance at term", format_currency(report.balance_at_term)));
        rows.push(("Total interest", format_currency(summary.total_interest)));

        if report.has_strategy {
            rows.push((
                "Saved vs standard monthly",
                format_currency(report.cost_savings),
            ));
            rows.push((
                "Time to pay off",
                format!(
                    "{:.1} vs {:.1} years",
                    report.actual_years_to_payoff, report.baseline_years_to_payoff
                ),
            ));
        }

        if let Some(projection) = &self.analysis.opportunity_cost {
            if let Some(value) = projection.pay_off_first.final_net_worth() {
                rows.push(("Net worth, pay off debt faster", format_currency(value)));
            }
            if let Some(value) = projection.invest_extra.final_net_worth() {
                rows.push(("Net worth, invest extra cashflow", format_currency(value)));
            }
        }
        rows
    }
}

impl fmt::Display for ReportTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (field, value) in self.rows() {
            builder.push_record([field, value.as_str()]);
        }
        writeln!(f, "{}", styled(builder))
    }
}

/// One row per period; the escrow column only appears when escrow is on.
pub struct ScheduleTable<'a> {
    schedule: &'a ScheduleResult,
    show_escrow: bool,
}

impl<'a> ScheduleTable<'a> {
    pub fn new(schedule: &'a ScheduleResult, show_escrow: bool) -> Self {
        Self {
            schedule,
            show_escrow,
        }
    }
}

impl fmt::Display for ScheduleTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        let mut header = vec!["Date", "Payment", "Principal", "Interest"];
        if self.show_escrow {
            header.push("Escrow");
        }
        header.extend(["Extra", "Balance"]);
        builder.push_record(header);

        for row in &self.schedule.records {
            let mut record = vec![
                row.date_label.clone(),
                format_currency(row.total_payment),
                format_currency(row.principal_portion),
                format_currency(row.interest_portion),
            ];
            if self.show_escrow {
                record.push(format_currency(row.escrow_portion));
            }
            record.push(format_currency(row.extra_portion));
            record.push(format_currency(row.ending_balance));
            builder.push_record(record);
        }

        writeln!(f, "{}", styled(builder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompoundingMode, PaymentFrequency, analyze};

    fn loan() -> LoanInputs {
        LoanInputs {
            home_price: 300_000.0,
            down_payment: 60_000.0,
            annual_rate_percent: 6.0,
            amortization_years: 30.0,
            term_years: 5.0,
            compounding_mode: CompoundingMode::Monthly,
            payment_frequency: PaymentFrequency::Monthly,
            use_escrow: true,
            tax_rate_percent_of_price: 1.0,
            ins_annual_amount: 1_200.0,
            hoa_monthly_amount: 0.0,
            pmi_rate_percent: 0.0,
            use_opportunity_cost: true,
            invest_rate_percent: 7.0,
            extra_payment_amount: 100.0,
            start_date: None,
        }
    }

    #[test]
    fn format_currency_groups_thousands_and_rounds_cents() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(5.5), "$5.50");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1_438.921_26), "$1,438.92");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(-2_500.0), "-$2,500.00");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn report_table_lists_escrow_savings_and_projection() {
        let inputs = loan();
        let analysis = analyze(&inputs);
        let text = ReportTable::new(&analysis, &inputs).to_string();

        assert!(text.contains("Mortgage amount"));
        assert!(text.contains("$240,000.00"));
        assert!(text.contains("True periodic payment (PITI)"));
        assert!(text.contains("Saved vs standard monthly"));
        assert!(text.contains("Net worth, pay off debt faster"));
        assert!(text.contains("Net worth, invest extra cashflow"));
    }

    #[test]
    fn report_table_flags_an_unpaid_schedule() {
        let mut inputs = loan();
        inputs.extra_payment_amount = -2_000.0;
        let analysis = analyze(&inputs);
        let text = ReportTable::new(&analysis, &inputs).to_string();

        assert!(text.contains("Field"));
        assert!(text.contains("not repaid within the schedule cap"));
    }

    #[test]
    fn schedule_table_has_one_row_per_period() {
        let inputs = loan();
        let analysis = analyze(&inputs);
        let text = ScheduleTable::new(&analysis.actual, true).to_string();

        let header = text
            .lines()
            .find(|line| line.contains("Date"))
            .expect("header row");
        assert!(header.contains("Escrow"));

        let rows: Vec<&str> = text.lines().filter(|line| line.starts_with("│ P")).collect();
        assert_eq!(rows.len(), analysis.actual.records.len());
        assert!(rows[0].starts_with("│ P1 "));
        assert!(rows[rows.len() - 1].contains("$0.00"));
    }

    #[test]
    fn schedule_table_omits_escrow_column_when_disabled() {
        let mut inputs = loan();
        inputs.use_escrow = false;
        let analysis = analyze(&inputs);
        let text = ScheduleTable::new(&analysis.actual, false).to_string();

        assert!(!text.contains("Escrow"));
        assert!(text.contains("Balance"));
    }
}
