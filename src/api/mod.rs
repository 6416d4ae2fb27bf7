mod render;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{CompoundingMode, LoanAnalysis, LoanInputs, PaymentFrequency, analyze};
use crate::error::{CommandError, InputError};

pub use render::{ReportTable, ScheduleTable, format_currency};

/// Longest amortization or term accepted, in years.
pub const MAX_LOAN_YEARS: f64 = 100.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliCompounding {
    Monthly,
    SemiAnnual,
}

impl From<CliCompounding> for CompoundingMode {
    fn from(value: CliCompounding) -> Self {
        match value {
            CliCompounding::Monthly => CompoundingMode::Monthly,
            CliCompounding::SemiAnnual => CompoundingMode::SemiAnnual,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliFrequency {
    Monthly,
    SemiMonthly,
    BiWeekly,
    AcceleratedBiWeekly,
}

impl From<CliFrequency> for PaymentFrequency {
    fn from(value: CliFrequency) -> Self {
        match value {
            CliFrequency::Monthly => PaymentFrequency::Monthly,
            CliFrequency::SemiMonthly => PaymentFrequency::SemiMonthly,
            CliFrequency::BiWeekly => PaymentFrequency::BiWeekly,
            CliFrequency::AcceleratedBiWeekly => PaymentFrequency::AcceleratedBiWeekly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiCompounding {
    Monthly,
    #[serde(alias = "semi", alias = "semiAnnual", alias = "semi_annual")]
    SemiAnnual,
}

impl From<ApiCompounding> for CliCompounding {
    fn from(value: ApiCompounding) -> Self {
        match value {
            ApiCompounding::Monthly => CliCompounding::Monthly,
            ApiCompounding::SemiAnnual => CliCompounding::SemiAnnual,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFrequency {
    Monthly,
    #[serde(alias = "semiMonthly", alias = "semi_monthly")]
    SemiMonthly,
    #[serde(alias = "biweekly", alias = "biWeekly", alias = "bi_weekly")]
    BiWeekly,
    #[serde(
        alias = "accelerated-biweekly",
        alias = "acceleratedBiWeekly",
        alias = "accelerated_bi_weekly"
    )]
    AcceleratedBiWeekly,
}

impl From<ApiFrequency> for CliFrequency {
    fn from(value: ApiFrequency) -> Self {
        match value {
            ApiFrequency::Monthly => CliFrequency::Monthly,
            ApiFrequency::SemiMonthly => CliFrequency::SemiMonthly,
            ApiFrequency::BiWeekly => CliFrequency::BiWeekly,
            ApiFrequency::AcceleratedBiWeekly => CliFrequency::AcceleratedBiWeekly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "amortize",
    version,
    about = "Mortgage amortization schedules with escrow, PMI, extra payments and opportunity cost"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the report and payment schedule for one loan
    Schedule {
        #[command(flatten)]
        loan: LoanArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Args, Debug, Clone)]
pub struct LoanArgs {
    #[arg(long, default_value_t = 500_000.0)]
    pub home_price: f64,
    #[arg(long, default_value_t = 100_000.0)]
    pub down_payment: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Nominal annual interest rate in percent"
    )]
    pub interest_rate: f64,
    #[arg(long, default_value_t = 25.0, help = "Amortization period in years")]
    pub amortization_years: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Mortgage term in years, used for the balance owed at renewal"
    )]
    pub term_years: f64,
    #[arg(long, value_enum, default_value_t = CliCompounding::Monthly)]
    pub compounding: CliCompounding,
    #[arg(long, value_enum, default_value_t = CliFrequency::Monthly)]
    pub frequency: CliFrequency,
    #[arg(long, help = "Include property tax, insurance, HOA and PMI in each payment")]
    pub use_escrow: bool,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Annual property tax as percent of home price"
    )]
    pub property_tax_rate: f64,
    #[arg(long, default_value_t = 1_200.0, help = "Annual home insurance")]
    pub home_insurance: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly HOA fees")]
    pub hoa_fees: f64,
    #[arg(
        long,
        default_value_t = 0.5,
        help = "Annual PMI rate in percent of the loan, charged above 80% LTV"
    )]
    pub pmi_rate: f64,
    #[arg(long, help = "Compare paying off early against investing the difference")]
    pub opportunity_cost: bool,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual investment return in percent"
    )]
    pub invest_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Extra principal paid every period")]
    pub extra_payment: f64,
    #[arg(long, help = "First payment date, YYYY-MM-DD")]
    pub start_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SchedulePayload {
    home_price: Option<f64>,
    down_payment: Option<f64>,
    interest_rate: Option<f64>,
    amortization: Option<f64>,
    term: Option<f64>,
    compounding: Option<ApiCompounding>,
    payment_frequency: Option<ApiFrequency>,

    include_piti: Option<bool>,
    property_tax: Option<f64>,
    home_insurance: Option<f64>,
    hoa_fees: Option<f64>,
    pmi_rate: Option<f64>,

    opp_cost: Option<bool>,
    invest_rate: Option<f64>,

    extra_payment: Option<f64>,
    first_payment_date: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_inputs(args: LoanArgs) -> Result<LoanInputs, InputError> {
    for (flag, value) in [
        ("--home-price", args.home_price),
        ("--down-payment", args.down_payment),
        ("--interest-rate", args.interest_rate),
        ("--amortization-years", args.amortization_years),
        ("--term-years", args.term_years),
        ("--property-tax-rate", args.property_tax_rate),
        ("--home-insurance", args.home_insurance),
        ("--hoa-fees", args.hoa_fees),
        ("--pmi-rate", args.pmi_rate),
        ("--invest-rate", args.invest_rate),
        ("--extra-payment", args.extra_payment),
    ] {
        if !value.is_finite() {
            return Err(InputError::NotFinite { flag });
        }
    }

    if args.home_price <= 0.0 {
        return Err(InputError::NotPositive {
            flag: "--home-price",
        });
    }

    if args.amortization_years <= 0.0 {
        return Err(InputError::NotPositive {
            flag: "--amortization-years",
        });
    }

    for (flag, value) in [
        ("--amortization-years", args.amortization_years),
        ("--term-years", args.term_years),
    ] {
        if value > MAX_LOAN_YEARS {
            return Err(InputError::TooLarge {
                flag,
                max: MAX_LOAN_YEARS,
            });
        }
    }

    for (flag, value) in [
        ("--down-payment", args.down_payment),
        ("--interest-rate", args.interest_rate),
        ("--term-years", args.term_years),
        ("--property-tax-rate", args.property_tax_rate),
        ("--home-insurance", args.home_insurance),
        ("--hoa-fees", args.hoa_fees),
        ("--pmi-rate", args.pmi_rate),
        ("--extra-payment", args.extra_payment),
    ] {
        if value < 0.0 {
            return Err(InputError::Negative { flag });
        }
    }

    if args.down_payment > args.home_price {
        return Err(InputError::DownPaymentExceedsPrice);
    }

    if args.invest_rate <= -100.0 {
        return Err(InputError::TotalLoss {
            flag: "--invest-rate",
        });
    }

    let start_date = match args.start_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                InputError::InvalidStartDate {
                    value: raw.to_string(),
                }
            })?,
        ),
    };

    Ok(LoanInputs {
        home_price: args.home_price,
        down_payment: args.down_payment,
        annual_rate_percent: args.interest_rate,
        amortization_years: args.amortization_years,
        term_years: args.term_years,
        compounding_mode: args.compounding.into(),
        payment_frequency: args.frequency.into(),
        use_escrow: args.use_escrow,
        tax_rate_percent_of_price: args.property_tax_rate,
        ins_annual_amount: args.home_insurance,
        hoa_monthly_amount: args.hoa_fees,
        pmi_rate_percent: args.pmi_rate,
        use_opportunity_cost: args.opportunity_cost,
        invest_rate_percent: args.invest_rate,
        extra_payment_amount: args.extra_payment,
        start_date,
    })
}

pub fn run_schedule_command(loan: LoanArgs, format: OutputFormat) -> Result<String, CommandError> {
    let inputs = build_inputs(loan)?;
    let analysis = analyze(&inputs);
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Table => Ok(format!(
            "{}\n{}",
            ReportTable::new(&analysis, &inputs),
            ScheduleTable::new(&analysis.actual, inputs.use_escrow)
        )),
    }
}

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/schedule",
            get(schedule_get_handler).post(schedule_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "amortize HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/schedule");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn schedule_get_handler(
    payload: Result<Query<SchedulePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => schedule_handler_impl(payload).await,
        Err(rejection) => malformed_request(rejection.body_text()),
    }
}

async fn schedule_post_handler(payload: Result<Json<SchedulePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => schedule_handler_impl(payload).await,
        Err(rejection) => malformed_request(rejection.body_text()),
    }
}

fn malformed_request(msg: String) -> Response {
    warn!(error = %msg, "malformed schedule request");
    error_response(StatusCode::BAD_REQUEST, &msg)
}

async fn schedule_handler_impl(payload: SchedulePayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(err) => {
            warn!(error = %err, "rejected schedule request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    let analysis: LoanAnalysis = analyze(&inputs);
    info!(
        periods = analysis.actual.summary.periods_to_payoff,
        paid_off = analysis.actual.summary.paid_off,
        "schedule computed"
    );
    json_response(StatusCode::OK, analysis)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn inputs_from_payload(payload: SchedulePayload) -> Result<LoanInputs, InputError> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.home_price {
        args.home_price = v;
    }
    if let Some(v) = payload.down_payment {
        args.down_payment = v;
    }
    if let Some(v) = payload.interest_rate {
        args.interest_rate = v;
    }
    if let Some(v) = payload.amortization {
        args.amortization_years = v;
    }
    if let Some(v) = payload.term {
        args.term_years = v;
    }
    if let Some(v) = payload.compounding {
        args.compounding = v.into();
    }
    if let Some(v) = payload.payment_frequency {
        args.frequency = v.into();
    }

    if let Some(v) = payload.include_piti {
        args.use_escrow = v;
    }
    if let Some(v) = payload.property_tax {
        args.property_tax_rate = v;
    }
    if let Some(v) = payload.home_insurance {
        args.home_insurance = v;
    }
    if let Some(v) = payload.hoa_fees {
        args.hoa_fees = v;
    }
    if let Some(v) = payload.pmi_rate {
        args.pmi_rate = v;
    }

    if let Some(v) = payload.opp_cost {
        args.opportunity_cost = v;
    }
    if let Some(v) = payload.invest_rate {
        args.invest_rate = v;
    }

    if let Some(v) = payload.extra_payment {
        args.extra_payment = v;
    }
    if let Some(v) = payload.first_payment_date {
        args.start_date = Some(v);
    }

    build_inputs(args)
}

fn default_args_for_api() -> LoanArgs {
    LoanArgs {
        home_price: 500_000.0,
        down_payment: 100_000.0,
        interest_rate: 5.0,
        amortization_years: 25.0,
        term_years: 5.0,
        compounding: CliCompounding::Monthly,
        frequency: CliFrequency::Monthly,
        use_escrow: false,
        property_tax_rate: 1.0,
        home_insurance: 1_200.0,
        hoa_fees: 0.0,
        pmi_rate: 0.5,
        opportunity_cost: false,
        invest_rate: 7.0,
        extra_payment: 0.0,
        start_date: None,
    }
}
