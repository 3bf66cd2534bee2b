use chrono::{Datelike, NaiveDate, Utc};
use clap::Subcommand;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cli::utils::{output_fields, output_json};
use crate::cli::{CliContext, OutputFormat};
use crate::database::store::DateRange;
use crate::services::{FinancialService, Recovery};

#[derive(Subcommand)]
pub enum StatsCommands {
    #[command(about = "Portfolio figures: all-time recovery plus one year's rent and expenses")]
    Portfolio {
        #[arg(long, help = "Year to scope rent and expenses to (default: current year)")]
        year: Option<i32>,
    },

    #[command(about = "All-time recovery figures for one apartment")]
    Apartment {
        #[arg(help = "Apartment id")]
        id: Uuid,
    },

    #[command(about = "Revenue, expenses and occupancy from transactions")]
    Kpis {
        #[arg(long, help = "First day, inclusive (YYYY-MM-DD)")]
        start: Option<NaiveDate>,

        #[arg(long, help = "Last day, inclusive (YYYY-MM-DD)")]
        end: Option<NaiveDate>,
    },
}

pub async fn handle(cmd: StatsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::open().await?;
    let service = FinancialService::new(ctx.store.clone());

    match cmd {
        StatsCommands::Portfolio { year } => {
            let stats = service.portfolio(year.unwrap_or_else(|| Utc::now().year())).await?;
            if output_format == OutputFormat::Json {
                return output_json(&stats);
            }
            let mut rows = recovery_rows(&stats.recovery);
            rows.extend([
                ("Year", stats.year.to_string()),
                ("Rent (year)", money(stats.total_monthly_rent)),
                ("Expenses (year)", money(stats.total_monthly_expenses)),
                ("Net profit (year)", money(stats.net_profit)),
                ("ROI", percent(stats.roi)),
                ("Avg monthly rent", money(stats.avg_monthly_rent)),
                ("Avg monthly expenses", money(stats.avg_monthly_expenses)),
            ]);
            output_fields(&rows);
        }
        StatsCommands::Apartment { id } => {
            let stats = service.apartment(id).await?;
            if output_format == OutputFormat::Json {
                return output_json(&stats);
            }
            let mut rows = vec![("Apartment", stats.apartment_id.to_string())];
            rows.extend(recovery_rows(&stats.recovery));
            output_fields(&rows);
        }
        StatsCommands::Kpis { start, end } => {
            let kpis = service.kpis(DateRange { start, end }).await?;
            if output_format == OutputFormat::Json {
                return output_json(&kpis);
            }
            output_fields(&[
                ("Period", kpis.period.clone()),
                ("Revenue", money(kpis.total_revenue)),
                ("Expenses", money(kpis.total_expenses)),
                ("Net profit", money(kpis.net_profit)),
                ("Occupancy", percent(kpis.occupancy_rate)),
            ]);
        }
    }
    Ok(())
}

fn recovery_rows(r: &Recovery) -> Vec<(&'static str, String)> {
    vec![
        ("Total investment", money(r.total_investment)),
        ("All-time rent", money(r.all_time_rent)),
        ("All-time expenses", money(r.all_time_expenses)),
        ("All-time net earnings", money(r.all_time_net_earnings)),
        ("Remaining investment", money(r.remaining_investment)),
        ("Recovered", percent(r.recovery_percentage)),
    ]
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn percent(value: Decimal) -> String {
    format!("{:.1}%", value.round_dp(1))
}
