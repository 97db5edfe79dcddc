//! Command line front end for the lunar calendar API.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lunar_solar_calendar::client::{ApiClient, ClientError};
use lunar_solar_calendar::lunar::LunarDate;
use lunar_solar_calendar::models::{
    DateParts, LeapMonthPossibleRequest, LunarBirthdayCalendarRequest,
    LunarBirthdayForYearRequest, SolarToLunarRequest,
};
use lunar_solar_calendar::services::notification::Notification;

#[derive(Parser, Debug)]
#[command(name = "lunar-cli", version, about = "Lunar birthday conversions and calendars")]
struct Cli {
    /// Root URL of the lunar calendar service
    #[arg(long, env = "LUNAR_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solar date of a lunar birthday in the given year
    Birthday {
        /// Lunar birth date, YYYY-MM-DD
        #[arg(long)]
        lunar_date: DateParts,
        /// The birth month is the repeated (leap) month
        #[arg(long)]
        leap: bool,
        #[arg(long)]
        year: i32,
    },
    /// Lunar date of a solar date
    SolarToLunar {
        /// Solar date, YYYY-MM-DD
        #[arg(long)]
        date: DateParts,
    },
    /// Whether a lunar month repeats in a year
    LeapMonth {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
    /// Write an .ics calendar of lunar birthdays
    Calendar {
        /// Lunar birth date, YYYY-MM-DD
        #[arg(long)]
        lunar_date: DateParts,
        #[arg(long)]
        leap: bool,
        /// Last lunar year to include
        #[arg(long)]
        last_year: i32,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Reminder offset such as `15h` (before) or `+9h` (after); repeatable
        #[arg(long = "remind")]
        reminders: Vec<Notification>,
        /// Output file, defaults to `<title>.ics`
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(cli.api_url);

    match cli.command {
        Command::Birthday {
            lunar_date,
            leap,
            year,
        } => {
            let resp = client
                .lunar_birthday_for_year(&LunarBirthdayForYearRequest {
                    lunar_birth_date: lunar_date,
                    is_leap_month: leap,
                    year,
                })
                .await?;
            println!("{}", DateParts::new(resp.year, resp.month, resp.day));
        }
        Command::SolarToLunar { date } => {
            let resp = client
                .solar_to_lunar(&SolarToLunarRequest {
                    solar_birth_date: date,
                })
                .await?;
            println!("{}", LunarDate::from(resp));
        }
        Command::LeapMonth { year, month } => {
            let resp = client
                .leap_month_possible(&LeapMonthPossibleRequest { year, month })
                .await?;
            match resp.leap_month {
                Some(leap) => println!(
                    "{}: leap month {} ({})",
                    year,
                    leap,
                    if resp.possible { "matches" } else { "does not match" }
                ),
                None => println!("{}: no leap month", year),
            }
        }
        Command::Calendar {
            lunar_date,
            leap,
            last_year,
            title,
            description,
            reminders,
            output,
        } => {
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.ics", title)));
            let req = LunarBirthdayCalendarRequest {
                lunar_birth_date: lunar_date,
                is_leap_month: leap,
                last_year,
                title,
                description,
                notifications: reminders,
            };

            let resp = match client.lunar_birthday_calendar(&req).await {
                Ok(resp) => resp,
                // Show the server's response verbatim
                Err(ClientError::Status { body, .. }) => anyhow::bail!("{}", body),
                Err(e) => return Err(e.into()),
            };

            std::fs::write(&output, resp.calendar)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}
