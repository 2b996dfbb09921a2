use chrono::{DateTime, Datelike, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use forecast_store::binder::{ForecastBinder, ForecastFormatter, ViewVariant};
use forecast_store::config::Config;
use forecast_store::contract;
use forecast_store::date::{normalize_date, DAY_IN_MILLIS};
use forecast_store::db::{DbPool, WeatherStore};

#[derive(Parser)]
#[command(name = "show-forecast")]
#[command(about = "Print the stored forecast for a location", long_about = None)]
struct Cli {
    /// Location setting to look up, e.g. a postal code
    location: String,

    /// Only show days from today forward
    #[arg(long)]
    from_today: bool,

    /// Render the first row with the larger today layout
    #[arg(long)]
    today_layout: bool,

    /// Emit rows as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Database connection string; falls back to DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
}

/// Console stand-in for the app's formatting collaborator.
struct ConsoleFormatter;

impl ForecastFormatter for ConsoleFormatter {
    fn icon(&self, weather_id: i64, variant: ViewVariant) -> String {
        let name = match weather_id {
            200..=232 => "storm",
            300..=321 => "light_rain",
            500..=504 | 520..=531 => "rain",
            511 | 600..=622 => "snow",
            761 | 781 => "storm",
            701..=760 => "fog",
            800 => "clear",
            801 => "light_clouds",
            802..=804 => "cloudy",
            _ => "unknown",
        };
        match variant {
            ViewVariant::Today => format!("art_{name}"),
            ViewVariant::FutureDay => format!("ic_{name}"),
        }
    }

    fn day_label(&self, date_millis: i64, use_today_layout: bool) -> String {
        let today = normalize_date(Utc::now().timestamp_millis()).unwrap_or(0);
        let Some(date) = DateTime::<Utc>::from_timestamp_millis(date_millis) else {
            return date_millis.to_string();
        };

        if date_millis == today && use_today_layout {
            format!("Today, {}", date.format("%B %e"))
        } else if date_millis == today + DAY_IN_MILLIS {
            "Tomorrow".to_string()
        } else if date_millis > today && date_millis < today + 7 * DAY_IN_MILLIS {
            date.weekday().to_string()
        } else {
            date.format("%a %b %e").to_string()
        }
    }

    fn temperature(&self, value: f64) -> String {
        format!("{value:.0}\u{00b0}")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let database_url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| Config::from_env().database_url);
    let db = DbPool::connect(&database_url).await?;
    let store = WeatherStore::new(db);

    let uri = if cli.from_today {
        contract::weather_for_location_with_start_date(
            &cli.location,
            Utc::now().timestamp_millis(),
        )?
    } else {
        contract::weather_for_location(&cli.location)
    };

    let rows = store.query(&uri, None).await?;
    if rows.is_empty() {
        println!("No forecast stored for {}", cli.location);
        return Ok(());
    }

    let binder = ForecastBinder::new(ConsoleFormatter, cli.today_layout);
    let bound = binder.bind_all(&rows);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&bound)?);
    } else {
        println!("Forecast for {}:\n", cli.location);
        for row in &bound {
            println!(
                "  {:<16} {:>5}/{:<5}  {:<14} [{}]",
                row.day_label, row.high, row.low, row.description, row.icon
            );
        }
    }

    Ok(())
}
