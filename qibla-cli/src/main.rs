use anyhow::Context;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use prayer_times::{
    current_prayer, next_prayer, time_until, CalculationMethod, DailyPrayerSchedule,
    HighLatitudeRule, Madhab, Prayer, PrayerCalculator,
};
use qibla::{HeadingReading, QiblaCalculator};
use shared::{parse_timezone, validate_latitude, validate_longitude, GeoCoordinate};

#[derive(Parser)]
#[command(name = "qibla-cli", about = "Qibla direction and prayer time calculator")]
struct Cli {
    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bearing and distance from a coordinate to the Kaaba
    Direction {
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lon: f64,
        /// Device compass heading in degrees (0 = North)
        #[arg(long)]
        heading: Option<f64>,
        /// Reported heading accuracy in degrees; negative means invalid
        #[arg(long, default_value_t = 0.0)]
        heading_accuracy: f64,
        /// Alignment window in degrees either side of the Qibla bearing
        #[arg(long, default_value_t = 5.0)]
        threshold: f64,
    },
    /// The day's prayer times for a coordinate
    Times {
        lat: f64,
        lon: f64,
        /// Calendar date (YYYY-MM-DD), today by default
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Calculation method (mwl, isna, egypt, ummalqura, dubai,
        /// moonsighting, kuwait, qatar, singapore, tehran, turkey)
        #[arg(long, default_value = "mwl")]
        method: CalculationMethod,
        /// Asr rule (shafi, hanafi)
        #[arg(long, default_value = "shafi")]
        madhab: Madhab,
        /// High-latitude rule override (nightmiddle, oneseventh, anglebased)
        #[arg(long)]
        high_lat: Option<HighLatitudeRule>,
        /// Display timezone: IANA name or ±HH:MM offset
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },
    /// Next and current prayer for a coordinate, right now
    Next {
        lat: f64,
        lon: f64,
        #[arg(long, default_value = "mwl")]
        method: CalculationMethod,
        #[arg(long, default_value = "shafi")]
        madhab: Madhab,
        #[arg(long)]
        high_lat: Option<HighLatitudeRule>,
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Direction {
            lat,
            lon,
            heading,
            heading_accuracy,
            threshold,
        } => run_direction(lat, lon, heading, heading_accuracy, threshold, cli.json),
        Commands::Times {
            lat,
            lon,
            date,
            method,
            madhab,
            high_lat,
            timezone,
        } => run_times(lat, lon, date, method, madhab, high_lat, &timezone, cli.json),
        Commands::Next {
            lat,
            lon,
            method,
            madhab,
            high_lat,
            timezone,
        } => run_next(lat, lon, method, madhab, high_lat, &timezone, cli.json),
    }
}

fn coordinate(lat: f64, lon: f64) -> anyhow::Result<GeoCoordinate> {
    validate_latitude(lat)?;
    validate_longitude(lon)?;
    Ok(GeoCoordinate::new(lat, lon))
}

fn run_direction(
    lat: f64,
    lon: f64,
    heading: Option<f64>,
    heading_accuracy: f64,
    threshold: f64,
    json: bool,
) -> anyhow::Result<()> {
    let origin = coordinate(lat, lon)?;
    let calculator = QiblaCalculator::new(origin).with_alignment_threshold(threshold);

    let direction = match heading {
        Some(degrees) => {
            let reading = HeadingReading::new(degrees, heading_accuracy);
            if !reading.calibration().is_usable() {
                warn!(
                    accuracy = heading_accuracy,
                    "compass calibration is poor, alignment may be off"
                );
            }
            calculator.compute_with_heading(&reading)
        }
        None => calculator.compute(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&direction)?);
        return Ok(());
    }

    println!("Qibla:    {}", direction.formatted_bearing());
    println!("Distance: {:.0} km", direction.distance_km());
    if let Some(relative) = direction.relative_bearing {
        let status = if direction.is_aligned {
            "aligned"
        } else if relative > 0.0 {
            "turn right"
        } else {
            "turn left"
        };
        println!("Relative: {:+.1}° ({})", relative, status);
    }
    Ok(())
}

fn build_schedule(
    origin: GeoCoordinate,
    date: NaiveDate,
    method: CalculationMethod,
    madhab: Madhab,
    high_lat: Option<HighLatitudeRule>,
) -> anyhow::Result<DailyPrayerSchedule> {
    let mut calculator = PrayerCalculator::new(origin, method, madhab);
    if let Some(rule) = high_lat {
        calculator = calculator.with_high_latitude_rule(rule);
    }
    calculator
        .schedule_for(date)
        .context("prayer times cannot be determined for this date and location")
}

#[allow(clippy::too_many_arguments)]
fn run_times(
    lat: f64,
    lon: f64,
    date: Option<NaiveDate>,
    method: CalculationMethod,
    madhab: Madhab,
    high_lat: Option<HighLatitudeRule>,
    timezone: &str,
    json: bool,
) -> anyhow::Result<()> {
    let origin = coordinate(lat, lon)?;
    let offset = parse_timezone(timezone)?;
    let date = date.unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());

    let schedule = build_schedule(origin, date, method, madhab, high_lat)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
        return Ok(());
    }

    println!("Prayer times for {} ({} hijri)", date, schedule.hijri_date()?);
    for (prayer, time) in schedule.entries() {
        let marker = if prayer.is_prayer() { " " } else { "*" };
        println!("{}{:<8} {}", marker, prayer.name(), local(time, offset));
    }
    println!("* solar reference event, not a prayer");
    Ok(())
}

fn run_next(
    lat: f64,
    lon: f64,
    method: CalculationMethod,
    madhab: Madhab,
    high_lat: Option<HighLatitudeRule>,
    timezone: &str,
    json: bool,
) -> anyhow::Result<()> {
    let origin = coordinate(lat, lon)?;
    let offset = parse_timezone(timezone)?;
    let now = Utc::now();
    let today = now.with_timezone(&offset).date_naive();

    let mut schedule = build_schedule(origin, today, method, madhab, high_lat)?;
    // The running period is always judged against today's schedule, even
    // when the next entry has to come from tomorrow's.
    let current = current_prayer(&schedule, now);
    let mut upcoming = next_prayer(&schedule, now);

    // All of today's entries may already be behind us; roll to tomorrow.
    if upcoming.is_none() {
        if let Some(tomorrow) = today.succ_opt() {
            info!(%tomorrow, "today's prayers have passed, rolling over");
            schedule = build_schedule(origin, tomorrow, method, madhab, high_lat)?;
            upcoming = next_prayer(&schedule, now);
        }
    }

    if json {
        let body = serde_json::json!({
            "next": upcoming.map(|p| next_entry(&schedule, p, now, offset)),
            "current": current.map(|p| p.name()),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    match upcoming {
        Some(prayer) => {
            let remaining = time_until(&schedule, prayer, now);
            println!(
                "Next:    {} at {} ({})",
                prayer.name(),
                local(schedule.time_of(prayer), offset),
                countdown(remaining)
            );
        }
        None => println!("Next:    none"),
    }
    match current {
        Some(prayer) => println!("Current: {} period", prayer.name()),
        None => println!("Current: before Fajr"),
    }
    Ok(())
}

fn next_entry(
    schedule: &DailyPrayerSchedule,
    prayer: Prayer,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> serde_json::Value {
    serde_json::json!({
        "name": prayer.name(),
        "time": local(schedule.time_of(prayer), offset),
        "minutes_remaining": time_until(schedule, prayer, now).num_minutes(),
    })
}

fn local(time: DateTime<Utc>, offset: FixedOffset) -> String {
    time.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string()
}

fn countdown(remaining: Duration) -> String {
    let minutes = remaining.num_minutes();
    if minutes < 1 {
        return "now".to_string();
    }
    let hours = minutes / 60;
    let minutes = minutes % 60;
    if hours > 0 {
        format!("in {}h {}m", hours, minutes)
    } else {
        format!("in {}m", minutes)
    }
}
