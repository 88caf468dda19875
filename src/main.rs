use anyhow::bail;
use clap::{ArgAction, Parser};
use dotenv::dotenv;
use futures::stream::{self, StreamExt};
use wavewatcher::{
    CalendarDay, CalendarScraper, DayData, DayScraper, ScrapeConfig, SessionType,
    collect_sessions, default_end_date, get_date, parse_date, today,
};

use log::LevelFilter;
use log::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "wavewatcher",
    version,
    disable_version_flag = true,
    about = "Scrape The Wave's booking calendar for open surf-session slots and write them to a JSON file"
)]
struct Args {
    /// start date you want to get wave availiability from in the format
    /// yearmonthday (YYYY-MM-DD) ie 2021-11-08 - defaults to now
    #[arg(short = 's', long = "startDate")]
    start_date: Option<String>,

    /// end date you want to get wave availiability from in the format
    /// yearmonthday (YYYY-MM-DD) ie 2021-11-08 - defaults to 30 days from now
    #[arg(short = 'e', long = "endDate")]
    end_date: Option<String>,

    /// session type to check availability for (advanced, intermediate,
    /// advanced-plus, expert-barrels, expert-turns, waikiki, beginner,
    /// beginner-lesson)
    #[arg(long = "session", default_value = "advanced")]
    session: String,

    /// positional start date, kept for compatibility with the flag form
    #[arg(value_name = "startDate")]
    start_date_arg: Option<String>,

    /// positional end date, kept for compatibility with the flag form
    #[arg(value_name = "endDate")]
    end_date_arg: Option<String>,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

async fn run_calendar_scrape_job(
    session_type: SessionType,
    config: &ScrapeConfig,
) -> anyhow::Result<Vec<CalendarDay>> {
    let scraper = CalendarScraper::new(session_type, config.clone());
    let days = scraper.scrape_month().await?;
    Ok(days
        .into_iter()
        .filter(CalendarDay::is_available)
        .collect())
}

async fn run_day_scrape_jobs(
    available_days: Vec<CalendarDay>,
    session_type: SessionType,
    config: &ScrapeConfig,
) -> DayData {
    let day_jobs = available_days.into_iter().map(|day| {
        let scraper = DayScraper::new(day.date, session_type, config.clone());
        async move { scraper.scrape().await }
    });

    // Every day job runs to completion; failures end up as Err entries in
    // the collected results instead of short-circuiting the batch.
    let results: Vec<anyhow::Result<DayData>> = stream::iter(day_jobs)
        .buffered(config.max_concurrent_sessions)
        .collect()
        .await;

    collect_sessions(results)
}

/// Both dates must parse before any scraping starts; a bad flag exits the
/// process without touching the output file.
fn parse_date_range(
    start_raw: &str,
    end_raw: &str,
) -> anyhow::Result<(chrono::NaiveDate, chrono::NaiveDate)> {
    let (Ok(start_date), Ok(end_date)) = (parse_date(start_raw), parse_date(end_raw)) else {
        bail!("start date: {start_raw} or end date: {end_raw} were in the incorrect format");
    };
    Ok((start_date, end_date))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = ScrapeConfig::new()?;

    let session_type: SessionType = args
        .session
        .parse()
        .map_err(|err| anyhow::anyhow!("{err}"))?;

    let start_raw = args
        .start_date
        .or(args.start_date_arg)
        .unwrap_or_else(|| get_date(today()));
    let end_raw = args
        .end_date
        .or(args.end_date_arg)
        .unwrap_or_else(|| get_date(default_end_date()));

    let (start_date, end_date) = parse_date_range(&start_raw, &end_raw)?;

    info!(
        "dates are start date: {} and end date: {}",
        start_date.format("%d/%m/%Y"),
        end_date.format("%d/%m/%Y")
    );

    let available_days = run_calendar_scrape_job(session_type, &config).await?;
    info!(
        "{} available days on the {session_type} calendar",
        available_days.len()
    );

    let day_data = run_day_scrape_jobs(available_days, session_type, &config).await;
    info!("collected {} slots in total", day_data.sessions.len());

    let json = serde_json::to_string_pretty(&day_data)?;
    // A failed write is logged but does not change the exit code.
    if let Err(err) = tokio::fs::write(&config.output_path, json).await {
        error!("failed to write {}: {err}", config.output_path);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .init();

    let args = Args::parse();
    run(args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_range_parses() {
        let (start, end) = parse_date_range("2021-11-08", "2021-12-08").unwrap();
        assert_eq!(get_date(start), "2021-11-08");
        assert_eq!(get_date(end), "2021-12-08");
    }

    #[test]
    fn bad_date_reports_both_raw_values() {
        let err = parse_date_range("2021-11-08", "soonish").unwrap_err();
        assert_eq!(
            err.to_string(),
            "start date: 2021-11-08 or end date: soonish were in the incorrect format"
        );
        let err = parse_date_range("08/11/2021", "2021-12-08").unwrap_err();
        assert_eq!(
            err.to_string(),
            "start date: 08/11/2021 or end date: 2021-12-08 were in the incorrect format"
        );
    }
}
