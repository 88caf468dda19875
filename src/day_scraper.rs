use futures::stream::{self, StreamExt};
use log::{error, warn};

use crate::calendar_scraper::CalendarScraper;
use crate::config::ScrapeConfig;
use crate::session::{DayData, SessionType};
use crate::slot_scraper::{FetchOutcome, SlotScraper};

/// Gathers every slot of one calendar day by scanning its session forms
/// and fetching each one in its own browser session.
#[derive(Debug)]
pub struct DayScraper {
    pub date: String,
    pub session_type: SessionType,
    config: ScrapeConfig,
}

impl DayScraper {
    pub fn new(date: String, session_type: SessionType, config: ScrapeConfig) -> Self {
        Self {
            date,
            session_type,
            config,
        }
    }

    /// Fails only if the calendar scan itself fails; individual slot
    /// fetches degrade to logged `Unavailable` outcomes instead.
    pub async fn scrape(&self) -> anyhow::Result<DayData> {
        let scanner = CalendarScraper::new(self.session_type, self.config.clone());
        let form_ids = scanner.scan_day(&self.date).await?;

        let fetches = form_ids.into_iter().map(|form_id| {
            let scraper = SlotScraper::new(
                self.date.clone(),
                form_id,
                self.session_type,
                self.config.clone(),
            );
            async move { scraper.scrape().await }
        });

        // Bounded fan-out; buffered keeps the scanner's form order.
        let outcomes: Vec<FetchOutcome> = stream::iter(fetches)
            .buffered(self.config.max_concurrent_sessions)
            .collect()
            .await;

        let mut sessions = Vec::new();
        for outcome in outcomes {
            match outcome {
                FetchOutcome::Fetched(slots) => sessions.extend(slots),
                FetchOutcome::Unavailable(reason) => {
                    warn!("dropping failed slot fetch on {}: {reason}", self.date);
                }
            }
        }
        Ok(DayData { sessions })
    }
}

/// Settles a batch of per-day results into the final output: failed days
/// are logged and dropped, fulfilled ones keep their insertion order.
pub fn collect_sessions(results: Vec<anyhow::Result<DayData>>) -> DayData {
    let mut sessions = Vec::new();
    for result in results {
        match result {
            Ok(day_data) => sessions.extend(day_data.sessions),
            Err(err) => error!("day scrape failed and was dropped: {err:#}"),
        }
    }
    DayData { sessions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Side, Slot};
    use crate::slot_scraper::{build_day_data, sold_out_slot};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn failed_days_are_dropped_and_order_is_preserved() {
        // Two available days: the first has one sold-out form and one open
        // form with two lanes left, the second day's scan failed outright.
        let day_one = DayData {
            sessions: [
                vec![sold_out_slot(SessionType::Advanced, "2021-11-12", "9:00 AM")],
                build_day_data(
                    &strings(&["2", "4"]),
                    "12th November 2021 at 10:00 AM",
                    SessionType::Advanced,
                ),
            ]
            .concat(),
        };
        let results = vec![
            Ok(day_one),
            Err(anyhow::anyhow!("timed out waiting for calendar cell")),
        ];

        let collected = collect_sessions(results);
        assert_eq!(collected.sessions.len(), 3);
        assert_eq!(collected.sessions[0].availability, 0);
        assert_eq!(collected.sessions[0].side, Side::Left);
        assert_eq!(collected.sessions[1].availability, 2);
        assert_eq!(collected.sessions[2].availability, 4);
        assert_eq!(collected.sessions[2].side, Side::Right);
    }

    #[test]
    fn all_failures_settle_to_empty_output() {
        let results: Vec<anyhow::Result<DayData>> = vec![
            Err(anyhow::anyhow!("no browser")),
            Err(anyhow::anyhow!("no calendar")),
        ];
        assert!(collect_sessions(results).sessions.is_empty());
    }

    #[test]
    fn flattened_output_serializes_to_the_wire_shape() {
        let data = collect_sessions(vec![Ok(DayData {
            sessions: vec![Slot {
                session_type: SessionType::Advanced,
                date: "12th November 2021".to_string(),
                time: "9:00 AM".to_string(),
                availability: 5,
                side: Side::Left,
            }],
        })]);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["sessions"][0]["availiability"], 5);
        assert_eq!(json["sessions"][0]["sessionType"], "Advanced");
    }
}
