use std::time::Duration;

use log::{error, info};
use thirtyfour::prelude::*;
use tokio::time::sleep;

use crate::browser::BrowserSession;
use crate::calendar_scraper::wait_for;
use crate::config::ScrapeConfig;
use crate::session::{SessionType, Side, Slot, Time};

const REMAINING_CAPACITY_INPUTS: &str = "div#tickets-list input.remaining";
const SELECTED_DATETIME: &str = "#datetimeselected";
// Separator inside the "12th November 2021 at 9:00 AM" display string.
const DATE_TIME_SEPARATOR: &str = " at ";

const CLICK_PAUSE: Duration = Duration::from_millis(300);
const RENDER_PAUSE: Duration = Duration::from_millis(500);
// The remaining-capacity inputs appear before their values settle.
const CAPACITY_SETTLE_PAUSE: Duration = Duration::from_millis(1000);

/// What a slot fetch produced. Keeps "the venue reported zero" separate
/// from "the scrape itself failed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(Vec<Slot>),
    Unavailable(String),
}

/// Fetches the availability behind one session form for one day, in its
/// own browser session.
#[derive(Debug)]
pub struct SlotScraper {
    pub date: String,
    pub form_id: String,
    pub session_type: SessionType,
    config: ScrapeConfig,
}

impl SlotScraper {
    pub fn new(
        date: String,
        form_id: String,
        session_type: SessionType,
        config: ScrapeConfig,
    ) -> Self {
        Self {
            date,
            form_id,
            session_type,
            config,
        }
    }

    /// Never returns an error: anything thrown by the page interactions is
    /// logged and reported as `Unavailable` so one bad form cannot sink the
    /// rest of the day.
    pub async fn scrape(&self) -> FetchOutcome {
        match self.try_scrape().await {
            Ok(slots) => FetchOutcome::Fetched(slots),
            Err(err) => {
                error!(
                    "slot fetch for form {} on {} failed: {err:#}",
                    self.form_id, self.date
                );
                FetchOutcome::Unavailable(format!("{err:#}"))
            }
        }
    }

    async fn try_scrape(&self) -> anyhow::Result<Vec<Slot>> {
        let session = BrowserSession::launch(&self.config).await?;
        let result = self.scrape_slots_on(session.driver()).await;
        session.close().await?;
        result
    }

    async fn scrape_slots_on(&self, driver: &WebDriver) -> anyhow::Result<Vec<Slot>> {
        driver
            .goto(self.session_type.booking_url(&self.config.booking_base_url))
            .await?;

        let date_cell = wait_for(driver, &format!(r#"td[data-date="{}"]"#, self.date)).await?;
        date_cell.click().await?;
        sleep(RENDER_PAUSE).await;

        if self.is_sold_out(driver).await? {
            let time_label = self.submit_button_label(driver).await?;
            info!("{} form {} is sold out", self.date, self.form_id);
            return Ok(vec![sold_out_slot(
                self.session_type,
                &self.date,
                &time_label,
            )]);
        }

        let submit = wait_for(driver, &self.submit_selector()).await?;
        // The booking widget needs the second click to actually submit.
        driver
            .action_chain()
            .double_click_element(&submit)
            .perform()
            .await?;
        sleep(CLICK_PAUSE).await;

        wait_for(driver, REMAINING_CAPACITY_INPUTS).await?;
        sleep(CAPACITY_SETTLE_PAUSE).await;

        let inputs = driver.find_all(By::Css(REMAINING_CAPACITY_INPUTS)).await?;
        let mut availability = Vec::with_capacity(inputs.len());
        for input in inputs {
            availability.push(input.attr("value").await?.unwrap_or_default());
        }

        let time_slot = driver
            .find(By::Css(SELECTED_DATETIME))
            .await?
            .text()
            .await?;
        info!(
            "{} form {}: remaining {availability:?} at {time_slot:?}",
            self.date, self.form_id
        );

        Ok(build_day_data(&availability, &time_slot, self.session_type))
    }

    async fn is_sold_out(&self, driver: &WebDriver) -> anyhow::Result<bool> {
        let markers = driver
            .find_all(By::Css(&format!("#{} .soldout", self.form_id)))
            .await?;
        Ok(!markers.is_empty())
    }

    async fn submit_button_label(&self, driver: &WebDriver) -> anyhow::Result<String> {
        let button = driver.find(By::Css(&self.submit_selector())).await?;
        Ok(button.attr("value").await?.unwrap_or_default())
    }

    fn submit_selector(&self) -> String {
        format!("#{} input[type=submit]", self.form_id)
    }
}

/// A sold-out session still gets one record so the day shows up in the
/// output; the submit button's label is the only time the page exposes.
pub fn sold_out_slot(session_type: SessionType, date: &str, time_label: &str) -> Slot {
    Slot {
        session_type,
        date: date.to_string(),
        time: time_label.trim().to_string(),
        availability: 0,
        side: Side::Left,
    }
}

// Extract the time and date string from the page and split it into time and date.
fn get_time_data(day_date: &str) -> Time {
    // "12th November 2021 at 9:00 AM"
    match day_date.split_once(DATE_TIME_SEPARATOR) {
        Some((date, time)) => Time {
            date: date.to_string(),
            time: time.to_string(),
        },
        None => Time {
            date: day_date.to_string(),
            time: String::new(),
        },
    }
}

/// Maps the raw remaining-capacity values onto slots. The left side is
/// always shown first on the page, so index 0 is left and the rest right.
pub fn build_day_data(availability: &[String], time_slot: &str, session_type: SessionType) -> Vec<Slot> {
    let time_data = get_time_data(time_slot);
    availability
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let side = if index == 0 { Side::Left } else { Side::Right };
            Slot {
                session_type,
                date: time_data.date.clone(),
                time: time_data.time.clone(),
                availability: value.trim().parse().unwrap_or(0),
                side,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn splits_display_string_on_at() {
        let time = get_time_data("12th November 2021 at 9:00 AM");
        assert_eq!(time.date, "12th November 2021");
        assert_eq!(time.time, "9:00 AM");
    }

    #[test]
    fn keeps_whole_string_as_date_without_separator() {
        let time = get_time_data("12th November 2021");
        assert_eq!(time.date, "12th November 2021");
        assert_eq!(time.time, "");
    }

    #[test]
    fn first_capacity_is_left_side_rest_right() {
        let slots = build_day_data(
            &strings(&["5", "0", "3"]),
            "12th November 2021 at 9:00 AM",
            SessionType::Advanced,
        );
        assert_eq!(slots.len(), 3);
        assert_eq!(
            slots[0],
            Slot {
                session_type: SessionType::Advanced,
                date: "12th November 2021".to_string(),
                time: "9:00 AM".to_string(),
                availability: 5,
                side: Side::Left,
            }
        );
        assert_eq!(slots[1].availability, 0);
        assert_eq!(slots[1].side, Side::Right);
        assert_eq!(slots[2].availability, 3);
        assert_eq!(slots[2].side, Side::Right);
        assert_eq!(slots[1].date, "12th November 2021");
        assert_eq!(slots[2].time, "9:00 AM");
    }

    #[test]
    fn unparseable_capacity_counts_as_zero() {
        let slots = build_day_data(
            &strings(&["", "n/a", " 7 "]),
            "3rd May 2022 at 2:30 PM",
            SessionType::Beginner,
        );
        assert_eq!(slots[0].availability, 0);
        assert_eq!(slots[1].availability, 0);
        assert_eq!(slots[2].availability, 7);
    }

    #[test]
    fn no_capacity_inputs_means_no_slots() {
        let slots = build_day_data(&[], "3rd May 2022 at 2:30 PM", SessionType::Advanced);
        assert!(slots.is_empty());
    }

    #[test]
    fn sold_out_form_yields_single_left_placeholder() {
        let slot = sold_out_slot(SessionType::Advanced, "2021-11-12", " 9:00 AM ");
        assert_eq!(slot.availability, 0);
        assert_eq!(slot.side, Side::Left);
        assert_eq!(slot.time, "9:00 AM");
        assert_eq!(slot.date, "2021-11-12");
    }
}
