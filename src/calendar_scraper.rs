use std::time::Duration;

use log::info;
use thirtyfour::prelude::*;
use tokio::time::sleep;

use crate::browser::BrowserSession;
use crate::config::ScrapeConfig;
use crate::session::{CalendarDay, SessionType};

const CALENDAR_CELLS: &str = ".datepicker-days td";
// Only forms inside the daybox that is actually shown belong to the
// selected date; the others are hidden with d-none.
const VISIBLE_SESSION_FORMS: &str =
    "div#calendar-dp div:not(.d-none).daybox ul.calendar-time form";

const SELECTOR_WAIT: Duration = Duration::from_secs(10);
const SELECTOR_POLL: Duration = Duration::from_millis(250);
// The widget re-renders the session list shortly after a date is clicked.
const RENDER_PAUSE: Duration = Duration::from_millis(500);

/// Reads the booking calendar widget for one session type.
#[derive(Debug)]
pub struct CalendarScraper {
    pub session_type: SessionType,
    config: ScrapeConfig,
}

impl CalendarScraper {
    pub fn new(session_type: SessionType, config: ScrapeConfig) -> Self {
        Self {
            session_type,
            config,
        }
    }

    fn booking_url(&self) -> String {
        self.session_type.booking_url(&self.config.booking_base_url)
    }

    /// Every day cell the calendar currently shows, with its CSS class list
    /// and `data-date` attribute. Filtering happens at the caller.
    pub async fn scrape_month(&self) -> anyhow::Result<Vec<CalendarDay>> {
        let session = BrowserSession::launch(&self.config).await?;
        let result = self.scrape_month_on(session.driver()).await;
        session.close().await?;
        result
    }

    async fn scrape_month_on(&self, driver: &WebDriver) -> anyhow::Result<Vec<CalendarDay>> {
        driver.goto(self.booking_url()).await?;
        wait_for(driver, CALENDAR_CELLS).await?;

        let cells = driver.find_all(By::Css(CALENDAR_CELLS)).await?;
        let mut days = Vec::with_capacity(cells.len());
        for cell in cells {
            let class_names = cell.attr("class").await?.unwrap_or_default();
            let date = cell.attr("data-date").await?.unwrap_or_default();
            days.push(CalendarDay {
                class_names,
                date,
                session_type: self.session_type,
            });
        }
        info!(
            "calendar for {} lists {} day cells",
            self.session_type,
            days.len()
        );
        Ok(days)
    }

    /// Selects `date` on the calendar and returns the element ids of the
    /// session forms rendered for it, in page order (may be empty).
    pub async fn scan_day(&self, date: &str) -> anyhow::Result<Vec<String>> {
        let session = BrowserSession::launch(&self.config).await?;
        let result = self.scan_day_on(session.driver(), date).await;
        session.close().await?;
        result
    }

    async fn scan_day_on(&self, driver: &WebDriver, date: &str) -> anyhow::Result<Vec<String>> {
        driver.goto(self.booking_url()).await?;

        let date_cell = wait_for(driver, &format!(r#"td[data-date="{date}"]"#)).await?;
        date_cell.click().await?;
        sleep(RENDER_PAUSE).await;

        let forms = driver.find_all(By::Css(VISIBLE_SESSION_FORMS)).await?;
        let mut form_ids = Vec::with_capacity(forms.len());
        for form in forms {
            if let Some(id) = form.attr("id").await? {
                form_ids.push(id);
            }
        }
        info!("{date}: found session forms {form_ids:?}");
        Ok(form_ids)
    }
}

/// Polls until the selector matches, erroring out after the fixed wait.
pub(crate) async fn wait_for(driver: &WebDriver, css: &str) -> anyhow::Result<WebElement> {
    let element = driver
        .query(By::Css(css))
        .wait(SELECTOR_WAIT, SELECTOR_POLL)
        .first()
        .await?;
    Ok(element)
}
