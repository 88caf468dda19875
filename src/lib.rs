mod browser;
mod calendar_scraper;
mod config;
mod date_utils;
mod day_scraper;
mod session;
mod slot_scraper;

pub use browser::BrowserSession;
pub use calendar_scraper::CalendarScraper;
pub use config::ScrapeConfig;
pub use date_utils::{default_end_date, get_date, parse_date, today};
pub use day_scraper::{DayScraper, collect_sessions};
pub use session::{CalendarDay, DayData, SessionType, Side, Slot};
pub use slot_scraper::{FetchOutcome, SlotScraper, build_day_data, sold_out_slot};
