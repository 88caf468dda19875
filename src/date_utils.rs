use chrono::{Duration, Local, NaiveDate, ParseResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn get_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(date_string: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(date_string, DATE_FORMAT)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn default_end_date() -> NaiveDate {
    today() + Duration::days(30)
}
