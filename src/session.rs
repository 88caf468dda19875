use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// One bookable surf session category on the booking site. Each variant
/// maps to its own page under the booking base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionType {
    Advanced,
    Intermediate,
    #[serde(rename = "Advanced Plus")]
    AdvancedPlus,
    #[serde(rename = "Expert Barrels")]
    ExpertBarrels,
    #[serde(rename = "Expert Turns")]
    ExpertTurns,
    Waikiki,
    Beginner,
    #[serde(rename = "Beginner Lesson")]
    BeginnerLesson,
}

impl SessionType {
    /// Path (and query, for the generic event pages) under the booking
    /// site base URL.
    pub fn url_path(&self) -> &'static str {
        match self {
            SessionType::Advanced => "advanced.html",
            SessionType::Intermediate => "pool.html",
            SessionType::AdvancedPlus => "lessonpool.html",
            SessionType::ExpertBarrels => "genericevent.html?event=TWB.EVN17",
            SessionType::ExpertTurns => "genericevent.html?event=TWB.EVN10",
            SessionType::Waikiki => "genericevent.html?event=TWB.EVN12",
            SessionType::Beginner => "genericevent.html?event=TWB.EVN13",
            SessionType::BeginnerLesson => "lesson.html",
        }
    }

    pub fn booking_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.url_path())
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Advanced => "Advanced",
            SessionType::Intermediate => "Intermediate",
            SessionType::AdvancedPlus => "Advanced Plus",
            SessionType::ExpertBarrels => "Expert Barrels",
            SessionType::ExpertTurns => "Expert Turns",
            SessionType::Waikiki => "Waikiki",
            SessionType::Beginner => "Beginner",
            SessionType::BeginnerLesson => "Beginner Lesson",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '_'], "-").as_str() {
            "advanced" => Ok(SessionType::Advanced),
            "intermediate" => Ok(SessionType::Intermediate),
            "advanced-plus" | "advancedplus" => Ok(SessionType::AdvancedPlus),
            "expert-barrels" | "expertbarrels" => Ok(SessionType::ExpertBarrels),
            "expert-turns" | "expertturns" => Ok(SessionType::ExpertTurns),
            "waikiki" => Ok(SessionType::Waikiki),
            "beginner" => Ok(SessionType::Beginner),
            "beginner-lesson" | "beginnerlesson" => Ok(SessionType::BeginnerLesson),
            other => Err(format!("unknown session type: {other}")),
        }
    }
}

/// Which side of the lake the slot is on. The booking page always lists
/// the left side first, so list position decides the side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One concrete time-and-side booking option with its remaining capacity.
///
/// The serialized field names are the wire format consumers of the output
/// file already rely on, misspelling included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    #[serde(rename = "sessionType")]
    pub session_type: SessionType,
    pub date: String,
    pub time: String,
    #[serde(rename = "availiability")]
    pub availability: u32,
    pub side: Side,
}

/// All slots discovered for the scraped days, the root of the output file.
#[derive(Debug, Default, Serialize)]
pub struct DayData {
    pub sessions: Vec<Slot>,
}

/// One cell of the booking calendar widget, read straight off the page.
/// Only kept long enough to filter on the `available` class token.
#[derive(Debug, Clone)]
pub struct CalendarDay {
    pub class_names: String,
    pub date: String,
    pub session_type: SessionType,
}

impl CalendarDay {
    /// The site marks bookable cells with an `available` class. Matched as
    /// a whole token so `unavailable`-style classes can never slip through.
    pub fn is_available(&self) -> bool {
        self.class_names
            .split_whitespace()
            .any(|token| token == "available")
    }
}

/// The `"12th November 2021 at 9:00 AM"` display string split in two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Time {
    pub date: String,
    pub time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_type_booking_urls() {
        let base = "https://bookings.thewave.com/twb_b2c";
        assert_eq!(
            SessionType::Advanced.booking_url(base),
            "https://bookings.thewave.com/twb_b2c/advanced.html"
        );
        assert_eq!(
            SessionType::ExpertBarrels.booking_url(base),
            "https://bookings.thewave.com/twb_b2c/genericevent.html?event=TWB.EVN17"
        );
        // A trailing slash on the base must not double up.
        assert_eq!(
            SessionType::Intermediate.booking_url("https://example.com/"),
            "https://example.com/pool.html"
        );
    }

    #[test]
    fn session_type_from_str() {
        assert_eq!("advanced".parse(), Ok(SessionType::Advanced));
        assert_eq!("Beginner Lesson".parse(), Ok(SessionType::BeginnerLesson));
        assert_eq!("expert-turns".parse(), Ok(SessionType::ExpertTurns));
        assert!("kitesurfing".parse::<SessionType>().is_err());
    }

    #[test]
    fn available_is_matched_as_a_token() {
        let day = |class_names: &str| CalendarDay {
            class_names: class_names.to_string(),
            date: "2021-11-12".to_string(),
            session_type: SessionType::Advanced,
        };
        assert!(day("day available").is_available());
        assert!(!day("day disabled").is_available());
        assert!(day("day available soldout").is_available());
        assert!(!day("day unavailable").is_available());
    }

    #[test]
    fn slot_serializes_with_wire_field_names() {
        let slot = Slot {
            session_type: SessionType::AdvancedPlus,
            date: "12th November 2021".to_string(),
            time: "9:00 AM".to_string(),
            availability: 5,
            side: Side::Left,
        };
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["sessionType"], "Advanced Plus");
        assert_eq!(json["availiability"], 5);
        assert_eq!(json["side"], "left");
    }
}
