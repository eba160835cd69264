//! Key-information extraction and calendar emission.
//!
//! A regex pass pulls notification-style items — scheduled meetings and
//! deadlines — out of a packed context string. The items feed two places:
//! the summarizer (optionally refined by the language model before being
//! prepended to a summary) and the calendar endpoint, which renders them as
//! an ICS document.

use std::sync::LazyLock;

use regex::Regex;

static MEETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(meeting|call|appointment|class) on (\d{4}-\d{2}-\d{2}) at (\d{2}:\d{2})")
        .expect("meeting regex")
});

static DEADLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)deadline\s+by\s+(\d{4}-\d{2}-\d{2})").expect("deadline regex"));

/// One extracted item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyItem {
    /// A scheduled event at a specific date and time.
    Meeting {
        /// `YYYY-MM-DD`.
        date: String,
        /// `HH:MM`.
        time: String,
    },
    /// A deadline on a date.
    Deadline {
        /// `YYYY-MM-DD`.
        date: String,
    },
}

impl KeyItem {
    /// Human-readable line, as shown in summaries.
    pub fn describe(&self) -> String {
        match self {
            Self::Meeting { date, time } => format!("Meeting scheduled on {date} at {time}"),
            Self::Deadline { date } => format!("Deadline by {date}"),
        }
    }

    fn dtstamp(&self) -> String {
        match self {
            Self::Meeting { date, time } => {
                format!("{}T{}00", date.replace('-', ""), time.replace(':', ""))
            }
            Self::Deadline { date } => format!("{}T000000", date.replace('-', "")),
        }
    }
}

/// Extract meetings and deadlines from a context string, in match order.
pub fn extract_key_items(text: &str) -> Vec<KeyItem> {
    let mut items = Vec::new();
    for capture in MEETING_RE.captures_iter(text) {
        items.push(KeyItem::Meeting {
            date: capture[2].to_owned(),
            time: capture[3].to_owned(),
        });
    }
    for capture in DEADLINE_RE.captures_iter(text) {
        items.push(KeyItem::Deadline {
            date: capture[1].to_owned(),
        });
    }
    items
}

/// Extracted items as the bullet list handed to the refinement prompt.
pub fn describe_items(items: &[KeyItem]) -> String {
    items
        .iter()
        .map(KeyItem::describe)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render items as an ICS calendar document.
///
/// One all-day-style VEVENT per item; an empty item list still yields a
/// valid empty calendar.
pub fn to_ics(items: &[KeyItem]) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_owned(),
        "VERSION:2.0".to_owned(),
        "PRODID:-//braid//conversation key info//EN".to_owned(),
    ];
    for item in items {
        let stamp = item.dtstamp();
        lines.push("BEGIN:VEVENT".to_owned());
        lines.push(format!("SUMMARY:{}", item.describe()));
        lines.push(format!("DTSTART:{stamp}"));
        lines.push(format!("DTEND:{stamp}"));
        lines.push("END:VEVENT".to_owned());
    }
    lines.push("END:VCALENDAR".to_owned());
    // ICS wants CRLF line endings
    lines.join("\r\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_meeting_with_date_and_time() {
        let items = extract_key_items("ada: lets have a meeting on 2026-03-15 at 14:30 ok?");
        assert_eq!(
            items,
            vec![KeyItem::Meeting {
                date: "2026-03-15".into(),
                time: "14:30".into(),
            }]
        );
    }

    #[test]
    fn extracts_all_event_words() {
        let text = "call on 2026-01-01 at 09:00 and class on 2026-01-02 at 10:00";
        let items = extract_key_items(text);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn extraction_is_case_insensitive() {
        let items = extract_key_items("Meeting on 2026-03-15 at 14:30. DEADLINE by 2026-04-01");
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn extracts_deadline() {
        let items = extract_key_items("bob: deadline by 2026-04-01 for the report");
        assert_eq!(
            items,
            vec![KeyItem::Deadline {
                date: "2026-04-01".into()
            }]
        );
    }

    #[test]
    fn no_items_in_plain_chatter() {
        assert!(extract_key_items("ada: how was your weekend?").is_empty());
    }

    #[test]
    fn describe_lines() {
        let items = extract_key_items("meeting on 2026-03-15 at 14:30, deadline by 2026-04-01");
        let described = describe_items(&items);
        assert_eq!(
            described,
            "Meeting scheduled on 2026-03-15 at 14:30\nDeadline by 2026-04-01"
        );
    }

    #[test]
    fn ics_contains_events() {
        let items = extract_key_items("meeting on 2026-03-15 at 14:30");
        let ics = to_ics(&items);
        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.contains("DTSTART:20260315T143000"));
        assert!(ics.contains("SUMMARY:Meeting scheduled on 2026-03-15 at 14:30"));
        assert!(ics.ends_with("END:VCALENDAR"));
    }

    #[test]
    fn ics_deadline_is_midnight() {
        let ics = to_ics(&[KeyItem::Deadline {
            date: "2026-04-01".into(),
        }]);
        assert!(ics.contains("DTSTART:20260401T000000"));
    }

    #[test]
    fn empty_items_is_valid_empty_calendar() {
        let ics = to_ics(&[]);
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(!ics.contains("VEVENT"));
    }
}
