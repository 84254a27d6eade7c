//! Presentation model for agenda sections and item cards.
//!
//! Pure formatting only: no widgets, no styling.

use crate::agenda::group::{AgendaItem, DayBucket, GroupedAgenda};
use crate::model::record::RecordId;
use crate::model::time::epoch_ms_to_zoned;
use chrono::TimeZone;
use std::fmt::Display;

/// Message shown when the agenda has nothing to display.
pub const EMPTY_AGENDA_MESSAGE: &str = "No tasks";

const SUBTITLE_DATE_FORMAT: &str = "%a, %b %-d, %Y";
const CARD_TIME_FORMAT: &str = "%H:%M";

impl DayBucket {
    /// Section heading.
    pub fn title(self) -> &'static str {
        match self {
            Self::Yesterday => "Yesterday",
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
            Self::Others => "Other days",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBadge {
    Completed,
    Pending,
    AllDay,
    Timed,
}

impl CardBadge {
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Pending => "Pending",
            Self::AllDay => "All day",
            Self::Timed => "Timed",
        }
    }
}

/// Summary of one agenda item as shown on its card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSummary {
    pub id: RecordId,
    pub title: String,
    /// Date line, e.g. `Sat, Jun 15, 2024`, plus a time range for timed
    /// events.
    pub subtitle: String,
    pub badge: CardBadge,
    pub has_note: bool,
    pub has_attachment: bool,
}

/// One rendered bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub bucket: DayBucket,
    pub title: &'static str,
    pub cards: Vec<CardSummary>,
}

/// Formats an instant as the card date line in `tz`.
pub fn format_card_date<Tz>(epoch_ms: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    epoch_ms_to_zoned(epoch_ms, tz).map(|zoned| zoned.format(SUBTITLE_DATE_FORMAT).to_string())
}

fn format_clock<Tz>(epoch_ms: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    epoch_ms_to_zoned(epoch_ms, tz).map(|zoned| zoned.format(CARD_TIME_FORMAT).to_string())
}

/// Builds the card summary for one item.
pub fn card_summary<Tz>(item: &AgendaItem, tz: &Tz) -> CardSummary
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let date_line = item
        .comparison_date()
        .and_then(|epoch_ms| format_card_date(epoch_ms, tz))
        .unwrap_or_default();

    match item {
        AgendaItem::Task(task) => CardSummary {
            id: task.id,
            title: task.title.clone(),
            subtitle: date_line,
            badge: if task.is_completed {
                CardBadge::Completed
            } else {
                CardBadge::Pending
            },
            has_note: task.note.is_some(),
            has_attachment: task.attachment_url.is_some(),
        },
        AgendaItem::Event(event) => {
            let (badge, subtitle) = if event.is_all_day {
                (CardBadge::AllDay, date_line)
            } else {
                let start = event.start_date.and_then(|ms| format_clock(ms, tz));
                let end = event.end_date.and_then(|ms| format_clock(ms, tz));
                let subtitle = match (start, end) {
                    (Some(start), Some(end)) => format!("{date_line} {start}-{end}"),
                    (Some(start), None) => format!("{date_line} {start}"),
                    _ => date_line,
                };
                (CardBadge::Timed, subtitle)
            };
            CardSummary {
                id: event.id,
                title: event.title.clone(),
                subtitle,
                badge,
                has_note: event.note.is_some(),
                has_attachment: false,
            }
        }
    }
}

/// Renders non-empty buckets into sections, in display order.
pub fn render_sections<Tz>(grouped: &GroupedAgenda, tz: &Tz) -> Vec<SectionView>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    grouped
        .sections()
        .map(|(bucket, items)| SectionView {
            bucket,
            title: bucket.title(),
            cards: items.iter().map(|item| card_summary(item, tz)).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{card_summary, format_card_date, render_sections, CardBadge};
    use crate::agenda::group::{group_by_day, AgendaItem, DayBucket};
    use crate::model::event::Event;
    use crate::model::task::Task;
    use chrono::{FixedOffset, TimeZone};

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn ms(d: u32, h: u32, min: u32) -> i64 {
        tz().with_ymd_and_hms(2024, 6, d, h, min, 0)
            .single()
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn card_date_uses_abbreviated_weekday_and_month() {
        assert_eq!(
            format_card_date(ms(15, 9, 0), &tz()).as_deref(),
            Some("Sat, Jun 15, 2024")
        );
        assert_eq!(
            format_card_date(ms(3, 9, 0), &tz()).as_deref(),
            Some("Mon, Jun 3, 2024")
        );
    }

    #[test]
    fn task_card_reflects_completion_and_extras() {
        let mut task = Task::new("Pay rent", ms(15, 9, 0), 0);
        task.is_completed = true;
        task.attachment_url = Some("https://files.example.com/receipt.pdf".to_string());

        let card = card_summary(&AgendaItem::Task(task), &tz());
        assert_eq!(card.badge, CardBadge::Completed);
        assert_eq!(card.subtitle, "Sat, Jun 15, 2024");
        assert!(card.has_attachment);
        assert!(!card.has_note);
    }

    #[test]
    fn timed_event_card_shows_range_and_all_day_does_not() {
        let mut meeting = Event::new("Standup", ms(15, 9, 0), 0);
        meeting.end_date = Some(ms(15, 9, 30));
        let card = card_summary(&AgendaItem::Event(meeting), &tz());
        assert_eq!(card.badge, CardBadge::Timed);
        assert_eq!(card.subtitle, "Sat, Jun 15, 2024 09:00-09:30");

        let mut holiday = Event::new("Holiday", ms(15, 0, 0), 0);
        holiday.is_all_day = true;
        let card = card_summary(&AgendaItem::Event(holiday), &tz());
        assert_eq!(card.badge, CardBadge::AllDay);
        assert_eq!(card.subtitle, "Sat, Jun 15, 2024");
        assert_eq!(card.badge.label(), "All day");
    }

    #[test]
    fn sections_carry_titles_and_cards() {
        let now = tz().with_ymd_and_hms(2024, 6, 15, 12, 0, 0).single().unwrap();
        let tasks = vec![Task::new("Today", ms(15, 8, 0), 0)];
        let events = vec![Event::new("Tomorrow", ms(16, 8, 0), 0)];

        let sections = render_sections(&group_by_day(&tasks, &events, &now), &tz());
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].bucket, DayBucket::Today);
        assert_eq!(sections[0].title, "Today");
        assert_eq!(sections[1].title, "Tomorrow");
        assert_eq!(sections[1].cards[0].title, "Tomorrow");
        assert_eq!(DayBucket::Others.title(), "Other days");
    }
}
