//! Calendar-day grouping of mixed task/event records.

use crate::model::event::Event;
use crate::model::record::RecordId;
use crate::model::task::Task;
use crate::model::time::epoch_ms_to_zoned;
use chrono::{DateTime, Local, TimeZone};

/// Display bucket relative to the reference day.
///
/// Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayBucket {
    Yesterday,
    Today,
    Tomorrow,
    Others,
}

impl DayBucket {
    pub const ALL: [DayBucket; 4] = [
        DayBucket::Yesterday,
        DayBucket::Today,
        DayBucket::Tomorrow,
        DayBucket::Others,
    ];

    /// Stable machine key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Yesterday => "yesterday",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::Others => "others",
        }
    }
}

/// One agenda entry. Tasks and events share buckets but keep their own
/// fields untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaItem {
    Task(Task),
    Event(Event),
}

impl AgendaItem {
    pub fn id(&self) -> RecordId {
        match self {
            Self::Task(task) => task.id,
            Self::Event(event) => event.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Task(task) => &task.title,
            Self::Event(event) => &event.title,
        }
    }

    /// `Task.date` for tasks, `Event.start_date` for events.
    pub fn comparison_date(&self) -> Option<i64> {
        match self {
            Self::Task(task) => task.date,
            Self::Event(event) => event.start_date,
        }
    }

    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Self::Task(task) => Some(task),
            Self::Event(_) => None,
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Self::Event(event) => Some(event),
            Self::Task(_) => None,
        }
    }
}

/// Bucketed agenda. Buckets iterate in `DayBucket::ALL` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedAgenda {
    buckets: [Vec<AgendaItem>; 4],
    skipped: usize,
}

impl GroupedAgenda {
    pub fn get(&self, bucket: DayBucket) -> &[AgendaItem] {
        &self.buckets[bucket as usize]
    }

    /// All four buckets, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (DayBucket, &[AgendaItem])> + '_ {
        DayBucket::ALL
            .into_iter()
            .map(move |bucket| (bucket, self.get(bucket)))
    }

    /// Non-empty buckets only, in display order.
    pub fn sections(&self) -> impl Iterator<Item = (DayBucket, &[AgendaItem])> + '_ {
        self.iter().filter(|(_, items)| !items.is_empty())
    }

    /// Number of bucketed records.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records excluded for a missing or unrepresentable comparison date.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn push(&mut self, bucket: DayBucket, item: AgendaItem) {
        self.buckets[bucket as usize].push(item);
    }
}

/// Classifies one instant against the calendar day of `now`.
///
/// Days are compared in `now`'s time zone. Returns `None` when `epoch_ms`
/// cannot be represented.
pub fn classify_day<Tz: TimeZone>(epoch_ms: i64, now: &DateTime<Tz>) -> Option<DayBucket> {
    let day = epoch_ms_to_zoned(epoch_ms, &now.timezone())?.date_naive();
    let today = now.date_naive();

    let bucket = if Some(day) == today.pred_opt() {
        DayBucket::Yesterday
    } else if day == today {
        DayBucket::Today
    } else if Some(day) == today.succ_opt() {
        DayBucket::Tomorrow
    } else {
        DayBucket::Others
    };
    Some(bucket)
}

/// Groups tasks then events by calendar day relative to `now`.
///
/// Within each bucket tasks keep their input order and precede events,
/// which keep theirs.
pub fn group_by_day<Tz: TimeZone>(
    tasks: &[Task],
    events: &[Event],
    now: &DateTime<Tz>,
) -> GroupedAgenda {
    let items = tasks
        .iter()
        .cloned()
        .map(AgendaItem::Task)
        .chain(events.iter().cloned().map(AgendaItem::Event));

    let mut grouped = GroupedAgenda::default();
    for item in items {
        match item
            .comparison_date()
            .and_then(|epoch_ms| classify_day(epoch_ms, now))
        {
            Some(bucket) => grouped.push(bucket, item),
            None => grouped.skipped += 1,
        }
    }
    grouped
}

/// Groups against the current wall-clock time in the local time zone.
pub fn group_by_day_now(tasks: &[Task], events: &[Event]) -> GroupedAgenda {
    group_by_day(tasks, events, &Local::now())
}

#[cfg(test)]
mod tests {
    use super::{classify_day, group_by_day, AgendaItem, DayBucket};
    use crate::model::event::Event;
    use crate::model::task::Task;
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

    fn tz() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
    }

    fn ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        at(y, m, d, h, min).timestamp_millis()
    }

    fn task(title: &str, date: Option<i64>) -> Task {
        let mut task = Task::new(title, 0, 0);
        task.date = date;
        task
    }

    fn event(title: &str, start: Option<i64>) -> Event {
        let mut event = Event::new(title, 0, 0);
        event.start_date = start;
        event
    }

    #[test]
    fn reference_examples_land_in_expected_buckets() {
        let now = at(2024, 6, 15, 12, 0);
        let tasks = vec![
            task("yesterday", Some(ms(2024, 6, 14, 9, 0))),
            task("late today", Some(ms(2024, 6, 15, 23, 59))),
            task("later", Some(ms(2024, 6, 20, 0, 0))),
        ];
        let events = vec![event("just after midnight", Some(ms(2024, 6, 16, 0, 1)))];

        let grouped = group_by_day(&tasks, &events, &now);

        assert_eq!(grouped.get(DayBucket::Yesterday)[0].title(), "yesterday");
        assert_eq!(grouped.get(DayBucket::Today)[0].title(), "late today");
        assert_eq!(
            grouped.get(DayBucket::Tomorrow)[0].title(),
            "just after midnight"
        );
        assert_eq!(grouped.get(DayBucket::Others)[0].title(), "later");
        assert_eq!(grouped.len(), 4);
        assert_eq!(grouped.skipped(), 0);
    }

    #[test]
    fn calendar_day_not_elapsed_hours_decides_bucket() {
        let now = at(2024, 6, 15, 0, 5);
        // 10 minutes earlier, but on the previous calendar day.
        assert_eq!(
            classify_day(ms(2024, 6, 14, 23, 55), &now),
            Some(DayBucket::Yesterday)
        );
        // 47 hours later but still on the next calendar day.
        assert_eq!(
            classify_day(ms(2024, 6, 16, 23, 5), &now),
            Some(DayBucket::Tomorrow)
        );
        assert_eq!(
            classify_day(ms(2024, 6, 17, 0, 0), &now),
            Some(DayBucket::Others)
        );
    }

    #[test]
    fn day_is_computed_in_reference_time_zone() {
        // 2024-06-16T01:00Z is still June 15 at UTC-3.
        let utc_instant = chrono::Utc
            .with_ymd_and_hms(2024, 6, 16, 1, 0, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        let now = at(2024, 6, 15, 12, 0);
        assert_eq!(classify_day(utc_instant, &now), Some(DayBucket::Today));
    }

    #[test]
    fn month_and_year_boundaries_use_calendar_arithmetic() {
        let now = at(2025, 1, 1, 8, 0);
        assert_eq!(
            classify_day(ms(2024, 12, 31, 22, 0), &now),
            Some(DayBucket::Yesterday)
        );
        let now = at(2024, 2, 28, 8, 0);
        assert_eq!(
            classify_day(ms(2024, 2, 29, 8, 0), &now),
            Some(DayBucket::Tomorrow)
        );
    }

    #[test]
    fn missing_and_unrepresentable_dates_are_skipped_not_others() {
        let now = at(2024, 6, 15, 12, 0);
        let tasks = vec![task("undated", None), task("overflow", Some(i64::MAX))];
        let events = vec![event("no start", None)];

        let grouped = group_by_day(&tasks, &events, &now);

        assert!(grouped.is_empty());
        assert!(grouped.get(DayBucket::Others).is_empty());
        assert_eq!(grouped.skipped(), 3);
    }

    #[test]
    fn dates_past_the_local_calendar_range_are_skipped() {
        let far_east = FixedOffset::east_opt(14 * 3600).unwrap();
        let now = far_east.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).single().unwrap();
        let max = DateTime::<Utc>::MAX_UTC.timestamp_millis();
        assert_eq!(classify_day(max, &now), None);

        let far_west = FixedOffset::west_opt(12 * 3600).unwrap();
        let now = far_west.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).single().unwrap();
        let tasks = vec![
            task("edge", Some(DateTime::<Utc>::MIN_UTC.timestamp_millis())),
            task("normal", Some(now.timestamp_millis())),
        ];

        let grouped = group_by_day(&tasks, &[], &now);

        assert_eq!(grouped.skipped(), 1);
        assert_eq!(grouped.get(DayBucket::Today)[0].title(), "normal");
        assert_eq!(grouped.len(), 1);
    }

    #[test]
    fn buckets_keep_tasks_before_events_in_input_order() {
        let now = at(2024, 6, 15, 12, 0);
        let today = ms(2024, 6, 15, 10, 0);
        let tasks = vec![task("t1", Some(today)), task("t2", Some(today))];
        let events = vec![event("e1", Some(today)), event("e2", Some(today))];

        let grouped = group_by_day(&tasks, &events, &now);
        let titles: Vec<_> = grouped
            .get(DayBucket::Today)
            .iter()
            .map(AgendaItem::title)
            .collect();
        assert_eq!(titles, vec!["t1", "t2", "e1", "e2"]);
    }

    #[test]
    fn mixed_bucket_preserves_type_specific_fields() {
        let now = at(2024, 6, 15, 12, 0);
        let mut done = task("done", Some(ms(2024, 6, 15, 8, 0)));
        done.is_completed = true;
        let mut all_day = event("holiday", Some(ms(2024, 6, 15, 0, 0)));
        all_day.is_all_day = true;

        let grouped = group_by_day(&[done.clone()], &[all_day.clone()], &now);
        let today = grouped.get(DayBucket::Today);

        assert_eq!(today[0].as_task(), Some(&done));
        assert_eq!(today[1].as_event(), Some(&all_day));
        assert!(today[0].as_task().unwrap().is_completed);
        assert!(today[1].as_event().unwrap().is_all_day);
    }

    #[test]
    fn sections_skip_empty_buckets_in_display_order() {
        let now = at(2024, 6, 15, 12, 0);
        let tasks = vec![
            task("far", Some(ms(2024, 7, 1, 9, 0))),
            task("past", Some(ms(2024, 6, 14, 9, 0))),
        ];

        let grouped = group_by_day(&tasks, &[], &now);
        let order: Vec<_> = grouped.sections().map(|(bucket, _)| bucket).collect();
        assert_eq!(order, vec![DayBucket::Yesterday, DayBucket::Others]);
        assert_eq!(grouped.iter().count(), 4);
    }

    #[test]
    fn grouping_is_idempotent_and_order_independent_per_record() {
        let now = at(2024, 6, 15, 12, 0);
        let tasks: Vec<_> = (0..10)
            .map(|offset| {
                let day = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap() + chrono::Days::new(offset);
                let start = tz()
                    .from_local_datetime(&day.and_hms_opt(9, 0, 0).unwrap())
                    .single()
                    .unwrap()
                    .timestamp_millis();
                task(&format!("t{offset}"), Some(start))
            })
            .collect();

        let first = group_by_day(&tasks, &[], &now);
        let second = group_by_day(&tasks, &[], &now);
        assert_eq!(first, second);

        let mut reversed = tasks.clone();
        reversed.reverse();
        let reordered = group_by_day(&reversed, &[], &now);
        for (bucket, items) in first.iter() {
            let mut expected: Vec<_> = items.iter().map(AgendaItem::id).collect();
            let mut actual: Vec<_> = reordered.get(bucket).iter().map(AgendaItem::id).collect();
            expected.sort();
            actual.sort();
            assert_eq!(expected, actual, "bucket {}", bucket.key());
        }
    }
}
