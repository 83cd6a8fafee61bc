use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use crate::domain::models::booking_link::{AvailabilityRule, BookingLink};
use crate::domain::models::interval::Interval;
use crate::domain::services::interval_merger::merge;

/// Picks the slot length for a request. `None` means the requested length is not
/// one the link offers.
pub fn resolve_duration(link: &BookingLink, requested: Option<i64>) -> Option<i64> {
    match requested {
        None => link.default_duration(),
        Some(minutes) if link.supports_duration(minutes) => Some(minutes),
        Some(_) => None,
    }
}

/// Expands the link's weekly rules into concrete bookable slots inside
/// `[range_start, range_end)`, dropping anything already started at `now` or
/// overlapping a busy period. The result is sorted by start.
pub fn generate_slots(
    link: &BookingLink,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    busy: &[Interval],
    duration_minutes: i64,
    now: DateTime<Utc>,
) -> Vec<Interval> {
    if duration_minutes <= 0 || range_end <= range_start {
        return Vec::new();
    }

    let tz = link.tz();
    let busy = merge(busy);
    let duration = Duration::minutes(duration_minutes);
    let step = Duration::minutes(duration_minutes + link.buffer_minutes.max(0));

    let first_day = range_start.with_timezone(&tz).date_naive();
    let last_day = range_end.with_timezone(&tz).date_naive();

    let mut slots = Vec::new();

    for day in first_day.iter_days().take_while(|d| *d <= last_day) {
        let weekday = day.weekday().num_days_from_sunday() as u8;

        for rule in link.availability_rules.iter().filter(|r| r.applies_to(weekday)) {
            let Some((window_start, window_end)) = anchor_window(&tz, day, rule) else {
                continue;
            };

            let mut cursor = window_start;
            while cursor + duration <= window_end {
                let candidate = Interval::new(cursor, cursor + duration);
                cursor += step;

                if candidate.start < now {
                    continue;
                }
                if candidate.start < range_start || candidate.end > range_end {
                    continue;
                }
                if busy.iter().any(|b| b.overlaps(&candidate)) {
                    continue;
                }
                slots.push(candidate);
            }
        }
    }

    slots.sort();
    slots.dedup();
    slots
}

/// True if `slot` sits inside some rule window on the weekday of its start,
/// evaluated in `tz`.
pub fn is_within_availability(slot: &Interval, rules: &[AvailabilityRule], tz: &Tz) -> bool {
    let local_start = slot.start.with_timezone(tz);
    let local_end = slot.end.with_timezone(tz);
    let weekday = local_start.weekday().num_days_from_sunday() as u8;

    // A slot spilling into the next day can never fit a single-day rule window.
    if local_start.date_naive() != local_end.date_naive() {
        return false;
    }

    // Zero-padded HH:MM strings order the same as the times they encode.
    let start_hhmm = local_start.format("%H:%M").to_string();
    let end_hhmm = local_end.format("%H:%M").to_string();

    rules.iter()
        .filter(|r| r.applies_to(weekday))
        .any(|r| start_hhmm.as_str() >= r.start_time.as_str() && end_hhmm.as_str() <= r.end_time.as_str())
}

fn anchor_window(tz: &Tz, day: NaiveDate, rule: &AvailabilityRule) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = rule.window()?;
    let start = localize(tz, day.and_time(start))?;
    let end = localize(tz, day.and_time(end))?;
    (start < end).then_some((start, end))
}

// Skipped local times (spring forward) yield None; repeated ones take the earlier instant.
fn localize(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::booking_link::NewBookingLinkParams;

    fn link(tz: &str, durations: Vec<i64>, buffer: i64, rules: Vec<AvailabilityRule>) -> BookingLink {
        BookingLink::new(NewBookingLinkParams {
            owner_id: "owner".into(),
            name: "Call".into(),
            description: String::new(),
            auto_confirm: false,
            slot_durations_minutes: durations,
            buffer_minutes: buffer,
            timezone: tz.into(),
            availability_rules: rules,
            custom_fields: vec![],
            event_template: None,
            meeting_link: None,
        })
    }

    fn rule(days: Vec<u8>, start: &str, end: &str) -> AvailabilityRule {
        AvailabilityRule { days_of_week: days, start_time: start.into(), end_time: end.into() }
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    // 2030-01-07 is a Monday.
    fn monday_range() -> (DateTime<Utc>, DateTime<Utc>) {
        (utc(2030, 1, 7, 0, 0), utc(2030, 1, 8, 0, 0))
    }

    fn long_ago() -> DateTime<Utc> {
        utc(2020, 1, 1, 0, 0)
    }

    #[test]
    fn monday_morning_yields_two_half_hour_slots() {
        let l = link("UTC", vec![30], 0, vec![rule(vec![1], "09:00", "10:00")]);
        let (start, end) = monday_range();

        let slots = generate_slots(&l, start, end, &[], 30, long_ago());

        assert_eq!(slots, vec![
            Interval::new(utc(2030, 1, 7, 9, 0), utc(2030, 1, 7, 9, 30)),
            Interval::new(utc(2030, 1, 7, 9, 30), utc(2030, 1, 7, 10, 0)),
        ]);
    }

    #[test]
    fn busy_period_straddling_both_slots_removes_them() {
        let l = link("UTC", vec![30], 0, vec![rule(vec![1], "09:00", "10:00")]);
        let (start, end) = monday_range();
        let busy = [Interval::new(utc(2030, 1, 7, 9, 15), utc(2030, 1, 7, 9, 45))];

        assert!(generate_slots(&l, start, end, &busy, 30, long_ago()).is_empty());
    }

    #[test]
    fn buffer_spaces_out_slots() {
        let l = link("UTC", vec![30], 15, vec![rule(vec![1], "09:00", "11:00")]);
        let (start, end) = monday_range();

        let starts: Vec<_> = generate_slots(&l, start, end, &[], 30, long_ago())
            .into_iter()
            .map(|s| s.start)
            .collect();

        assert_eq!(starts, vec![utc(2030, 1, 7, 9, 0), utc(2030, 1, 7, 9, 45), utc(2030, 1, 7, 10, 30)]);
    }

    #[test]
    fn slots_before_now_are_dropped() {
        let l = link("UTC", vec![30], 0, vec![rule(vec![1], "09:00", "10:00")]);
        let (start, end) = monday_range();

        let slots = generate_slots(&l, start, end, &[], 30, utc(2030, 1, 7, 9, 10));

        assert_eq!(slots, vec![Interval::new(utc(2030, 1, 7, 9, 30), utc(2030, 1, 7, 10, 0))]);
    }

    #[test]
    fn other_weekdays_produce_nothing() {
        let l = link("UTC", vec![30], 0, vec![rule(vec![2], "09:00", "10:00")]);
        let (start, end) = monday_range();
        assert!(generate_slots(&l, start, end, &[], 30, long_ago()).is_empty());
    }

    #[test]
    fn overlapping_rules_are_deduplicated_and_sorted() {
        let l = link("UTC", vec![30], 0, vec![
            rule(vec![1], "10:00", "11:00"),
            rule(vec![1], "09:00", "10:30"),
        ]);
        let (start, end) = monday_range();

        let slots = generate_slots(&l, start, end, &[], 30, long_ago());
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();

        assert_eq!(starts, vec![
            utc(2030, 1, 7, 9, 0),
            utc(2030, 1, 7, 9, 30),
            utc(2030, 1, 7, 10, 0),
            utc(2030, 1, 7, 10, 30),
        ]);
    }

    #[test]
    fn rules_are_anchored_in_the_link_timezone() {
        // Berlin is UTC+1 in January.
        let l = link("Europe/Berlin", vec![60], 0, vec![rule(vec![1], "09:00", "10:00")]);
        let slots = generate_slots(&l, utc(2030, 1, 6, 0, 0), utc(2030, 1, 9, 0, 0), &[], 60, long_ago());

        assert_eq!(slots, vec![Interval::new(utc(2030, 1, 7, 8, 0), utc(2030, 1, 7, 9, 0))]);
    }

    #[test]
    fn nonexistent_local_window_start_is_skipped() {
        // 2030-03-31 is a Sunday; Berlin jumps from 02:00 to 03:00.
        let l = link("Europe/Berlin", vec![30], 0, vec![rule(vec![0], "02:00", "04:00")]);
        let slots = generate_slots(&l, utc(2030, 3, 30, 0, 0), utc(2030, 4, 1, 0, 0), &[], 30, long_ago());
        assert!(slots.is_empty());
    }

    #[test]
    fn generated_slots_respect_the_rules_and_busy_time() {
        let rules = vec![rule(vec![1, 3, 5], "08:00", "12:30"), rule(vec![3], "14:00", "17:00")];
        let l = link("America/New_York", vec![45], 10, rules.clone());
        let busy = [
            Interval::new(utc(2030, 1, 9, 15, 0), utc(2030, 1, 9, 16, 0)),
            Interval::new(utc(2030, 1, 9, 15, 30), utc(2030, 1, 9, 17, 0)),
        ];
        let slots = generate_slots(&l, utc(2030, 1, 6, 0, 0), utc(2030, 1, 13, 0, 0), &busy, 45, long_ago());

        assert!(!slots.is_empty());
        for slot in &slots {
            assert!(is_within_availability(slot, &rules, &l.tz()));
            assert!(busy.iter().all(|b| !b.overlaps(slot)));
            assert_eq!(slot.duration_minutes(), 45);
        }
        assert!(slots.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn within_availability_uses_the_start_weekday() {
        let rules = vec![rule(vec![1], "09:00", "10:00")];
        let tz = chrono_tz::UTC;

        let inside = Interval::new(utc(2030, 1, 7, 9, 0), utc(2030, 1, 7, 10, 0));
        let late = Interval::new(utc(2030, 1, 7, 9, 30), utc(2030, 1, 7, 10, 30));
        let tuesday = Interval::new(utc(2030, 1, 8, 9, 0), utc(2030, 1, 8, 9, 30));

        assert!(is_within_availability(&inside, &rules, &tz));
        assert!(!is_within_availability(&late, &rules, &tz));
        assert!(!is_within_availability(&tuesday, &rules, &tz));
    }

    #[test]
    fn duration_resolution() {
        let l = link("UTC", vec![30, 60], 0, vec![]);
        assert_eq!(resolve_duration(&l, None), Some(30));
        assert_eq!(resolve_duration(&l, Some(60)), Some(60));
        assert_eq!(resolve_duration(&l, Some(45)), None);
    }
}
