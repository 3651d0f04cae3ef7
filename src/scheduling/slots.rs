use crate::database::models::DayWindow;
use crate::scheduling::time::{Interval, MINUTES_PER_DAY, TimeOfDay};

/// Candidate start times are offered at every hour boundary rather than
/// packed back-to-back, so callers keep finer-grained start-time choice.
pub const SLOT_STEP_MINUTES: u16 = 60;

/// Lazy, finite iterator over bookable `[start, end)` windows of a fixed
/// duration within one day's working hours, skipping candidates that overlap
/// an already-booked interval. `Clone` restarts the walk from the beginning.
#[derive(Debug, Clone)]
pub struct AvailableSlots {
    window: DayWindow,
    duration_minutes: u16,
    booked: Vec<Interval>,
    cursor: TimeOfDay,
}

impl AvailableSlots {
    pub fn new(window: DayWindow, duration_minutes: u16, booked: Vec<Interval>) -> Self {
        AvailableSlots {
            window,
            duration_minutes,
            booked,
            cursor: window.start,
        }
    }

    /// An iterator that yields nothing, for days that take no bookings.
    pub fn none() -> Self {
        let midnight = TimeOfDay::from_minutes(0);
        AvailableSlots {
            window: DayWindow {
                start: midnight,
                end: midnight,
            },
            duration_minutes: 0,
            booked: Vec::new(),
            cursor: midnight,
        }
    }

    /// Rewinds the walk to the start of the working-hours window.
    pub fn reset(&mut self) {
        self.cursor = self.window.start;
    }
}

impl Iterator for AvailableSlots {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        if self.duration_minutes == 0 {
            return None;
        }

        loop {
            let start = self.cursor;
            let end_minutes = start.minutes() as u32 + self.duration_minutes as u32;
            if end_minutes > self.window.end.minutes() as u32 {
                return None;
            }

            let next_cursor =
                (start.minutes() as u32 + SLOT_STEP_MINUTES as u32).min(MINUTES_PER_DAY as u32);
            self.cursor = TimeOfDay::from_minutes(next_cursor as u16);

            let candidate = Interval {
                start,
                end: TimeOfDay::from_minutes(end_minutes as u16),
            };
            if !self.booked.iter().any(|b| candidate.overlaps(b)) {
                return Some(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn window(start: &str, end: &str) -> DayWindow {
        DayWindow::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
    }

    fn interval(start: &str, end: &str) -> Interval {
        Interval::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
    }

    fn starts(slots: AvailableSlots) -> Vec<String> {
        slots.map(|s| s.start.to_string()).collect()
    }

    #[test]
    fn four_hour_slots_in_an_open_day() {
        let slots = AvailableSlots::new(window("09:00", "18:00"), 4 * 60, vec![]);

        assert_eq!(
            starts(slots),
            vec!["09:00", "10:00", "11:00", "12:00", "13:00", "14:00"]
        );
    }

    #[test]
    fn every_slot_fits_within_working_hours() {
        let hours = window("09:00", "18:00");
        for slot in AvailableSlots::new(hours, 4 * 60, vec![]) {
            assert!(slot.start >= hours.start);
            assert!(slot.end <= hours.end);
            assert_eq!(slot.duration_minutes(), 240);
        }
    }

    #[test]
    fn booked_intervals_are_skipped() {
        let booked = vec![interval("11:00", "13:00")];
        let slots = AvailableSlots::new(window("09:00", "18:00"), 2 * 60, booked.clone());

        let produced: Vec<Interval> = slots.collect();
        assert_eq!(
            produced
                .iter()
                .map(|s| s.start.to_string())
                .collect::<Vec<_>>(),
            vec!["09:00", "13:00", "14:00", "15:00", "16:00"]
        );
        for slot in &produced {
            assert!(!slot.overlaps(&booked[0]), "slot {} overlaps booking", slot);
        }
    }

    #[test]
    fn touching_a_booked_interval_is_allowed() {
        let booked = vec![interval("12:00", "14:00")];
        let slots: Vec<Interval> =
            AvailableSlots::new(window("09:00", "18:00"), 3 * 60, booked).collect();

        // 09:00-12:00 touches the booking's start and is still valid.
        assert_eq!(slots[0], interval("09:00", "12:00"));
        assert_eq!(slots[1], interval("14:00", "17:00"));
    }

    #[test]
    fn empty_when_the_duration_does_not_fit() {
        let slots = AvailableSlots::new(window("09:00", "12:00"), 4 * 60, vec![]);
        assert_eq!(slots.count(), 0);
    }

    #[test]
    fn empty_when_the_day_is_fully_booked() {
        let booked = vec![interval("09:00", "18:00")];
        let slots = AvailableSlots::new(window("09:00", "18:00"), 60, booked);
        assert_eq!(slots.count(), 0);
    }

    #[test]
    fn clone_restarts_the_sequence() {
        let slots = AvailableSlots::new(window("09:00", "18:00"), 4 * 60, vec![]);
        let first: Vec<Interval> = slots.clone().collect();
        let second: Vec<Interval> = slots.collect();

        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn reset_rewinds_a_partially_consumed_iterator() {
        let mut slots = AvailableSlots::new(window("09:00", "18:00"), 4 * 60, vec![]);
        let first = slots.next().unwrap();
        slots.next();

        slots.reset();
        assert_eq!(slots.next(), Some(first));
    }

    #[test]
    fn none_yields_nothing() {
        assert_eq!(AvailableSlots::none().count(), 0);
    }

    #[test]
    fn slots_run_to_the_end_of_day_boundary() {
        let slots = AvailableSlots::new(window("22:00", "24:00"), 2 * 60, vec![]);
        assert_eq!(starts(slots), vec!["22:00"]);
    }
}
