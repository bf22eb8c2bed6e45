use chrono::{NaiveTime, Timelike};

pub const SLOT_INTERVAL_MINUTES: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("'{0}' is not a valid HH:MM time")]
    InvalidTime(String),
}

/// Parses a 24-hour `HH:MM` wall-clock time into `(hour, minute)`.
pub fn parse_clock(value: &str) -> Result<(u32, u32), SlotError> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| SlotError::InvalidTime(value.to_string()))?;
    Ok((time.hour(), time.minute()))
}

/// Expands a working window into bookable `HH:MM` slots.
///
/// Slots start at `start` and advance by [`SLOT_INTERVAL_MINUTES`] while
/// strictly before `end`. A window with `start >= end` yields no slots; there
/// is no wraparound past midnight. When the minutes reach 60 the hour is
/// incremented and the minutes reset to zero, so `09:45` is followed by
/// `10:00`.
pub fn generate_slots(start: &str, end: &str) -> Result<Vec<String>, SlotError> {
    let (mut hour, mut minute) = parse_clock(start)?;
    let (end_hour, end_minute) = parse_clock(end)?;

    let mut slots = Vec::new();
    while hour < end_hour || (hour == end_hour && minute < end_minute) {
        slots.push(format!("{:02}:{:02}", hour, minute));
        minute += SLOT_INTERVAL_MINUTES;
        if minute >= 60 {
            hour += 1;
            minute = 0;
        }
    }

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_standard_clinic_window() {
        let slots = generate_slots("10:00", "14:00").unwrap();
        assert_eq!(
            slots,
            vec!["10:00", "10:30", "11:00", "11:30", "12:00", "12:30", "13:00", "13:30"]
        );
    }

    #[test]
    fn test_empty_window_yields_no_slots() {
        assert!(generate_slots("09:00", "09:00").unwrap().is_empty());
    }

    #[test]
    fn test_inverted_window_does_not_wrap_midnight() {
        assert!(generate_slots("23:30", "00:30").unwrap().is_empty());
    }

    #[test]
    fn test_end_boundary_is_excluded() {
        assert_eq!(generate_slots("16:00", "17:00").unwrap(), vec!["16:00", "16:30"]);
        assert_eq!(generate_slots("16:00", "16:31").unwrap(), vec!["16:00", "16:30"]);
    }

    #[test]
    fn test_rollover_resets_minutes_to_zero() {
        let slots = generate_slots("09:45", "11:00").unwrap();
        assert_eq!(slots, vec!["09:45", "10:00", "10:30"]);
    }

    #[test]
    fn test_late_evening_window() {
        assert_eq!(generate_slots("22:30", "23:59").unwrap(), vec!["22:30", "23:00", "23:30"]);
    }

    #[test]
    fn test_aligned_windows_are_strictly_increasing() {
        for start_hour in 0..23u32 {
            for end_hour in (start_hour + 1)..24 {
                let start = format!("{:02}:00", start_hour);
                let end = format!("{:02}:30", end_hour);
                let slots = generate_slots(&start, &end).unwrap();

                assert_eq!(slots.len() as u32, (end_hour - start_hour) * 2 + 1);
                assert_eq!(slots.first().map(String::as_str), Some(start.as_str()));
                assert!(slots.windows(2).all(|pair| pair[0] < pair[1]));
            }
        }
    }

    #[test]
    fn test_invalid_times_are_rejected() {
        assert_matches!(generate_slots("24:00", "25:00"), Err(SlotError::InvalidTime(_)));
        assert_matches!(generate_slots("10:00", "ten"), Err(SlotError::InvalidTime(_)));
        assert_matches!(generate_slots("10:60", "11:00"), Err(SlotError::InvalidTime(_)));
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("07:05").unwrap(), (7, 5));
        assert_eq!(parse_clock(" 13:30 ").unwrap(), (13, 30));
    }
}
