use std::time::Duration;

use thiserror::Error;

/// One-shot countdown. `remaining` only moves while `active`; firing resets
/// it to `duration` so the timer can be re-armed.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    pub id: u64,
    pub name: String,
    pub duration: Duration,
    pub remaining: Duration,
    pub active: bool,
}

/// Raw hour/minute/second entry from the add-timer dialog, kept as text so
/// the dialog can round-trip whatever the user typed.
#[derive(Debug, Clone)]
pub struct TimerFields {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl Default for TimerFields {
    fn default() -> Self {
        Self {
            hours: "00".to_string(),
            minutes: "00".to_string(),
            seconds: "00".to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerFieldError {
    #[error("invalid number '{0}'")]
    NotANumber(String),
    #[error("hours must be between 0 and 23")]
    HoursOutOfRange,
    #[error("minutes must be between 0 and 59")]
    MinutesOutOfRange,
    #[error("seconds must be between 0 and 59")]
    SecondsOutOfRange,
    #[error("duration must be greater than zero")]
    ZeroDuration,
}

impl TimerFields {
    /// Accepts 0..=23 hours and 0..=59 minutes/seconds, rejecting the
    /// all-zero entry. Non-numeric text is reported separately so the UI can
    /// surface it as a transient notification instead of an inline error.
    pub fn parse(&self) -> Result<Duration, TimerFieldError> {
        let hours = parse_field(&self.hours)?;
        let minutes = parse_field(&self.minutes)?;
        let seconds = parse_field(&self.seconds)?;

        if hours > 23 {
            return Err(TimerFieldError::HoursOutOfRange);
        }
        if minutes > 59 {
            return Err(TimerFieldError::MinutesOutOfRange);
        }
        if seconds > 59 {
            return Err(TimerFieldError::SecondsOutOfRange);
        }

        let total = hours * 3_600 + minutes * 60 + seconds;
        if total == 0 {
            return Err(TimerFieldError::ZeroDuration);
        }
        Ok(Duration::from_secs(total))
    }
}

fn parse_field(raw: &str) -> Result<u64, TimerFieldError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| TimerFieldError::NotANumber(raw.trim().to_string()))
}

/// `H:MM:SS` above an hour, `MM:SS` below.
pub fn format_remaining(remaining: Duration) -> String {
    let total_secs = remaining.as_secs();
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(hours: &str, minutes: &str, seconds: &str) -> TimerFields {
        TimerFields {
            hours: hours.to_string(),
            minutes: minutes.to_string(),
            seconds: seconds.to_string(),
        }
    }

    #[test]
    fn accepts_full_valid_range() {
        assert_eq!(
            fields("00", "00", "01").parse().expect("one second"),
            Duration::from_secs(1)
        );
        assert_eq!(
            fields("23", "59", "59").parse().expect("max"),
            Duration::from_secs(23 * 3_600 + 59 * 60 + 59)
        );
        assert_eq!(
            fields(" 1 ", "30", "00").parse().expect("whitespace trimmed"),
            Duration::from_secs(5_400)
        );
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert_eq!(
            fields("24", "00", "00").parse().expect_err("hours"),
            TimerFieldError::HoursOutOfRange
        );
        assert_eq!(
            fields("00", "60", "00").parse().expect_err("minutes"),
            TimerFieldError::MinutesOutOfRange
        );
        assert_eq!(
            fields("00", "00", "60").parse().expect_err("seconds"),
            TimerFieldError::SecondsOutOfRange
        );
    }

    #[test]
    fn rejects_all_zero_duration() {
        assert_eq!(
            fields("00", "00", "00").parse().expect_err("zero"),
            TimerFieldError::ZeroDuration
        );
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert_eq!(
            fields("ten", "00", "00").parse().expect_err("words"),
            TimerFieldError::NotANumber("ten".to_string())
        );
        assert_eq!(
            fields("00", "", "30").parse().expect_err("empty field"),
            TimerFieldError::NotANumber(String::new())
        );
        assert_eq!(
            fields("00", "-5", "00").parse().expect_err("negative"),
            TimerFieldError::NotANumber("-5".to_string())
        );
    }

    #[test]
    fn remaining_formats_with_and_without_hours() {
        assert_eq!(format_remaining(Duration::from_secs(59)), "00:59");
        assert_eq!(format_remaining(Duration::from_secs(90)), "01:30");
        assert_eq!(format_remaining(Duration::from_secs(3_661)), "1:01:01");
        assert_eq!(format_remaining(Duration::ZERO), "00:00");
    }
}
