use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Days, Local, LocalResult, NaiveTime, TimeZone};

/// One-shot wall-clock alarm. Fires once when the poll loop observes the
/// target instant in the past, then stays disabled until re-enabled.
#[derive(Debug, Clone)]
pub struct Alarm {
    pub id: u64,
    pub label: String,
    pub target: DateTime<Local>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredAlarm {
    pub id: u64,
    pub label: String,
    pub target: DateTime<Local>,
}

pub fn parse_wall_clock(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .map_err(|_| anyhow!("invalid time '{input}', expected HH:MM or HH:MM:SS"))
}

/// Combines a wall-clock time with today's date; when the instant is not
/// strictly in the future it rolls forward to the next day that yields one.
pub fn next_target(now: &DateTime<Local>, time: NaiveTime) -> Result<DateTime<Local>> {
    match next_target_in_tz(now, time, &Local) {
        Some(target) => Ok(target),
        None => bail!(
            "could not resolve {} to a future local instant",
            time.format("%H:%M:%S")
        ),
    }
}

pub(crate) fn next_target_in_tz<Tz>(
    now: &DateTime<Tz>,
    time: NaiveTime,
    timezone: &Tz,
) -> Option<DateTime<Tz>>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    for day_offset in 0_u64..14 {
        let date = now.date_naive().checked_add_days(Days::new(day_offset))?;
        let naive = date.and_time(time);
        let candidate = match timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(first, _second) => first,
            LocalResult::None => continue,
        };
        if candidate > *now {
            return Some(candidate);
        }
    }

    None
}
