use chrono::{DateTime, TimeZone, Utc};

const MS_PER_MINUTE: i64 = 60 * 1000;

/// Round a timestamp up to the next multiple of `step_minutes`, measured
/// from the epoch. A timestamp already on a step boundary is returned as-is.
pub fn round_up_time_to(date: DateTime<Utc>, step_minutes: u32) -> DateTime<Utc> {
    if step_minutes == 0 {
        return date;
    }
    let step_ms = step_minutes as i64 * MS_PER_MINUTE;
    let ms = date.timestamp_millis();
    let rounded = ms.div_euclid(step_ms) * step_ms
        + if ms.rem_euclid(step_ms) == 0 { 0 } else { step_ms };
    // Any multiple of a minute step is representable, so this cannot fail.
    Utc.timestamp_millis_opt(rounded)
        .single()
        .unwrap_or(date)
}

/// Round a bare `HH:mm` string up to the next multiple of `step_minutes`
/// within a single day. Overflow past 23:59 wraps to `00:00`; the day
/// rollover is not reflected anywhere; this is a display-only helper.
pub fn round_up_24h_string_to(hhmm: &str, step_minutes: u32) -> Option<String> {
    let (hours, minutes) = hhmm.split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    if step_minutes == 0 {
        return Some(format!("{:02}:{:02}", hours, minutes));
    }

    let total = hours * 60 + minutes;
    let rounded = total.div_ceil(step_minutes) * step_minutes;
    let wrapped = rounded % (24 * 60);
    Some(format!("{:02}:{:02}", wrapped / 60, wrapped % 60))
}

/// Whether a millisecond duration is an exact multiple of `step_minutes`.
pub fn is_divisible_by(duration_ms: i64, step_minutes: u32) -> bool {
    if step_minutes == 0 {
        return true;
    }
    duration_ms % (step_minutes as i64 * MS_PER_MINUTE) == 0
}

/// Ceiling-round a millisecond duration to the nearest multiple of
/// `step_minutes`, expressed in milliseconds. This rounds a *duration*, not
/// a clock time: 50 minutes at a 15-minute step becomes 60 minutes.
pub fn round_up_duration_to(duration_ms: i64, step_minutes: u32) -> i64 {
    if step_minutes == 0 {
        return duration_ms;
    }
    let step_ms = step_minutes as i64 * MS_PER_MINUTE;
    duration_ms.div_euclid(step_ms) * step_ms
        + if duration_ms.rem_euclid(step_ms) == 0 { 0 } else { step_ms }
}
