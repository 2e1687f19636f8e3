use chrono::prelude::*;
use chrono_tz::Tz;

/// The wall-clock time an event starts at when the admin did not pick one.
pub fn default_event_time() -> NaiveTime {
    NaiveTime::from_hms(18, 0, 0)
}

/// Resolves a civil date + time-of-day in the given zone to an absolute
/// instant.
///
/// The zone offset depends on the calendar date (DST), so a fixed offset
/// table is not enough. Instead: read the civil fields as if they were UTC,
/// format that guess back into the zone, and subtract the observed delta.
/// A second correction handles guesses that land on the other side of a
/// DST transition.
///
/// A wall-clock time inside a DST gap (spring forward) does not exist; the
/// result then rolls forward past the gap, which is the conventional
/// platform behavior.
pub fn civil_to_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let civil = date.and_time(time);

    let guess = Utc.from_utc_datetime(&civil);
    let corrected = guess - (observed_civil(guess, tz) - civil);

    let delta = observed_civil(corrected, tz) - civil;
    if delta == chrono::Duration::zero() {
        return corrected;
    }

    // The offset changed between the guess and the corrected instant.
    let recorrected = corrected - delta;
    if observed_civil(recorrected, tz) == civil {
        recorrected
    } else {
        // Non-existent wall-clock time: keep the rolled-forward instant.
        corrected
    }
}

fn observed_civil(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// "today", "tomorrow" or a spelled-out date, relative to `now` in the
/// given zone. Used when rendering reminder messages.
pub fn relative_day_label(event_date: NaiveDate, now: DateTime<Utc>, tz: Tz) -> String {
    let today = now.with_timezone(&tz).date().naive_local();
    if event_date == today {
        "today".to_string()
    } else if event_date == today.succ() {
        "tomorrow".to_string()
    } else {
        event_date.format("%A, %B %-d").to_string()
    }
}

/// 12-hour clock rendering for messages, e.g. "6:00 PM".
pub fn format_event_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}
