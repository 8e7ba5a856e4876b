/*
Locale support for calendar date labels.

The calendar page renders the selected day as a locale-formatted label
("dd, MMMM, yyyy", e.g. "10, October, 2023" / "10, Oktober, 2023") and the
document language tag tells us which month names to expect. This module
provides:
- An embedded month-name table per supported locale key (compile-time JSON).
- `normalize_locale` to map a document language tag ("en-US") onto a locale
  key ("enUS").
- `parse_localized_date` to combine a date label and a 24-hour time into an
  absolute UTC instant.

Notes:
- Locale keys mirror the reference locale table of the original calendar
  page: regional keys exist only where that table defines them ("enUS",
  "enCA", "enGB"), so "de-DE" maps to the undefined key "deDE" and is
  rejected while bare "de" is valid.
- The bare tag "en" is special-cased to "enUS".
*/

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    /// The normalized language tag has no locale definition.
    #[error("Unsupported locale tag: {0}")]
    Unsupported(String),

    /// A locale key was used that is not in the locale table.
    #[error("Locale {0} not found")]
    NotFound(String),

    /// The date or time label did not match the expected shape.
    #[error("Could not parse date label '{0}' as {1}")]
    DateParse(String, String),
}

static MONTH_NAMES: OnceLock<HashMap<String, Vec<String>>> = OnceLock::new();

const MONTHS_JSON: &str = r#"
{
  "de":   ["Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September", "Oktober", "November", "Dezember"],
  "enUS": ["January", "February", "March", "April", "May", "June", "July", "August", "September", "October", "November", "December"],
  "enCA": ["January", "February", "March", "April", "May", "June", "July", "August", "September", "October", "November", "December"],
  "enGB": ["January", "February", "March", "April", "May", "June", "July", "August", "September", "October", "November", "December"],
  "es":   ["enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre", "octubre", "noviembre", "diciembre"],
  "fr":   ["janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre", "octobre", "novembre", "décembre"],
  "it":   ["gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto", "settembre", "ottobre", "novembre", "dicembre"],
  "nl":   ["januari", "februari", "maart", "april", "mei", "juni", "juli", "augustus", "september", "oktober", "november", "december"],
  "pl":   ["stycznia", "lutego", "marca", "kwietnia", "maja", "czerwca", "lipca", "sierpnia", "września", "października", "listopada", "grudnia"],
  "pt":   ["janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro", "outubro", "novembro", "dezembro"],
  "ru":   ["января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября", "октября", "ноября", "декабря"],
  "sv":   ["januari", "februari", "mars", "april", "maj", "juni", "juli", "augusti", "september", "oktober", "november", "december"]
}
"#;

fn month_names() -> &'static HashMap<String, Vec<String>> {
    MONTH_NAMES.get_or_init(|| {
        serde_json::from_str(MONTHS_JSON).unwrap_or_else(|e| {
            panic!("failed to parse MONTHS_JSON in locale module: {}", e);
        })
    })
}

/// Whether the given locale key has a month-name table.
pub fn is_supported_locale(key: &str) -> bool {
    month_names().contains_key(key)
}

/// Normalize a document language tag into a locale key: hyphens are removed
/// and subtags after the first are uppercased ("en-us" -> "enUS"). The bare
/// tag "en" maps to "enUS". Tags whose key has no locale definition are
/// rejected; "de-DE" is not a defined key, only "de" is.
pub fn normalize_locale(tag: &str) -> Result<String, LocaleError> {
    let mut key: String = tag
        .split('-')
        .enumerate()
        .map(|(idx, part)| {
            if idx > 0 {
                part.to_uppercase()
            } else {
                part.to_string()
            }
        })
        .collect();

    if key == "en" {
        key = "enUS".to_string();
    }

    if !is_supported_locale(&key) {
        return Err(LocaleError::Unsupported(key));
    }
    Ok(key)
}

/// Parse a "dd, MMMM, yyyy" date label under the given locale key.
pub fn parse_date_label(date_label: &str, locale: &str) -> Result<NaiveDate, LocaleError> {
    let months = month_names()
        .get(locale)
        .ok_or_else(|| LocaleError::NotFound(locale.to_string()))?;

    let parts: Vec<&str> = date_label.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(LocaleError::DateParse(
            date_label.to_string(),
            "dd, MMMM, yyyy".to_string(),
        ));
    }

    let day: u32 = parts[0].parse().map_err(|_| {
        LocaleError::DateParse(date_label.to_string(), "dd, MMMM, yyyy".to_string())
    })?;
    let year: i32 = parts[2].parse().map_err(|_| {
        LocaleError::DateParse(date_label.to_string(), "dd, MMMM, yyyy".to_string())
    })?;

    let month = months
        .iter()
        .position(|name| name.eq_ignore_ascii_case(parts[1]))
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| {
            LocaleError::DateParse(date_label.to_string(), "dd, MMMM, yyyy".to_string())
        })?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        LocaleError::DateParse(date_label.to_string(), "dd, MMMM, yyyy".to_string())
    })
}

/// Parse a 24-hour "HH:mm" time label (a single-digit hour is accepted,
/// matching what the calendar page renders for early times).
pub fn parse_time_label(time_label: &str) -> Result<NaiveTime, LocaleError> {
    let (hours, minutes) = time_label.split_once(':').ok_or_else(|| {
        LocaleError::DateParse(time_label.to_string(), "HH:mm".to_string())
    })?;
    let hours: u32 = hours.trim().parse().map_err(|_| {
        LocaleError::DateParse(time_label.to_string(), "HH:mm".to_string())
    })?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| {
        LocaleError::DateParse(time_label.to_string(), "HH:mm".to_string())
    })?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(|| {
        LocaleError::DateParse(time_label.to_string(), "HH:mm".to_string())
    })
}

/// Parse a locale-formatted date label combined with a 24-hour time into an
/// absolute instant. The label describes wall-clock time in the machine's
/// local timezone (the calendar page renders local times), so the result is
/// converted from local time to UTC.
pub fn parse_localized_date(
    date_label: &str,
    time_label: &str,
    locale: &str,
) -> Result<DateTime<Utc>, LocaleError> {
    let date = parse_date_label(date_label, locale)?;
    let time = parse_time_label(time_label)?;
    let naive = date.and_time(time);

    // `earliest` resolves DST fall-back ambiguity; a wall-clock time that
    // does not exist at all (spring-forward gap) is rejected.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            LocaleError::DateParse(
                format!("{} {}", date_label, time_label),
                "local wall-clock time".to_string(),
            )
        })
}
