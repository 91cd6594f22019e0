//! Spanish weekday names as stored in a workshop's `dias`.

use chrono::Weekday;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown weekday name: {0:?}")]
pub struct UnknownWeekday(pub String);

/// Resolves a weekday name, ignoring case and surrounding whitespace.
///
/// Both accented and unaccented spellings are accepted (`miércoles`/`miercoles`, `sábado`/`sabado`).
pub fn parse_weekday(name: &str) -> Result<Weekday, UnknownWeekday> {
    match name.trim().to_lowercase().as_str() {
        "domingo" => Ok(Weekday::Sun),
        "lunes" => Ok(Weekday::Mon),
        "martes" => Ok(Weekday::Tue),
        "miercoles" | "miércoles" => Ok(Weekday::Wed),
        "jueves" => Ok(Weekday::Thu),
        "viernes" => Ok(Weekday::Fri),
        "sabado" | "sábado" => Ok(Weekday::Sat),
        _ => Err(UnknownWeekday(name.to_string())),
    }
}

/// Index with domingo = 0 through sábado = 6.
pub fn weekday_index(day: Weekday) -> u32 {
    day.num_days_from_sunday()
}

pub fn display_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

/// The order in which days are offered when editing a workshop.
pub const WORKSHOP_WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

bitflags::bitflags! {
    /// A set of weekdays, bit `n` being the day with [`weekday_index`] `n`.
    #[derive(Default)]
    pub struct Days: u8 {
        const DOMINGO = 0b0000_0001;
        const LUNES = 0b0000_0010;
        const MARTES = 0b0000_0100;
        const MIERCOLES = 0b0000_1000;
        const JUEVES = 0b0001_0000;
        const VIERNES = 0b0010_0000;
        const SABADO = 0b0100_0000;
    }
}

impl Days {
    pub fn from_weekday(day: Weekday) -> Days {
        Days::from_bits_truncate(1 << weekday_index(day))
    }

    pub fn contains_weekday(&self, day: Weekday) -> bool {
        self.contains(Days::from_weekday(day))
    }

    /// Resolves configured day names. Unknown names are dropped.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Days {
        names
            .iter()
            .filter_map(|name| match parse_weekday(name.as_ref()) {
                Ok(day) => Some(Days::from_weekday(day)),
                Err(e) => {
                    warn!("Ignoring workshop day: {}", e);
                    None
                }
            })
            .fold(Days::empty(), |acc, day| acc | day)
    }
}

/// Normalizes user-entered day names to their display spelling, in week order, without duplicates.
pub fn normalize_days<S: AsRef<str>>(names: &[S]) -> Result<Vec<String>, UnknownWeekday> {
    let mut days = Days::empty();
    for name in names {
        days |= Days::from_weekday(parse_weekday(name.as_ref())?);
    }

    Ok(WORKSHOP_WEEK
        .iter()
        .filter(|&&day| days.contains_weekday(day))
        .map(|&day| display_name(day).to_string())
        .collect())
}
