//! Reference epochs for authoring day-of-week literals.
//!
//! Day-of-week conditions compare timestamps by weekday only, so any epoch
//! falling on the wanted weekday works as a literal. These are noon UTC of
//! the week starting Sunday 2019-09-01.

use time::Weekday;

const SUNDAY_NOON: i64 = 1_567_339_200;
const SECONDS_PER_DAY: i64 = 86_400;

/// Unix epoch second of the reference day for `weekday`.
pub fn weekday_epoch(weekday: Weekday) -> i64 {
    SUNDAY_NOON + i64::from(weekday.number_days_from_sunday()) * SECONDS_PER_DAY
}

/// Parse an English weekday name, case-insensitively.
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match name.trim().to_ascii_lowercase().as_str() {
        "sunday" => Weekday::Sunday,
        "monday" => Weekday::Monday,
        "tuesday" => Weekday::Tuesday,
        "wednesday" => Weekday::Wednesday,
        "thursday" => Weekday::Thursday,
        "friday" => Weekday::Friday,
        "saturday" => Weekday::Saturday,
        _ => return None,
    };
    Some(weekday)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn reference_epochs() {
        assert_eq!(weekday_epoch(Weekday::Sunday), 1567339200);
        assert_eq!(weekday_epoch(Weekday::Monday), 1567425600);
        assert_eq!(weekday_epoch(Weekday::Wednesday), 1567598400);
        assert_eq!(weekday_epoch(Weekday::Friday), 1567771200);
        assert_eq!(weekday_epoch(Weekday::Saturday), 1567857600);
    }

    #[test]
    fn epochs_fall_on_their_weekday() {
        for name in [
            "Sunday",
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
        ] {
            let weekday = weekday_from_name(name).unwrap();
            let at = OffsetDateTime::from_unix_timestamp(weekday_epoch(weekday)).unwrap();
            assert_eq!(at.weekday(), weekday, "{}", name);
        }
    }

    #[test]
    fn unknown_name() {
        assert_eq!(weekday_from_name("funday"), None);
        assert_eq!(weekday_from_name(" FRIDAY "), Some(Weekday::Friday));
    }
}
