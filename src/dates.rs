use chrono::{Datelike, NaiveDate, Weekday};

pub const UNSET_DISPLAY: &str = "Belum diatur";

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Parses a `YYYY-MM-DD` presentation date. Anything that is not exactly three
/// dash-separated integers forming a real calendar date is `None`.
pub fn parse_presentation_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let year = parts[0].trim().parse::<i32>().ok()?;
    let month = parts[1].trim().parse::<u32>().ok()?;
    let day = parts[2].trim().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn weekday_name(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
        Weekday::Sun => "Minggu",
    }
}

/// Long Indonesian calendar date, e.g. `Senin, 18 Maret 2024`.
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {} {}",
        weekday_name(date.weekday()),
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Export rendering: empty stays empty, unparsable text is kept verbatim.
pub fn format_export_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match parse_presentation_date(raw) {
        Some(d) => format_long_date(d),
        None => raw.to_string(),
    }
}

/// Display rendering: like export, but an unset date reads "Belum diatur".
pub fn format_display_date(raw: &str) -> String {
    if raw.is_empty() {
        return UNSET_DISPLAY.to_string();
    }
    format_export_date(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_calendar_dates() {
        assert_eq!(
            parse_presentation_date("2024-03-18"),
            NaiveDate::from_ymd_opt(2024, 3, 18)
        );
        assert_eq!(parse_presentation_date(""), None);
        assert_eq!(parse_presentation_date("2024-02-30"), None);
        assert_eq!(parse_presentation_date("18/03/2024"), None);
        assert_eq!(parse_presentation_date("besok"), None);
    }

    #[test]
    fn long_date_is_indonesian() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 18).expect("date");
        assert_eq!(format_long_date(d), "Senin, 18 Maret 2024");
    }

    #[test]
    fn fallbacks_for_unset_and_garbage() {
        assert_eq!(format_display_date(""), UNSET_DISPLAY);
        assert_eq!(format_export_date(""), "");
        assert_eq!(format_display_date("minggu depan"), "minggu depan");
        assert_eq!(format_export_date("2024-13-01"), "2024-13-01");
    }
}
