use serde::Serialize;
use time::{format_description::FormatItem, macros::format_description, Date, Month, OffsetDateTime};

pub const WEEKDAYS: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

pub const MONTHS: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto", "Setembro",
    "Outubro", "Novembro", "Dezembro",
];

pub const MONTHS_SHORT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

pub const DIAS_SEMANA: [&str; 7] = [
    "Domingo", "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado",
];

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRange {
    pub start_date: String,
    pub end_date: String,
}

/// One calendar week, Sunday first. `None` pads before day 1 and after the last day.
pub type CalendarRow = [Option<u8>; 7];

fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Normalizes a zero-based month that may run past either end of the year.
pub fn shift_month(year: i32, month0: i32) -> (i32, u8) {
    let total = year * 12 + month0;
    (total.div_euclid(12), total.rem_euclid(12) as u8)
}

fn month_of(month0: u8) -> Month {
    Month::try_from(month0 + 1).unwrap_or(Month::January)
}

pub fn days_in_month(year: i32, month0: i32) -> u8 {
    let (year, month0) = shift_month(year, month0);
    month_of(month0).length(year)
}

pub fn to_date_str(d: Date) -> String {
    d.format(DATE_FORMAT)
        .unwrap_or_else(|_| format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day()))
}

pub fn parse_date_str(s: &str) -> Option<Date> {
    Date::parse(s.trim(), DATE_FORMAT).ok()
}

pub fn today() -> Date {
    now_local().date()
}

/// Today as YYYY-MM-DD.
pub fn today_str() -> String {
    to_date_str(today())
}

/// Current local time as HH:mm.
pub fn now_time_str() -> String {
    let now = now_local();
    now.format(TIME_FORMAT)
        .unwrap_or_else(|_| format!("{:02}:{:02}", now.hour(), now.minute()))
}

pub fn date_key(year: i32, month0: i32, day: u8) -> String {
    let (year, month0) = shift_month(year, month0);
    format!("{:04}-{:02}-{:02}", year, month0 + 1, day)
}

/// First and last day of a month (zero-based month).
pub fn month_range(year: i32, month0: i32) -> MonthRange {
    let last = days_in_month(year, month0);
    MonthRange {
        start_date: date_key(year, month0, 1),
        end_date: date_key(year, month0, last),
    }
}

pub fn calendar_rows(year: i32, month0: i32) -> Vec<CalendarRow> {
    let (year, month0) = shift_month(year, month0);
    let first_weekday = Date::from_calendar_date(year, month_of(month0), 1)
        .map(|d| d.weekday().number_days_from_sunday())
        .unwrap_or(0);
    let days = days_in_month(year, month0 as i32);

    let mut cells: Vec<Option<u8>> = Vec::with_capacity(42);
    cells.extend(std::iter::repeat(None).take(first_weekday as usize));
    cells.extend((1..=days).map(Some));
    while cells.len() % 7 != 0 {
        cells.push(None);
    }
    cells
        .chunks(7)
        .map(|chunk| {
            let mut row = [None; 7];
            row.copy_from_slice(chunk);
            row
        })
        .collect()
}

/// "Segunda, 3 de fev"
pub fn format_day_label(d: Date) -> String {
    format!(
        "{}, {} de {}",
        DIAS_SEMANA[d.weekday().number_days_from_sunday() as usize],
        d.day(),
        MONTHS_SHORT[u8::from(d.month()) as usize - 1]
    )
}

pub fn month_title(year: i32, month0: i32) -> String {
    let (year, month0) = shift_month(year, month0);
    format!("{} {}", MONTHS[month0 as usize], year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn february_range() {
        assert_eq!(
            month_range(2026, 1),
            MonthRange {
                start_date: "2026-02-01".into(),
                end_date: "2026-02-28".into(),
            }
        );
        assert_eq!(month_range(2024, 1).end_date, "2024-02-29");
        assert_eq!(month_range(2025, 11).end_date, "2025-12-31");
    }

    #[test]
    fn month_lengths_follow_leap_years() {
        assert_eq!(days_in_month(2024, 1), 29);
        assert_eq!(days_in_month(2100, 1), 28);
        assert_eq!(days_in_month(2000, 1), 29);
        assert_eq!(days_in_month(2026, 3), 30);
        assert_eq!(days_in_month(2026, 13), 28);
        assert_eq!(days_in_month(2026, -2), 30);
    }

    #[test]
    fn month_overflow_wraps_year() {
        assert_eq!(shift_month(2026, 12), (2027, 0));
        assert_eq!(shift_month(2026, -1), (2025, 11));
        assert_eq!(month_range(2026, -1).start_date, "2025-12-01");
    }

    #[test]
    fn grid_starts_on_first_weekday() {
        // 2026-02-01 is a Sunday, 28 days: exactly four full rows
        let rows = calendar_rows(2026, 1);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0], Some(1));
        assert_eq!(rows[3][6], Some(28));

        // 2026-03-01 is also a Sunday, 31 days: five rows, padded tail
        let rows = calendar_rows(2026, 2);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4][2], Some(31));
        assert_eq!(rows[4][3], None);

        // 2026-04-01 is a Wednesday
        let rows = calendar_rows(2026, 3);
        assert_eq!(rows[0], [None, None, None, Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn date_strings() {
        assert_eq!(to_date_str(date!(2026 - 02 - 03)), "2026-02-03");
        assert_eq!(parse_date_str("2026-02-03"), Some(date!(2026 - 02 - 03)));
        assert_eq!(parse_date_str("03/02/2026"), None);
        assert_eq!(date_key(2026, 1, 3), "2026-02-03");
        assert_eq!(today_str().len(), 10);
        assert_eq!(now_time_str().len(), 5);
    }

    #[test]
    fn labels() {
        assert_eq!(format_day_label(date!(2026 - 02 - 02)), "Segunda, 2 de fev");
        assert_eq!(month_title(2026, 1), "Fevereiro 2026");
    }
}
