use chrono::{NaiveDate, NaiveTime};
use timesheets::utils::datetime::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_format_and_parse_date() {
    let d = date(2025, 1, 15);
    assert_eq!(format_ymd(d), "2025-01-15");
    assert_eq!(parse_date("2025-01-15").unwrap(), d);
    assert!(parse_date("15.01.2025").is_err());
}

#[test]
fn test_parse_time_accepts_seconds() {
    let expected = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
    assert_eq!(parse_time("08:30").unwrap(), expected);
    assert_eq!(parse_time("08:30:00").unwrap(), expected);
    assert!(parse_time("8h30").is_err());
    assert_eq!(format_hm(expected), "08:30");
}

#[test]
fn test_week_start() {
    // 2025-01-15 is a Wednesday
    assert_eq!(week_start(date(2025, 1, 15)), date(2025, 1, 13));
    assert_eq!(week_start(date(2025, 1, 13)), date(2025, 1, 13));
    // Sunday belongs to the week that started six days earlier
    assert_eq!(week_start(date(2025, 1, 19)), date(2025, 1, 13));
    // Across a year boundary
    assert_eq!(week_start(date(2025, 1, 1)), date(2024, 12, 30));
}

#[test]
fn test_is_week_start() {
    assert!(is_week_start(date(2024, 1, 1)));
    assert!(!is_week_start(date(2024, 1, 2)));
}

#[test]
fn test_in_week() {
    let monday = date(2024, 1, 1);
    assert!(in_week(monday, monday));
    assert!(in_week(date(2024, 1, 7), monday));
    assert!(!in_week(date(2024, 1, 8), monday));
    assert!(!in_week(date(2023, 12, 31), monday));
}

#[test]
fn test_minutes_between() {
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
    assert_eq!(minutes_between(nine, five), 480);
    assert_eq!(minutes_between(five, nine), -480);
}
