use crate::model::Visit;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Weekday};
use log::debug;

/// Visits that happened on one local calendar day, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitDay<'a> {
    pub date: NaiveDate,
    pub label: String,
    pub visits: Vec<&'a Visit>,
}

/// Parses API timestamps. Offset-less values are read as local time in `tz`.
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(tz));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "월요일",
        Weekday::Tue => "화요일",
        Weekday::Wed => "수요일",
        Weekday::Thu => "목요일",
        Weekday::Fri => "금요일",
        Weekday::Sat => "토요일",
        Weekday::Sun => "일요일",
    }
}

pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "오늘".to_string();
    }
    if today.pred_opt() == Some(date) {
        return "어제".to_string();
    }
    format!(
        "{}년 {}월 {}일 {}",
        date.year(),
        date.month(),
        date.day(),
        weekday_label(date.weekday())
    )
}

/// `오후 01:05` style clock time.
pub fn time_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    let (pm, hour) = at.hour12();
    format!(
        "{} {:02}:{:02}",
        if pm { "오후" } else { "오전" },
        hour,
        at.minute()
    )
}

/// Full date and time as shown on review cards.
pub fn format_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> String {
    match parse_timestamp(raw, tz) {
        Some(at) => format!(
            "{}년 {}월 {}일 {}",
            at.year(),
            at.month(),
            at.day(),
            time_label(&at)
        ),
        None => raw.to_string(),
    }
}

pub fn group_by_day<'a, Tz: TimeZone>(visits: &'a [Visit], tz: &Tz, today: NaiveDate) -> Vec<VisitDay<'a>> {
    let mut dated: Vec<(DateTime<Tz>, &Visit)> = visits
        .iter()
        .filter_map(|visit| match parse_timestamp(&visit.created_at, tz) {
            Some(at) => Some((at, visit)),
            None => {
                debug!("skipping visit {} with unreadable timestamp", visit.visit_id);
                None
            }
        })
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    let mut days: Vec<VisitDay<'a>> = Vec::new();
    for (at, visit) in dated {
        let date = at.date_naive();
        match days.last_mut() {
            Some(day) if day.date == date => day.visits.push(visit),
            _ => days.push(VisitDay {
                date,
                label: day_label(date, today),
                visits: vec![visit],
            }),
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn visit(id: u64, created_at: &str) -> Visit {
        Visit {
            visit_id: id,
            restaurant_id: id,
            created_at: created_at.into(),
            restaurant_name: None,
            restaurant_category: None,
            restaurant_address: None,
        }
    }

    #[test]
    fn groups_by_local_day_newest_first() {
        let visits = vec![
            visit(1, "2025-05-01T23:30:00Z"),
            visit(2, "2025-05-02T03:00:00+09:00"),
            visit(3, "2025-04-30T12:00:00"),
            visit(4, "garbage"),
        ];
        let today = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let days = group_by_day(&visits, &kst(), today);

        let summary: Vec<(String, Vec<u64>)> = days
            .iter()
            .map(|day| (day.label.clone(), day.visits.iter().map(|v| v.visit_id).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("오늘".to_string(), vec![1, 2]),
                ("2025년 4월 30일 수요일".to_string(), vec![3]),
            ]
        );
    }

    #[test]
    fn yesterday_and_clock_labels() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        assert_eq!(day_label(today.pred_opt().unwrap(), today), "어제");
        assert_eq!(
            format_timestamp("2025-05-02T13:05:00+09:00", &kst()),
            "2025년 5월 2일 오후 01:05"
        );
        assert_eq!(format_timestamp("n/a", &kst()), "n/a");
    }
}
