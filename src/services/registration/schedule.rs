//! Weekly timetable rules: day names, clock parsing, overlap detection.

use chrono::NaiveTime;
use uuid::Uuid;

use crate::database::models::registration::{Course, ScheduleEntry};
use crate::services::{ServiceError, ServiceResult};
use crate::types::canonical_weekday;

/// The days and hours a course occupies each week.
#[derive(Debug, Clone, Copy)]
pub struct Slot<'a> {
    pub days: &'a [String],
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl<'a> Slot<'a> {
    /// A course only occupies the timetable when it has both times and at least one day.
    pub fn of(days: &'a [String], start: Option<NaiveTime>, end: Option<NaiveTime>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) if !days.is_empty() => Some(Slot { days, start, end }),
            _ => None,
        }
    }

    pub fn overlaps(&self, other: &Slot<'_>) -> bool {
        let shares_day = self.days.iter().any(|day| other.days.contains(day));
        shares_day && self.start < other.end && self.end > other.start
    }
}

/// First existing course (other than `exclude`) whose slot overlaps `candidate`.
pub fn find_conflict<'c>(candidate: &Slot<'_>, courses: &'c [Course], exclude: Option<Uuid>) -> Option<&'c Course> {
    courses
        .iter()
        .filter(|course| Some(course.id) != exclude)
        .find(|course| {
            Slot::of(&course.days, course.start_time, course.end_time)
                .map(|slot| slot.overlaps(candidate))
                .unwrap_or(false)
        })
}

/// One timetable row per (course, day) for courses that have a start time.
pub fn expand_schedule(courses: &[Course]) -> Vec<ScheduleEntry> {
    courses
        .iter()
        .filter_map(|course| course.start_time.map(|start| (course, start)))
        .flat_map(|(course, start)| {
            course.days.iter().map(move |day| ScheduleEntry {
                day: day.clone(),
                time: start.format("%H:%M").to_string(),
                course_title: course.title.clone(),
            })
        })
        .collect()
}

/// Accepts "09:00" or "09:00:00".
pub fn parse_clock(field: &'static str, raw: &str) -> ServiceResult<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ServiceError::invalid(field, format!("'{}' is not a valid HH:MM time", raw)))
}

pub fn parse_optional_clock(field: &'static str, raw: Option<&str>) -> ServiceResult<Option<NaiveTime>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_clock(field, value).map(Some),
    }
}

/// Canonical weekday names ("mon", "Monday" and "MONDAY" all become "Monday"),
/// duplicates removed, input order kept.
pub fn normalize_days(days: &[String]) -> ServiceResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(days.len());
    for raw in days {
        let name = canonical_weekday(raw)
            .ok_or_else(|| ServiceError::invalid("days", format!("'{}' is not a weekday", raw.trim())))?
            .to_string();
        if !normalized.contains(&name) {
            normalized.push(name);
        }
    }
    Ok(normalized)
}

pub fn check_time_order(start: Option<NaiveTime>, end: Option<NaiveTime>) -> ServiceResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(ServiceError::invalid("end_time", "must be after start_time"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn t(s: &str) -> NaiveTime {
        parse_clock("time", s).unwrap()
    }

    fn course(title: &str, days: &[&str], start: Option<&str>, end: Option<&str>) -> Course {
        Course {
            id: Uuid::new_v4(),
            course_code: title.to_uppercase(),
            title: title.to_string(),
            department: "CS".to_string(),
            seats_available: 30,
            prerequisites: vec![],
            days: days.iter().map(|d| d.to_string()).collect(),
            start_time: start.map(t),
            end_time: end.map(t),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn overlapping_hours_on_shared_day_conflict() {
        let existing = vec![course("Algorithms", &["Monday", "Wednesday"], Some("09:00"), Some("10:30"))];
        let days = vec!["Wednesday".to_string()];
        let slot = Slot::of(&days, Some(t("10:00")), Some(t("11:00"))).unwrap();
        let clash = find_conflict(&slot, &existing, None).unwrap();
        assert_eq!(clash.title, "Algorithms");
    }

    #[test]
    fn back_to_back_or_other_day_is_not_a_conflict() {
        let existing = vec![course("Algorithms", &["Monday"], Some("09:00"), Some("10:30"))];

        let monday = vec!["Monday".to_string()];
        let after = Slot::of(&monday, Some(t("10:30")), Some(t("12:00"))).unwrap();
        assert!(find_conflict(&after, &existing, None).is_none());

        let tuesday = vec!["Tuesday".to_string()];
        let same_hours = Slot::of(&tuesday, Some(t("09:00")), Some(t("10:30"))).unwrap();
        assert!(find_conflict(&same_hours, &existing, None).is_none());
    }

    #[test]
    fn course_does_not_conflict_with_itself_on_update() {
        let existing = vec![course("Databases", &["Friday"], Some("13:00"), Some("14:00"))];
        let days = vec!["Friday".to_string()];
        let slot = Slot::of(&days, Some(t("13:30")), Some(t("14:30"))).unwrap();
        assert!(find_conflict(&slot, &existing, Some(existing[0].id)).is_none());
    }

    #[test]
    fn unscheduled_courses_never_conflict() {
        let existing = vec![course("Seminar", &["Monday"], None, None)];
        let days = vec!["Monday".to_string()];
        let slot = Slot::of(&days, Some(t("09:00")), Some(t("17:00"))).unwrap();
        assert!(find_conflict(&slot, &existing, None).is_none());
        assert!(Slot::of(&[], Some(t("09:00")), Some(t("10:00"))).is_none());
    }

    #[test]
    fn schedule_has_one_row_per_day() {
        let courses = vec![
            course("Compilers", &["Tuesday", "Thursday"], Some("08:30"), Some("10:00")),
            course("Unscheduled", &["Monday"], None, None),
        ];
        let schedule = expand_schedule(&courses);
        assert_eq!(
            schedule,
            vec![
                ScheduleEntry {
                    day: "Tuesday".into(),
                    time: "08:30".into(),
                    course_title: "Compilers".into()
                },
                ScheduleEntry {
                    day: "Thursday".into(),
                    time: "08:30".into(),
                    course_title: "Compilers".into()
                },
            ]
        );
    }

    #[test]
    fn days_are_normalized_and_deduplicated() {
        let raw = vec!["mon".to_string(), "Monday".to_string(), " FRIDAY ".to_string()];
        assert_eq!(normalize_days(&raw).unwrap(), vec!["Monday", "Friday"]);
        assert!(normalize_days(&["Funday".to_string()]).is_err());
    }

    #[test]
    fn clock_parsing_and_ordering() {
        assert_eq!(t("09:05").format("%H:%M").to_string(), "09:05");
        assert_eq!(t("14:00:00"), t("14:00"));
        assert!(parse_clock("start_time", "25:00").is_err());
        assert_eq!(parse_optional_clock("start_time", Some("  ")).unwrap(), None);
        assert!(check_time_order(Some(t("10:00")), Some(t("09:00"))).is_err());
        assert!(check_time_order(Some(t("09:00")), None).is_ok());
    }
}
