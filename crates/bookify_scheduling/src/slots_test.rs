#[cfg(test)]
mod tests {
    use crate::slots::{BusinessHoursPolicy, SlotGenerator};
    use bookify_config::SchedulingConfig;
    use chrono::{Duration, NaiveDate, NaiveTime, Weekday};

    fn monday() -> NaiveDate {
        // 2025-06-09 is a Monday
        NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
    }

    #[test]
    fn office_hours_full_day_of_half_hour_slots() {
        let generator = SlotGenerator::new(BusinessHoursPolicy::office_hours());
        let slots = generator.slots_for_date(monday(), Duration::minutes(30));

        // 09:00 through 17:30 inclusive, every 30 minutes.
        assert_eq!(slots.len(), 18);
        assert_eq!(slots[0].time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(
            slots.last().unwrap().time(),
            NaiveTime::from_hms_opt(17, 30, 0).unwrap()
        );
        for pair in slots.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::minutes(30));
        }
    }

    #[test]
    fn no_slots_on_non_working_days() {
        let generator = SlotGenerator::new(BusinessHoursPolicy::office_hours());
        let saturday = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert!(generator.slots_for_date(saturday, Duration::minutes(30)).is_empty());
        assert!(generator.slots_for_date(sunday, Duration::minutes(30)).is_empty());

        // Extended hours runs Saturdays but never Sundays.
        let generator = SlotGenerator::new(BusinessHoursPolicy::extended_hours());
        assert!(!generator.slots_for_date(saturday, Duration::minutes(30)).is_empty());
        assert!(generator.slots_for_date(sunday, Duration::minutes(30)).is_empty());
    }

    #[test]
    fn slot_must_fit_entirely_inside_the_range() {
        let generator = SlotGenerator::new(BusinessHoursPolicy::office_hours());
        let slots = generator.slots_for_date(monday(), Duration::minutes(120));

        // A two-hour appointment cannot start after 16:00.
        assert_eq!(
            slots.last().unwrap().time(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap()
        );
    }

    #[test]
    fn nonpositive_duration_yields_nothing() {
        let generator = SlotGenerator::new(BusinessHoursPolicy::office_hours());
        assert!(generator.slots_for_date(monday(), Duration::minutes(0)).is_empty());
        assert!(generator.slots_for_date(monday(), Duration::minutes(-30)).is_empty());
    }

    #[test]
    fn config_overrides_apply_on_top_of_preset() {
        let config = SchedulingConfig {
            policy: Some("extended_hours".to_string()),
            work_start_time: Some("11:00".to_string()),
            working_days: Some(vec!["Mon".to_string(), "Wed".to_string()]),
            slot_step_minutes: Some(60),
            ..Default::default()
        };
        let policy = BusinessHoursPolicy::from_config(&config).unwrap();

        assert_eq!(policy.ranges[0].open, NaiveTime::from_hms_opt(11, 0, 0).unwrap());
        assert_eq!(policy.ranges[0].close, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(policy.weekdays, vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(policy.step, Duration::minutes(60));
    }

    #[test]
    fn bad_config_is_rejected() {
        let unknown = SchedulingConfig {
            policy: Some("nights_only".to_string()),
            ..Default::default()
        };
        assert!(BusinessHoursPolicy::from_config(&unknown).is_err());

        let inverted = SchedulingConfig {
            work_start_time: Some("18:00".to_string()),
            work_end_time: Some("09:00".to_string()),
            ..Default::default()
        };
        assert!(BusinessHoursPolicy::from_config(&inverted).is_err());

        let no_days = SchedulingConfig {
            working_days: Some(vec!["Holiday".to_string()]),
            ..Default::default()
        };
        assert!(BusinessHoursPolicy::from_config(&no_days).is_err());
    }
}
