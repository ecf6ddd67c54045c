#[cfg(test)]
mod tests {
    use crate::ranking::{format_slot, RecommendationRanker, DEFAULT_PREFERRED_HOURS};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn default_ranker() -> RecommendationRanker {
        RecommendationRanker::new(DEFAULT_PREFERRED_HOURS.to_vec(), 5)
    }

    #[test]
    fn preferred_hours_sort_ahead() {
        let ranked = default_ranker().rank(vec![
            at(17, 9, 0),
            at(17, 16, 30),
            at(17, 10, 0),
            at(17, 12, 0),
        ]);

        let starts: Vec<NaiveDateTime> = ranked.iter().map(|s| s.start).collect();
        // 10:00 and 16:30 are preferred-tier; within the tier chronological.
        assert_eq!(
            starts,
            vec![at(17, 10, 0), at(17, 16, 30), at(17, 9, 0), at(17, 12, 0)]
        );
    }

    #[test]
    fn same_tier_breaks_ties_by_earliest_date() {
        let ranked = default_ranker().rank(vec![at(18, 10, 0), at(17, 10, 0), at(19, 10, 0)]);
        let starts: Vec<NaiveDateTime> = ranked.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![at(17, 10, 0), at(18, 10, 0), at(19, 10, 0)]);
    }

    #[test]
    fn top_caps_and_dedups() {
        let ranker = RecommendationRanker::new(DEFAULT_PREFERRED_HOURS.to_vec(), 3);
        let pool = vec![
            at(17, 9, 0),
            at(17, 9, 0), // duplicate
            at(17, 10, 0),
            at(17, 13, 0),
            at(17, 14, 0),
            at(17, 15, 0),
        ];
        let top = ranker.top(pool);
        assert_eq!(top.len(), 3);
        // All three winners are preferred-tier.
        assert_eq!(
            top.iter().map(|s| s.start).collect::<Vec<_>>(),
            vec![at(17, 10, 0), at(17, 13, 0), at(17, 14, 0)]
        );
    }

    #[test]
    fn display_is_natural_language() {
        // 2025-02-17 is a Monday.
        assert_eq!(format_slot(at(17, 10, 0)), "Monday, February 17 at 10:00 AM");
        assert_eq!(format_slot(at(17, 14, 30)), "Monday, February 17 at 2:30 PM");
    }

    #[test]
    fn ranked_slots_carry_both_representations() {
        let ranked = default_ranker().rank(vec![at(17, 10, 0)]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].start, at(17, 10, 0));
        assert!(ranked[0].display.contains("February 17"));
    }
}
