//! Property tests for the habit store.

use chrono::{DateTime, Duration, Local, TimeZone};
use habitcard_core::{HabitStore, NewHabit, ToggleOutcome, ValidationError};
use proptest::prelude::*;

fn start() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
}

proptest! {
    #[test]
    fn count_matches_stored_dates(days in proptest::collection::vec(0i64..60, 0..40)) {
        let mut store = HabitStore::in_memory();
        let id = store.add(NewHabit::named("Walk")).unwrap();
        for day in days {
            store.toggle_id_at(id, start() + Duration::days(day));
            let habit = store.get(&id).unwrap();
            prop_assert_eq!(habit.count(), habit.dates.len());
        }
    }

    #[test]
    fn toggling_the_same_day_alternates(times in 1usize..12, hour in 0i64..12) {
        let mut store = HabitStore::in_memory();
        let id = store.add(NewHabit::named("Walk")).unwrap();
        let now = start() + Duration::hours(hour);
        for i in 0..times {
            let outcome = store.toggle_id_at(id, now);
            let checked = match outcome {
                ToggleOutcome::Toggled { checked, .. } => Some(checked),
                _ => None,
            };
            prop_assert_eq!(checked, Some(i % 2 == 0));
        }
        let habit = store.get(&id).unwrap();
        prop_assert_eq!(habit.count(), times % 2);
    }

    #[test]
    fn malformed_ids_never_mutate(raw in "[a-zA-Z0-9{}-]{0,40}") {
        prop_assume!(habitcard_core::HabitId::parse(&raw).is_err());
        let mut store = HabitStore::in_memory();
        store.add(NewHabit::named("Walk")).unwrap();
        let before = store.snapshot();

        let err = store.toggle_at(&raw, start()).unwrap_err();
        let is_invalid_id = matches!(
            err,
            habitcard_core::CoreError::Validation(ValidationError::InvalidIdentifier { .. })
        );
        prop_assert!(is_invalid_id);
        prop_assert_eq!(store.snapshot(), before);
    }
}

#[test]
fn test_unknown_id_is_reported_not_raised() {
    let mut store = HabitStore::in_memory();
    store.add(NewHabit::named("Walk")).unwrap();
    let before = store.snapshot();
    let stranger = habitcard_core::HabitId::generate();

    let outcome = store.toggle_at(&stranger.to_string(), start()).unwrap();
    assert_eq!(outcome, ToggleOutcome::NotFound { id: stranger });
    assert_eq!(store.snapshot(), before);
}
