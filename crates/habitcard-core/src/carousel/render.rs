//! Render list for the looping carousel.
//!
//! With more than one habit the list is padded with a copy of the last habit
//! in front and a copy of the first habit at the back, so a swipe past either
//! end lands on a card that looks like the opposite end before the paging
//! controller jumps there silently.

use serde::Serialize;

use crate::habit::{Habit, HabitId};

const LEADING_KEY: &str = "last";
const TRAILING_KEY: &str = "first";

/// Where a render item sits relative to the real collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Real,
    /// Copy of the last habit placed before the first real card.
    LeadingCopy,
    /// Copy of the first habit placed after the last real card.
    TrailingCopy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    /// `None` for duplicates; they must be resolved before any mutation.
    pub real_id: Option<HabitId>,
    pub slot: Slot,
    pub habit: Habit,
}

impl RenderItem {
    fn real(habit: &Habit) -> Self {
        Self {
            real_id: Some(habit.id),
            slot: Slot::Real,
            habit: habit.clone(),
        }
    }

    fn copy(habit: &Habit, slot: Slot) -> Self {
        Self {
            real_id: None,
            slot,
            habit: habit.clone(),
        }
    }

    /// Unique list key: the habit id, or `"last"` / `"first"` for copies.
    pub fn key(&self) -> String {
        match self.slot {
            Slot::Real => self.habit.id.to_string(),
            Slot::LeadingCopy => LEADING_KEY.to_string(),
            Slot::TrailingCopy => TRAILING_KEY.to_string(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        self.slot != Slot::Real
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderList {
    items: Vec<RenderItem>,
}

impl RenderList {
    pub fn build(habits: &[Habit]) -> Self {
        let items = match habits {
            [] => Vec::new(),
            [only] => vec![RenderItem::real(only)],
            [first, .., last] => {
                let mut items = Vec::with_capacity(habits.len() + 2);
                items.push(RenderItem::copy(last, Slot::LeadingCopy));
                items.extend(habits.iter().map(RenderItem::real));
                items.push(RenderItem::copy(first, Slot::TrailingCopy));
                items
            }
        };
        Self { items }
    }

    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&RenderItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when the list carries the two boundary copies.
    pub fn is_duplicated(&self) -> bool {
        self.items.len() > 2
            && self.items.first().map(|i| i.slot) == Some(Slot::LeadingCopy)
    }

    /// Number of real habits represented.
    pub fn real_len(&self) -> usize {
        if self.is_duplicated() {
            self.items.len() - 2
        } else {
            self.items.len()
        }
    }

    /// Real habit id behind a render index, using the list's own copies.
    pub fn resolve(&self, index: usize) -> Option<HabitId> {
        let item = self.items.get(index)?;
        match item.slot {
            Slot::Real => item.real_id,
            Slot::LeadingCopy => self.items.get(self.items.len().checked_sub(2)?)?.real_id,
            Slot::TrailingCopy => self.items.get(1)?.real_id,
        }
    }

    /// Real habit id behind a render index, against the live collection.
    ///
    /// Copies map to whatever is first/last in `habits` right now, which is
    /// what a commit must act on even if this list was built earlier.
    pub fn resolve_against(&self, index: usize, habits: &[Habit]) -> Option<HabitId> {
        let item = self.items.get(index)?;
        match item.slot {
            Slot::Real => item.real_id,
            Slot::LeadingCopy => habits.last().map(|h| h.id),
            Slot::TrailingCopy => habits.first().map(|h| h.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::NewHabit;

    fn habits(names: &[&str]) -> Vec<Habit> {
        names
            .iter()
            .map(|n| NewHabit::named(*n).into_habit().unwrap())
            .collect()
    }

    #[test]
    fn wraps_with_boundary_copies() {
        let hs = habits(&["A", "B", "C"]);
        let list = RenderList::build(&hs);

        let keys: Vec<_> = list.items().iter().map(RenderItem::key).collect();
        assert_eq!(
            keys,
            vec![
                "last".to_string(),
                hs[0].id.to_string(),
                hs[1].id.to_string(),
                hs[2].id.to_string(),
                "first".to_string(),
            ]
        );
        // copies carry every field of their source
        assert_eq!(list.items()[0].habit, hs[2]);
        assert_eq!(list.items()[4].habit, hs[0]);
        assert_eq!(list.items()[0].real_id, None);
        assert_eq!(list.real_len(), 3);
    }

    #[test]
    fn single_habit_is_not_duplicated() {
        let hs = habits(&["A"]);
        let list = RenderList::build(&hs);
        assert_eq!(list.len(), 1);
        assert!(!list.is_duplicated());
        assert_eq!(list.resolve(0), Some(hs[0].id));
        assert!(RenderList::build(&[]).is_empty());
    }

    #[test]
    fn two_habits_still_wrap() {
        let hs = habits(&["A", "B"]);
        let list = RenderList::build(&hs);
        assert_eq!(list.len(), 4);
        assert_eq!(list.resolve(0), Some(hs[1].id));
        assert_eq!(list.resolve(3), Some(hs[0].id));
    }

    #[test]
    fn resolve_maps_copies_to_real_ends() {
        let hs = habits(&["A", "B", "C"]);
        let list = RenderList::build(&hs);
        assert_eq!(list.resolve(0), Some(hs[2].id));
        assert_eq!(list.resolve(2), Some(hs[1].id));
        assert_eq!(list.resolve(4), Some(hs[0].id));
        assert_eq!(list.resolve(5), None);
    }

    #[test]
    fn resolve_against_uses_live_collection() {
        let mut hs = habits(&["A", "B"]);
        let list = RenderList::build(&hs);
        hs.extend(habits(&["C"]));
        assert_eq!(list.resolve_against(0, &hs), Some(hs[2].id));
        assert_eq!(list.resolve_against(3, &hs), Some(hs[0].id));
        assert_eq!(list.resolve_against(1, &hs), Some(hs[0].id));
    }
}
