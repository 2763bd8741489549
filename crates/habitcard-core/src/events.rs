use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::habit::HabitId;

/// Every state change in the system produces an Event.
/// Store listeners receive the habit events; the carousel returns the card
/// events from its input handlers and `tick()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HabitAdded {
        id: HabitId,
        name: String,
        at: DateTime<Utc>,
    },
    HabitToggled {
        id: HabitId,
        checked: bool,
        count: usize,
        at: DateTime<Utc>,
    },
    /// Well-formed id that matched no habit; nothing changed.
    ToggleIgnored {
        id: HabitId,
        at: DateTime<Utc>,
    },
    /// The list landed on a duplicate and jumped to its real counterpart.
    CardReseeked {
        from_index: usize,
        to_index: usize,
        offset: f32,
        at: DateTime<Utc>,
    },
    HoldStarted {
        index: usize,
        at: DateTime<Utc>,
    },
    HoldCanceled {
        index: usize,
        held_ms: u64,
        at: DateTime<Utc>,
    },
    HoldCommitted {
        index: usize,
        habit_id: HabitId,
        at: DateTime<Utc>,
    },
    RenderListRebuilt {
        len: usize,
        at: DateTime<Utc>,
    },
}
