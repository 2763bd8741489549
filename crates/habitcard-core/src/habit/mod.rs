mod model;
mod repository;
mod store;
mod theme;

pub use model::{DayMark, Habit, HabitId, NewHabit};
pub use repository::{HabitRepository, MemoryRepository};
pub use store::{HabitStore, StoreHandle, SubscriptionId, ToggleOutcome};
pub use theme::{HabitTheme, ThemeData, ThemeIcons};
