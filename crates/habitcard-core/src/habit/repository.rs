use parking_lot::Mutex;
use std::sync::Arc;

use super::model::Habit;
use crate::error::Result;

/// Durable home of the habit collection.
///
/// The store loads once at startup and saves the whole collection after
/// every mutation.
pub trait HabitRepository: Send {
    fn load_initial_habits(&self) -> Result<Vec<Habit>>;

    fn save_habits(&self, habits: &[Habit]) -> Result<()>;
}

/// In-memory repository. Clones share the same backing vector, so a test
/// can keep one handle and inspect what the store saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    habits: Arc<Mutex<Vec<Habit>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_habits(habits: Vec<Habit>) -> Self {
        Self {
            habits: Arc::new(Mutex::new(habits)),
            saves: Arc::default(),
        }
    }

    pub fn saved(&self) -> Vec<Habit> {
        self.habits.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl HabitRepository for MemoryRepository {
    fn load_initial_habits(&self) -> Result<Vec<Habit>> {
        Ok(self.habits.lock().clone())
    }

    fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        *self.habits.lock() = habits.to_vec();
        *self.saves.lock() += 1;
        Ok(())
    }
}
