//! The habit collection and the handle components share it through.
//!
//! `HabitStore` is the only owner of the habit list. Controllers get a
//! [`StoreHandle`] injected; renderers call [`StoreHandle::snapshot`] and
//! never hold a reference into the list. Mutations are persisted through the
//! [`HabitRepository`] and then announced to subscribers, which are expected
//! to re-pull a snapshot rather than read the store from inside the callback.

use chrono::{DateTime, Local, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use super::model::{Habit, HabitId, NewHabit};
use super::repository::{HabitRepository, MemoryRepository};
use crate::error::Result;
use crate::events::Event;

/// Result of a toggle on a well-formed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Toggled {
        id: HabitId,
        checked: bool,
        count: usize,
    },
    /// No habit carries this id; the collection is unchanged.
    NotFound { id: HabitId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&Event) + Send + Sync>;

pub struct HabitStore {
    habits: Vec<Habit>,
    repository: Mutex<Box<dyn HabitRepository>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for HabitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HabitStore")
            .field("habits", &self.habits)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl HabitStore {
    /// Build the store from whatever the repository holds.
    pub fn load(repository: impl HabitRepository + 'static) -> Result<Self> {
        let habits = repository.load_initial_habits()?;
        tracing::debug!(count = habits.len(), "loaded habits");
        Ok(Self {
            habits,
            repository: Mutex::new(Box::new(repository)),
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Empty store backed by a throwaway [`MemoryRepository`].
    pub fn in_memory() -> Self {
        Self {
            habits: Vec::new(),
            repository: Mutex::new(Box::new(MemoryRepository::new())),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn snapshot(&self) -> Vec<Habit> {
        self.habits.clone()
    }

    pub fn get(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == *id)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a new habit. Fails only on a blank name.
    pub fn add(&mut self, input: NewHabit) -> Result<HabitId> {
        let habit = input.into_habit()?;
        let id = habit.id;
        let event = Event::HabitAdded {
            id,
            name: habit.name.clone(),
            at: Utc::now(),
        };
        tracing::info!(%id, name = %habit.name, "habit added");
        self.habits.push(habit);
        self.persist();
        self.notify(&event);
        Ok(id)
    }

    /// Toggle today's completion for the habit with the given id.
    pub fn toggle_today(&mut self, id: &str) -> Result<ToggleOutcome> {
        self.toggle_at(id, Local::now())
    }

    /// Toggle the calendar day of `now`.
    ///
    /// A malformed id is an error and leaves the collection untouched. A
    /// well-formed id that matches nothing is reported as
    /// [`ToggleOutcome::NotFound`].
    pub fn toggle_at(&mut self, id: &str, now: DateTime<Local>) -> Result<ToggleOutcome> {
        let id = HabitId::parse(id)?;
        Ok(self.toggle_id_at(id, now))
    }

    pub fn toggle_id_at(&mut self, id: HabitId, now: DateTime<Local>) -> ToggleOutcome {
        let Some(habit) = self.habits.iter_mut().find(|h| h.id == id) else {
            tracing::debug!(%id, "toggle ignored: no such habit");
            return ToggleOutcome::NotFound { id };
        };

        let checked = habit.toggle_at(now);
        let count = habit.count();
        tracing::info!(%id, checked, count, "habit toggled");

        self.persist();
        self.notify(&Event::HabitToggled {
            id,
            checked,
            count,
            at: now.with_timezone(&Utc),
        });
        ToggleOutcome::Toggled { id, checked, count }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Register a listener called after every mutation.
    ///
    /// Listeners run while the store is borrowed mutably; they must not call
    /// back into the store.
    pub fn subscribe(&mut self, listener: impl Fn(&Event) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn persist(&self) {
        if let Err(e) = self.repository.lock().save_habits(&self.habits) {
            tracing::warn!(error = %e, "failed to persist habits");
        }
    }

    fn notify(&self, event: &Event) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }
}

/// Shared, lock-protected handle to the single [`HabitStore`].
#[derive(Debug, Clone)]
pub struct StoreHandle {
    inner: Arc<RwLock<HabitStore>>,
}

impl StoreHandle {
    pub fn new(store: HabitStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Consistent copy of the collection; taken under one read lock.
    pub fn snapshot(&self) -> Vec<Habit> {
        self.inner.read().snapshot()
    }

    pub fn get(&self, id: &HabitId) -> Option<Habit> {
        self.inner.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn add(&self, input: NewHabit) -> Result<HabitId> {
        self.inner.write().add(input)
    }

    pub fn toggle_today(&self, id: &str) -> Result<ToggleOutcome> {
        self.inner.write().toggle_today(id)
    }

    pub fn toggle_at(&self, id: &str, now: DateTime<Local>) -> Result<ToggleOutcome> {
        self.inner.write().toggle_at(id, now)
    }

    pub fn toggle_id_at(&self, id: HabitId, now: DateTime<Local>) -> ToggleOutcome {
        self.inner.write().toggle_id_at(id, now)
    }

    pub fn subscribe(&self, listener: impl Fn(&Event) + Send + Sync + 'static) -> SubscriptionId {
        self.inner.write().subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.write().unsubscribe(id)
    }
}
