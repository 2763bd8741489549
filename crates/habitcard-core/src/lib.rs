//! # Habitcard Core Library
//!
//! This library provides the interaction core of a habit tracker whose home
//! screen is a wrap-around carousel of habit cards. Holding the centered
//! card for a few seconds toggles today's completion. The library never
//! renders; it produces the numbers a rendering runtime draws with, and the
//! `habitcard` CLI drives the same core from a terminal.
//!
//! ## Architecture
//!
//! - **Habit Store**: The single owner of the habit collection, persisted
//!   through a [`HabitRepository`] and observed through subscriptions
//! - **Carousel**: Render list with boundary copies, paging with reseek,
//!   press-and-hold gate and per-card transforms, all driven by `tick(now)`
//! - **Layout**: Two-phase placement of the sections inside a card
//! - **Storage**: SQLite habit storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`HabitStore`] / [`StoreHandle`]: Habit collection and its shared handle
//! - [`Carousel`]: Home screen controller
//! - [`Database`]: SQLite-backed [`HabitRepository`]
//! - [`Config`]: Application configuration management

pub mod habit;
pub mod carousel;
pub mod layout;
pub mod storage;
pub mod events;
pub mod error;

pub use habit::{Habit, HabitId, HabitRepository, HabitStore, HabitTheme, NewHabit, StoreHandle, ToggleOutcome};
pub use carousel::{Carousel, Frame, HoldGate, PagingController, RenderList, Settle};
pub use layout::{CardLayout, LayoutPass, MonospaceMeasurer, SectionKind, TextMeasurer};
pub use storage::{Config, Database};
pub use events::Event;
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
