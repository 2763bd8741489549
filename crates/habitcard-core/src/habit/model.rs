//! Habit record and its identifier.
//!
//! A habit's streak is the number of stored completion instants. A calendar
//! day counts as done when any instant falls on it in local time, so toggling
//! today either appends `now` or drops every instant of today.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::theme::HabitTheme;
use crate::error::ValidationError;

/// Opaque habit identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(Uuid);

impl HabitId {
    /// Fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a canonical hyphenated v4 id.
    ///
    /// Anything else (sentinel keys such as `"first"`, braced or simple uuid
    /// forms, other versions) is rejected with `InvalidIdentifier`.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidIdentifier {
            value: value.to_string(),
        };
        if value.len() != 36 {
            return Err(invalid());
        }
        let uuid = Uuid::try_parse(value).map_err(|_| invalid())?;
        if uuid.get_version_num() != 4 || uuid.get_variant() != uuid::Variant::RFC4122 {
            return Err(invalid());
        }
        Ok(Self(uuid))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// One cell of the Monday..Sunday strip drawn in the streak section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayMark {
    pub label: char,
    pub date: NaiveDate,
    pub checked: bool,
}

const WEEKDAY_LABELS: [char; 7] = ['M', 'T', 'W', 'T', 'F', 'S', 'S'];

/// A trackable recurring commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reward: String,
    #[serde(default)]
    pub theme: HabitTheme,
    /// Completion instants; order carries no meaning.
    #[serde(default)]
    pub dates: Vec<DateTime<Utc>>,
}

impl Habit {
    pub fn count(&self) -> usize {
        self.dates.len()
    }

    pub fn has_reward(&self) -> bool {
        !self.reward.trim().is_empty()
    }

    pub fn is_checked_on(&self, day: NaiveDate) -> bool {
        self.dates.iter().any(|d| local_day(d) == day)
    }

    pub fn is_today_checked(&self) -> bool {
        self.is_checked_on(Local::now().date_naive())
    }

    /// Flip the presence of `now`'s calendar day. Returns the new state.
    pub fn toggle_at(&mut self, now: DateTime<Local>) -> bool {
        let today = now.date_naive();
        if self.is_checked_on(today) {
            self.dates.retain(|d| local_day(d) != today);
            false
        } else {
            self.dates.push(now.with_timezone(&Utc));
            true
        }
    }

    /// Days of the week containing `today`, Monday first.
    pub fn week_strip(&self, today: NaiveDate) -> [DayMark; 7] {
        let monday = today
            .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
            .unwrap_or(today);
        std::array::from_fn(|i| {
            let date = monday
                .checked_add_days(Days::new(i as u64))
                .unwrap_or(monday);
            DayMark {
                label: WEEKDAY_LABELS[i],
                date,
                checked: self.is_checked_on(date),
            }
        })
    }
}

fn local_day(instant: &DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Input of the creation form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reward: Option<String>,
    #[serde(default)]
    pub theme: Option<HabitTheme>,
}

impl NewHabit {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn reward(mut self, reward: impl Into<String>) -> Self {
        self.reward = Some(reward.into());
        self
    }

    pub fn theme(mut self, theme: HabitTheme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Validate and materialize with a fresh id and no completions.
    pub fn into_habit(self) -> Result<Habit, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Habit {
            id: HabitId::generate(),
            name: name.to_string(),
            description: self.description.unwrap_or_default(),
            reward: self.reward.unwrap_or_default(),
            theme: self.theme.unwrap_or_default(),
            dates: Vec::new(),
        })
    }
}
