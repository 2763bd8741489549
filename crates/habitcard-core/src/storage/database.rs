//! SQLite-backed habit storage.
//!
//! Provides persistent storage for:
//! - Habits in collection order
//! - Completion instants of every habit

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

use super::data_dir;
use crate::error::{CoreError, DatabaseError, Result};
use crate::habit::{Habit, HabitId, HabitRepository, HabitTheme};

/// SQLite database for habit storage.
pub struct Database {
    conn: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/habitcard.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("habitcard.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened habit database");
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS habits (
                id          TEXT PRIMARY KEY,
                position    INTEGER NOT NULL,
                name        TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                reward      TEXT NOT NULL DEFAULT '',
                theme       TEXT NOT NULL DEFAULT 'Astro'
            );

            CREATE TABLE IF NOT EXISTS habit_dates (
                habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
                at       TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_habit_dates_habit_id ON habit_dates(habit_id);",
        )?;
        Ok(())
    }

    /// Load every habit in stored order.
    ///
    /// # Errors
    /// Returns an error if a query fails or a stored row cannot be decoded.
    pub fn load_habits(&self) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, reward, theme
             FROM habits ORDER BY position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut dates_stmt = self
            .conn
            .prepare("SELECT at FROM habit_dates WHERE habit_id = ?1 ORDER BY rowid")?;

        let mut habits = Vec::new();
        for row in rows {
            let (id, name, description, reward, theme) = row?;
            let corrupt = |message: String| {
                CoreError::from(DatabaseError::CorruptRow {
                    table: "habits".into(),
                    message,
                })
            };
            let habit_id = HabitId::parse(&id).map_err(|e| corrupt(e.to_string()))?;
            let theme = theme
                .parse::<HabitTheme>()
                .map_err(|e| corrupt(e.to_string()))?;

            let dates = dates_stmt
                .query_map(params![id], |r| r.get::<_, String>(0))?
                .map(|at| {
                    let at = at?;
                    DateTime::parse_from_rfc3339(&at)
                        .map(|d| d.with_timezone(&Utc))
                        .map_err(|e| {
                            CoreError::from(DatabaseError::CorruptRow {
                                table: "habit_dates".into(),
                                message: format!("{at}: {e}"),
                            })
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            habits.push(Habit {
                id: habit_id,
                name,
                description,
                reward,
                theme,
                dates,
            });
        }
        Ok(habits)
    }

    /// Replace the stored collection with `habits` in one transaction.
    ///
    /// # Errors
    /// Returns an error if any statement fails; nothing is written then.
    pub fn replace_habits(&self, habits: &[Habit]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM habit_dates", [])?;
        tx.execute("DELETE FROM habits", [])?;
        {
            let mut insert_habit = tx.prepare_cached(
                "INSERT INTO habits (id, position, name, description, reward, theme)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            let mut insert_date =
                tx.prepare_cached("INSERT INTO habit_dates (habit_id, at) VALUES (?1, ?2)")?;
            for (position, habit) in habits.iter().enumerate() {
                let id = habit.id.to_string();
                insert_habit.execute(params![
                    id,
                    position as i64,
                    habit.name,
                    habit.description,
                    habit.reward,
                    habit.theme.to_string(),
                ])?;
                for at in &habit.dates {
                    insert_date.execute(params![id, at.to_rfc3339()])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl HabitRepository for Database {
    fn load_initial_habits(&self) -> Result<Vec<Habit>> {
        self.load_habits()
    }

    fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        self.replace_habits(habits)
    }
}
