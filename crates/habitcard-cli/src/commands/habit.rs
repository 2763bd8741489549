use chrono::Local;
use clap::Subcommand;
use habitcard_core::{HabitId, HabitTheme, NewHabit, ToggleOutcome};
use serde_json::json;

use super::open_store;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Longer description shown on the back of the card
        #[arg(long)]
        description: Option<String>,
        /// Reward promised for keeping the streak
        #[arg(long)]
        reward: Option<String>,
        /// Card theme (astro, sport)
        #[arg(long)]
        theme: Option<HabitTheme>,
    },
    /// List habits
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle today's completion of a habit
    Toggle {
        /// Habit ID
        id: String,
    },
    /// Show one habit with this week's strip
    Show {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;

    match action {
        HabitAction::Add {
            name,
            description,
            reward,
            theme,
        } => {
            let input = NewHabit {
                name,
                description,
                reward,
                theme,
            };
            let id = store.add(input)?;
            println!("Habit created: {id}");
        }
        HabitAction::List { json } => {
            let habits = store.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                println!("No habits yet.");
            } else {
                for habit in &habits {
                    let mark = if habit.is_today_checked() { "x" } else { " " };
                    println!(
                        "[{mark}] {}  {}  streak {}",
                        habit.id,
                        habit.name,
                        habit.count()
                    );
                }
            }
        }
        HabitAction::Toggle { id } => match store.toggle_today(&id)? {
            ToggleOutcome::Toggled { id, checked, count } => {
                let out = json!({
                    "type": "toggled",
                    "id": id,
                    "checked": checked,
                    "count": count,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            ToggleOutcome::NotFound { id } => {
                let out = json!({ "type": "ignored", "id": id });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
        },
        HabitAction::Show { id } => {
            let id = HabitId::parse(&id)?;
            let Some(habit) = store.get(&id) else {
                eprintln!("habit not found: {id}");
                std::process::exit(1);
            };
            let today = Local::now().date_naive();
            let out = json!({
                "habit": habit,
                "count": habit.count(),
                "checked_today": habit.is_checked_on(today),
                "week": habit.week_strip(today),
                "theme": habit.theme.data(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
