use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Visual bundle a habit card is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HabitTheme {
    #[default]
    Astro,
    Sport,
}

/// Icon pair for the weekly streak strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeIcons {
    pub active: &'static str,
    pub inactive: &'static str,
}

/// Color, icons and background image resolved from a [`HabitTheme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeData {
    pub name: &'static str,
    pub color: &'static str,
    pub icon: ThemeIcons,
    pub image: &'static str,
}

const ASTRO: ThemeData = ThemeData {
    name: "Astro",
    color: "#6C5CE7",
    icon: ThemeIcons {
        active: "blingFill",
        inactive: "blingLine",
    },
    image: "images/astronauts.png",
};

const SPORT: ThemeData = ThemeData {
    name: "Sport",
    color: "#E17055",
    icon: ThemeIcons {
        active: "barbellFill",
        inactive: "barbellLine",
    },
    image: "images/dumbbells.png",
};

impl HabitTheme {
    pub const ALL: [HabitTheme; 2] = [HabitTheme::Astro, HabitTheme::Sport];

    pub fn data(self) -> &'static ThemeData {
        match self {
            HabitTheme::Astro => &ASTRO,
            HabitTheme::Sport => &SPORT,
        }
    }
}

impl fmt::Display for HabitTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.data().name)
    }
}

impl FromStr for HabitTheme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HabitTheme::ALL
            .into_iter()
            .find(|theme| theme.data().name.eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "theme".into(),
                message: format!("unknown theme '{s}' (expected astro or sport)"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("sport".parse::<HabitTheme>().unwrap(), HabitTheme::Sport);
        assert_eq!(" ASTRO ".parse::<HabitTheme>().unwrap(), HabitTheme::Astro);
        assert!("forest".parse::<HabitTheme>().is_err());
    }

    #[test]
    fn each_theme_has_distinct_icons() {
        assert_ne!(HabitTheme::Astro.data().icon, HabitTheme::Sport.data().icon);
        assert_eq!(HabitTheme::default(), HabitTheme::Astro);
    }
}
