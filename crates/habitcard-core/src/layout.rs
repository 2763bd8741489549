//! Vertical placement of the sections inside a card.
//!
//! Layout runs in two phases. Sections report their measured heights in
//! document order (a height of `None` means the measurement is not ready,
//! e.g. a font is still loading), then [`LayoutPass::resolve`] turns the
//! reports into absolute offsets. Absent sections take no room; a pending
//! section and everything after it stay unplaced until it is measured.

use serde::Serialize;

use crate::habit::Habit;
use crate::storage::LayoutConfig;

/// Extra-small spacing step.
pub const SPACING_XS: f32 = 8.0;
/// Medium spacing step, used as the card's inner horizontal padding.
pub const SPACING_MD: f32 = 16.0;
pub const TITLE_FONT_SIZE: f32 = 24.0;
pub const BODY_FONT_SIZE: f32 = 16.0;
pub const REWARD_TITLE_SIZE: f32 = 16.0;
/// Label row, gap, icon row, gap, bottom padding.
pub const STREAK_HEIGHT: f32 = 16.0 + 8.0 + 24.0 + 8.0 + 8.0;
pub const ALARMS_HEIGHT: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Header,
    Streak,
    Reward,
    Alarms,
}

/// Measures wrapped text. `None` while the measurement cannot be made yet.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font_size: f32, width: f32) -> Option<f32>;
}

/// Fixed-advance approximation: every glyph is `char_width * font_size`
/// wide and lines wrap on character count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            char_width: 0.5,
            line_height: 1.25,
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, font_size: f32, width: f32) -> Option<f32> {
        if text.is_empty() {
            return Some(0.0);
        }
        let advance = self.char_width * font_size;
        let per_line = if advance > 0.0 {
            ((width / advance).floor() as usize).max(1)
        } else {
            usize::MAX
        };
        let lines: usize = text
            .lines()
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum();
        Some(lines as f32 * font_size * self.line_height)
    }
}

/// First phase: collected section heights.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPass {
    spacing: f32,
    entries: Vec<(SectionKind, Option<f32>)>,
}

impl LayoutPass {
    pub fn new(spacing: f32) -> Self {
        Self {
            spacing,
            entries: Vec::new(),
        }
    }

    /// Record the height of `kind`. Reporting a section again replaces its
    /// height but keeps its original position.
    pub fn report(&mut self, kind: SectionKind, height: Option<f32>) -> &mut Self {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = height,
            None => self.entries.push((kind, height)),
        }
        self
    }

    /// Second phase: place sections by prefix sum plus spacing.
    pub fn resolve(&self) -> CardLayout {
        let mut sections = Vec::with_capacity(self.entries.len());
        let mut pending = Vec::new();
        let mut cursor = 0.0f32;

        for (kind, height) in &self.entries {
            if !pending.is_empty() {
                pending.push(*kind);
                continue;
            }
            match height {
                Some(height) => {
                    if !sections.is_empty() {
                        cursor += self.spacing;
                    }
                    sections.push(PlacedSection {
                        kind: *kind,
                        offset_y: cursor,
                        height: *height,
                    });
                    cursor += height;
                }
                None => pending.push(*kind),
            }
        }

        CardLayout {
            sections,
            pending,
            total_height: cursor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedSection {
    pub kind: SectionKind,
    pub offset_y: f32,
    pub height: f32,
}

/// Resolved card layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardLayout {
    pub sections: Vec<PlacedSection>,
    /// Sections not placed yet, in document order.
    pub pending: Vec<SectionKind>,
    /// Height of the placed sections including the gaps between them.
    pub total_height: f32,
}

impl CardLayout {
    pub fn offset_of(&self, kind: SectionKind) -> Option<f32> {
        self.sections
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.offset_y)
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Lay out the back of `habit`'s card.
    ///
    /// Order is header, streak, reward (only when the habit has one), alarms.
    pub fn for_habit(
        habit: &Habit,
        measurer: &impl TextMeasurer,
        config: &LayoutConfig,
    ) -> CardLayout {
        let text_width = (config.card_width as f32 - 2.0 * SPACING_MD).max(0.0);
        let mut pass = LayoutPass::new(config.section_spacing as f32);

        let header = measurer
            .measure(&habit.description, BODY_FONT_SIZE, text_width)
            .map(|description| description + TITLE_FONT_SIZE + SPACING_XS);
        pass.report(SectionKind::Header, header);
        pass.report(SectionKind::Streak, Some(STREAK_HEIGHT));

        if habit.has_reward() {
            let reward = measurer
                .measure(&habit.reward, BODY_FONT_SIZE, text_width)
                .map(|text| REWARD_TITLE_SIZE + SPACING_XS + text);
            pass.report(SectionKind::Reward, reward);
        }

        pass.report(SectionKind::Alarms, Some(ALARMS_HEIGHT));
        pass.resolve()
    }
}
