//! Scroll offset tracking and page settling.
//!
//! `on_scroll` is the hot path (every frame of a drag) and only records the
//! offset. Index math happens when momentum ends: landing on one of the
//! boundary copies produces a [`Settle::Reseek`] telling the list to jump,
//! without animation, to the real card the copy stands for.

use serde::Serialize;

/// Outcome of a settled scroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Settle {
    Rest { index: usize },
    Reseek { from: usize, to: usize, offset: f32 },
}

impl Settle {
    pub fn index(&self) -> usize {
        match *self {
            Settle::Rest { index } => index,
            Settle::Reseek { to, .. } => to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagingController {
    page_width: f32,
    spacing: f32,
    real_len: usize,
    scroll_offset: f32,
    current_index: usize,
}

impl PagingController {
    /// Start centered on the first real card.
    pub fn new(page_width: f32, spacing: f32, real_len: usize) -> Self {
        let mut paging = Self {
            page_width,
            spacing,
            real_len,
            scroll_offset: 0.0,
            current_index: 0,
        };
        paging.current_index = paging.first_real_index();
        paging.scroll_offset = paging.offset_for(paging.current_index);
        paging
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_duplicated(&self) -> bool {
        self.real_len > 1
    }

    /// Distance between two neighbouring snap points.
    pub fn stride(&self) -> f32 {
        self.page_width + self.spacing
    }

    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    pub fn real_len(&self) -> usize {
        self.real_len
    }

    pub fn render_len(&self) -> usize {
        if self.is_duplicated() {
            self.real_len + 2
        } else {
            self.real_len
        }
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Index of the centered card as of the last settle.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Offset the list should be mounted at.
    pub fn initial_offset(&self) -> f32 {
        self.offset_for(self.first_real_index())
    }

    pub fn offset_for(&self, index: usize) -> f32 {
        index as f32 * self.stride()
    }

    pub fn snap_offsets(&self) -> Vec<f32> {
        (0..self.render_len()).map(|i| self.offset_for(i)).collect()
    }

    /// Card nearest to `offset`, without clamping.
    pub fn nearest_index(&self, offset: f32) -> usize {
        let stride = self.stride();
        if stride <= 0.0 {
            return 0;
        }
        (offset / stride).round().max(0.0) as usize
    }

    /// Best guess of the centered real card while a scroll is in flight.
    ///
    /// Clamped to the real range so a late jump never points past the list.
    pub fn live_index(&self) -> usize {
        let index = self.nearest_index(self.scroll_offset);
        if self.is_duplicated() {
            index.clamp(1, self.real_len)
        } else {
            index.min(self.real_len.saturating_sub(1))
        }
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn on_scroll(&mut self, offset: f32) {
        self.scroll_offset = offset;
    }

    pub fn on_momentum_end(&mut self, offset: f32) -> Settle {
        self.scroll_offset = offset;
        let index = self
            .nearest_index(offset)
            .min(self.render_len().saturating_sub(1));

        if self.is_duplicated() && (index == 0 || index == self.real_len + 1) {
            let to = if index == 0 { self.real_len } else { 1 };
            let target = self.offset_for(to);
            tracing::debug!(from = index, to, "reseek to real card");
            self.scroll_offset = target;
            self.current_index = to;
            return Settle::Reseek {
                from: index,
                to,
                offset: target,
            };
        }

        self.current_index = index;
        Settle::Rest {
            index: self.current_index,
        }
    }

    /// Adjust to a rebuilt list of `real_len` habits, keeping the same real
    /// card centered when it still exists.
    pub fn set_real_len(&mut self, real_len: usize) {
        if real_len == self.real_len {
            return;
        }
        let real_position = if self.is_duplicated() {
            self.current_index.saturating_sub(1)
        } else {
            self.current_index
        };

        self.real_len = real_len;
        let last_real = real_len.saturating_sub(1);
        let position = real_position.min(last_real);
        self.current_index = if self.is_duplicated() {
            position + 1
        } else {
            position
        };
        self.scroll_offset = self.offset_for(self.current_index);
    }

    pub fn set_page_width(&mut self, page_width: f32) {
        self.page_width = page_width;
        self.scroll_offset = self.offset_for(self.current_index);
    }

    fn first_real_index(&self) -> usize {
        usize::from(self.is_duplicated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_first_real_card() {
        let paging = PagingController::new(300.0, 0.0, 3);
        assert_eq!(paging.current_index(), 1);
        assert_eq!(paging.initial_offset(), 300.0);
        assert_eq!(paging.render_len(), 5);
        assert_eq!(
            paging.snap_offsets(),
            vec![0.0, 300.0, 600.0, 900.0, 1200.0]
        );
    }

    #[test]
    fn landing_on_leading_copy_jumps_to_real_last() {
        let mut paging = PagingController::new(300.0, 0.0, 3);
        let settle = paging.on_momentum_end(0.0);
        assert_eq!(
            settle,
            Settle::Reseek {
                from: 0,
                to: 3,
                offset: 900.0
            }
        );
        assert_eq!(paging.current_index(), 3);
        assert_eq!(paging.scroll_offset(), 900.0);
    }

    #[test]
    fn landing_on_trailing_copy_jumps_to_real_first() {
        let mut paging = PagingController::new(300.0, 0.0, 3);
        let settle = paging.on_momentum_end(1200.0);
        assert_eq!(settle.index(), 1);
        assert!(matches!(settle, Settle::Reseek { from: 4, to: 1, .. }));
        assert_eq!(paging.scroll_offset(), 300.0);
    }

    #[test]
    fn overshooting_past_trailing_copy_reseeks_to_first() {
        let mut paging = PagingController::new(300.0, 0.0, 3);
        let settle = paging.on_momentum_end(1500.0);
        assert_eq!(
            settle,
            Settle::Reseek {
                from: 4,
                to: 1,
                offset: 300.0
            }
        );
        assert_eq!(paging.current_index(), 1);

        paging.on_momentum_end(9000.0);
        assert!((1..=3).contains(&paging.current_index()));
    }

    #[test]
    fn landing_on_real_card_rests() {
        let mut paging = PagingController::new(300.0, 0.0, 3);
        assert_eq!(paging.on_momentum_end(610.0), Settle::Rest { index: 2 });
        assert_eq!(paging.current_index(), 2);
    }

    #[test]
    fn single_card_never_reseeks() {
        let mut paging = PagingController::new(300.0, 0.0, 1);
        assert_eq!(paging.current_index(), 0);
        assert_eq!(paging.on_momentum_end(0.0), Settle::Rest { index: 0 });
        assert_eq!(paging.on_momentum_end(400.0), Settle::Rest { index: 0 });
    }

    #[test]
    fn spacing_widens_stride() {
        let mut paging = PagingController::new(300.0, 32.0, 2);
        assert_eq!(paging.initial_offset(), 332.0);
        assert_eq!(paging.on_momentum_end(664.0), Settle::Rest { index: 2 });
        assert!(matches!(
            paging.on_momentum_end(996.0),
            Settle::Reseek { to: 1, .. }
        ));
    }

    #[test]
    fn live_index_stays_in_real_range() {
        let mut paging = PagingController::new(300.0, 0.0, 3);
        paging.on_scroll(20.0);
        assert_eq!(paging.live_index(), 1);
        paging.on_scroll(1190.0);
        assert_eq!(paging.live_index(), 3);
        paging.on_scroll(610.0);
        assert_eq!(paging.live_index(), 2);
    }

    #[test]
    fn growing_list_keeps_current_real_card() {
        let mut paging = PagingController::new(300.0, 0.0, 1);
        paging.set_real_len(2);
        assert_eq!(paging.current_index(), 1);
        assert_eq!(paging.scroll_offset(), 300.0);

        paging.on_momentum_end(600.0);
        paging.set_real_len(3);
        assert_eq!(paging.current_index(), 2);
    }
}
