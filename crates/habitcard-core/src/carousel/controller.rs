//! Home screen carousel: the composition of everything in this module.
//!
//! The controller owns no thread. Input handlers take the current monotonic
//! time in milliseconds and `tick()` is called once per frame; both return
//! the [`Event`]s the call produced. Habit mutations go through the injected
//! [`StoreHandle`] and the carousel learns about them from its subscription,
//! which only raises a flag: the render list is rebuilt from a fresh
//! snapshot on the next `tick()`.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::hold::{HoldEvent, HoldGate};
use super::paging::{PagingController, Settle};
use super::render::RenderList;
use super::transform::{
    card_transform, Backdrop, CardGeometry, CardInputs, CardTransform, CardVariant, FlipState,
    PressAnimator, PressProfile, TiltState,
};
use crate::events::Event;
use crate::habit::{Habit, HabitId, StoreHandle, SubscriptionId, ThemeData, ToggleOutcome};
use crate::storage::Config;

type Clock = Box<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Interaction state of one rendered card.
#[derive(Debug, Clone)]
struct CardState {
    gate: HoldGate,
    press: PressAnimator,
    tilt: TiltState,
    flip: FlipState,
}

impl CardState {
    fn new(profile: &PressProfile, relax_on_commit: bool) -> Self {
        Self {
            gate: HoldGate::new(profile.complete_ms).relax_on_commit(relax_on_commit),
            press: PressAnimator::new(profile),
            tilt: TiltState::default(),
            flip: FlipState::default(),
        }
    }
}

/// What the renderer needs to draw one card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardFrame {
    pub index: usize,
    pub key: String,
    /// Real habit this card stands for; copies point at the far end.
    pub habit_id: Option<HabitId>,
    pub name: String,
    pub checked: bool,
    pub count: usize,
    /// Share of the hold duration elapsed.
    pub progress: f32,
    pub transform: CardTransform,
}

/// One rendered frame of the home screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub cards: Vec<CardFrame>,
    pub backdrop_opacity: f32,
    /// Theme of the card nearest the center, for the screen background.
    pub background: &'static ThemeData,
    pub current_index: usize,
}

pub struct Carousel {
    store: StoreHandle,
    subscription: SubscriptionId,
    dirty: Arc<AtomicBool>,
    reactive: bool,
    clock: Clock,

    profile: PressProfile,
    geometry: CardGeometry,
    variant: CardVariant,
    far_scale: f32,
    relax_on_commit: bool,
    tilt_sensitivity: f32,
    tilt_return_ms: u64,
    flip_ms: u64,

    render: RenderList,
    paging: PagingController,
    cards: Vec<CardState>,
    backdrop: Backdrop,
}

impl std::fmt::Debug for Carousel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carousel")
            .field("render", &self.render)
            .field("paging", &self.paging)
            .field("reactive", &self.reactive)
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

impl Carousel {
    /// Mount the carousel over `store`, centered on the first real habit.
    pub fn new(store: StoreHandle, config: &Config) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dirty);
        let subscription = store.subscribe(move |_| flag.store(true, Ordering::Release));

        let habits = store.snapshot();
        let render = RenderList::build(&habits);
        let paging = PagingController::new(
            config.carousel.page_width as f32,
            config.carousel.card_spacing as f32,
            habits.len(),
        );
        let profile = config.press_profile();
        let relax_on_commit = config.hold.commit_relaxes_immediately;
        let cards = (0..render.len())
            .map(|_| CardState::new(&profile, relax_on_commit))
            .collect();

        tracing::debug!(len = render.len(), "carousel mounted");

        Self {
            store,
            subscription,
            dirty,
            reactive: config.carousel.reactive_render_list,
            clock: Box::new(Local::now),
            profile,
            geometry: config.geometry(),
            variant: config.carousel.variant,
            far_scale: config.carousel.far_scale as f32,
            relax_on_commit,
            tilt_sensitivity: config.tilt.sensitivity as f32,
            tilt_return_ms: config.tilt.return_ms,
            flip_ms: config.tilt.flip_ms,
            render,
            paging,
            cards,
            backdrop: Backdrop::default(),
        }
    }

    /// Replace the wall clock used to decide which calendar day a commit
    /// toggles.
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> DateTime<Local> + Send + Sync + 'static,
    ) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn render_list(&self) -> &RenderList {
        &self.render
    }

    pub fn paging(&self) -> &PagingController {
        &self.paging
    }

    pub fn profile(&self) -> &PressProfile {
        &self.profile
    }

    pub fn gate(&self, index: usize) -> Option<&HoldGate> {
        self.cards.get(index).map(|c| &c.gate)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Sample every card at `now_ms`.
    pub fn frame(&self, now_ms: u64) -> Frame {
        let live = self.store.snapshot();
        let today = (self.clock)().date_naive();

        let cards = self
            .render
            .items()
            .iter()
            .zip(&self.cards)
            .enumerate()
            .map(|(index, (item, card))| {
                // Real cards always show live data; copies show what they
                // were built from.
                let habit = item
                    .real_id
                    .and_then(|id| live.iter().find(|h| h.id == id))
                    .unwrap_or(&item.habit);
                let transform = card_transform(
                    CardInputs {
                        now_ms,
                        scroll_offset: self.paging.scroll_offset(),
                        stride: self.paging.stride(),
                        index,
                        far_scale: self.far_scale,
                        profile: &self.profile,
                        geometry: &self.geometry,
                    },
                    &card.press,
                    &card.tilt,
                    &card.flip,
                );
                CardFrame {
                    index,
                    key: item.key(),
                    habit_id: self.render.resolve(index),
                    name: habit.name.clone(),
                    checked: habit.is_checked_on(today),
                    count: habit.count(),
                    progress: card.gate.progress(now_ms),
                    transform,
                }
            })
            .collect();

        let background = self
            .render
            .get(self.paging.live_index())
            .map(|item| item.habit.theme)
            .unwrap_or_default()
            .data();

        Frame {
            cards,
            backdrop_opacity: self.backdrop.opacity(now_ms),
            background,
            current_index: self.paging.current_index(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn on_scroll(&mut self, offset: f32) {
        self.paging.on_scroll(offset);
    }

    /// Settle the scroll. Landing on a boundary copy jumps to the real card.
    pub fn on_momentum_end(&mut self, offset: f32) -> Option<Event> {
        match self.paging.on_momentum_end(offset) {
            Settle::Rest { .. } => None,
            Settle::Reseek { from, to, offset } => Some(Event::CardReseeked {
                from_index: from,
                to_index: to,
                offset,
                at: self.now_utc(),
            }),
        }
    }

    /// Finger down on the card at `index`. Only the centered card reacts.
    pub fn press_start(&mut self, index: usize, now_ms: u64) -> Option<Event> {
        let is_current = index == self.paging.current_index();
        let card = self.cards.get_mut(index)?;
        match card.gate.press_start(now_ms, is_current)? {
            HoldEvent::Started => {
                card.press.press(now_ms, &self.profile);
                self.backdrop.show(now_ms, &self.profile);
                tracing::debug!(index, "hold started");
                Some(Event::HoldStarted {
                    index,
                    at: self.now_utc(),
                })
            }
            _ => None,
        }
    }

    /// Finger lifted from the card at `index`.
    pub fn press_end(&mut self, index: usize, now_ms: u64) -> Vec<Event> {
        let Some(card) = self.cards.get_mut(index) else {
            return Vec::new();
        };
        let Some(event) = card.gate.press_end(now_ms) else {
            return Vec::new();
        };

        let mut events = Vec::new();
        match event {
            HoldEvent::Committed { .. } => events.extend(self.commit(index)),
            HoldEvent::Canceled { held_ms } => {
                tracing::debug!(index, held_ms, "hold canceled");
                events.push(Event::HoldCanceled {
                    index,
                    held_ms,
                    at: self.now_utc(),
                });
            }
            HoldEvent::Released | HoldEvent::Started => {}
        }
        self.relax(index, now_ms);
        events
    }

    /// Advance timers. Call once per frame.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events: Vec<Event> = self.refresh().into_iter().collect();

        let fired: Vec<usize> = self
            .cards
            .iter_mut()
            .enumerate()
            .filter_map(|(index, card)| {
                matches!(card.gate.tick(now_ms), Some(HoldEvent::Committed { .. }))
                    .then_some(index)
            })
            .collect();

        for index in fired {
            events.extend(self.commit(index));
            if self.relax_on_commit {
                self.relax(index, now_ms);
            }
        }
        events
    }

    /// Rebuild the render list if the store changed since the last rebuild.
    ///
    /// With a non-reactive render list the notification is dropped and the
    /// list keeps the shape it was mounted with.
    pub fn refresh(&mut self) -> Option<Event> {
        if !self.dirty.swap(false, Ordering::AcqRel) || !self.reactive {
            return None;
        }
        Some(self.rebuild())
    }

    /// Unconditionally rebuild the render list from a fresh snapshot.
    pub fn rebuild(&mut self) -> Event {
        let habits = self.store.snapshot();
        let previous_len = self.render.len();
        self.render = RenderList::build(&habits);
        self.paging.set_real_len(habits.len());

        if self.render.len() != previous_len {
            // Indices shifted; any hold in progress no longer points at the
            // card it started on.
            self.cards.clear();
            self.backdrop = Backdrop::default();
        }
        let (profile, relax) = (self.profile, self.relax_on_commit);
        self.cards
            .resize_with(self.render.len(), || CardState::new(&profile, relax));

        tracing::debug!(len = self.render.len(), "render list rebuilt");
        Event::RenderListRebuilt {
            len: self.render.len(),
            at: self.now_utc(),
        }
    }

    pub fn on_pan_change(&mut self, index: usize, now_ms: u64, dx: f32, dy: f32) {
        let sensitivity = self.tilt_sensitivity;
        if let Some(card) = self.cards.get_mut(index) {
            card.tilt.on_pan_change(now_ms, dx, dy, sensitivity);
        }
    }

    pub fn on_pan_end(&mut self, index: usize, now_ms: u64) {
        let return_ms = self.tilt_return_ms;
        if let Some(card) = self.cards.get_mut(index) {
            card.tilt.on_pan_end(now_ms, return_ms);
        }
    }

    /// Flip the card over. Returns false when the variant has no back face.
    pub fn toggle_flip(&mut self, index: usize, now_ms: u64) -> bool {
        if !self.variant.can_flip() {
            return false;
        }
        let flip_ms = self.flip_ms;
        match self.cards.get_mut(index) {
            Some(card) => {
                card.flip.toggle(now_ms, flip_ms);
                true
            }
            None => false,
        }
    }

    pub fn set_page_width(&mut self, page_width: f32) {
        self.paging.set_page_width(page_width);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn now_utc(&self) -> DateTime<Utc> {
        (self.clock)().with_timezone(&Utc)
    }

    /// Toggle the real habit behind `index` and report what happened.
    fn commit(&mut self, index: usize) -> Vec<Event> {
        let live: Vec<Habit> = self.store.snapshot();
        let Some(habit_id) = self.render.resolve_against(index, &live) else {
            tracing::warn!(index, "hold committed on a card with no habit behind it");
            return Vec::new();
        };

        tracing::info!(index, %habit_id, "hold committed");
        let when = (self.clock)();
        let at = when.with_timezone(&Utc);
        let mut events = vec![Event::HoldCommitted {
            index,
            habit_id,
            at,
        }];
        match self.store.toggle_id_at(habit_id, when) {
            ToggleOutcome::Toggled { id, checked, count } => events.push(Event::HabitToggled {
                id,
                checked,
                count,
                at,
            }),
            ToggleOutcome::NotFound { id } => events.push(Event::ToggleIgnored { id, at }),
        }
        events
    }

    fn relax(&mut self, index: usize, now_ms: u64) {
        if let Some(card) = self.cards.get_mut(index) {
            if card.press.is_vibrating() {
                card.press.release(now_ms, &self.profile);
                self.backdrop.hide(now_ms, &self.profile);
            }
        }
    }
}

impl Drop for Carousel {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{HabitStore, NewHabit};
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 5, 6, 12, 0, 0).unwrap()
    }

    fn mount(names: &[&str], config: &Config) -> (StoreHandle, Carousel) {
        let store = StoreHandle::new(HabitStore::in_memory());
        for name in names {
            store.add(NewHabit::named(*name)).unwrap();
        }
        let carousel = Carousel::new(store.clone(), config).with_clock(fixed_clock);
        (store, carousel)
    }

    #[test]
    fn mounts_on_first_real_card() {
        let (_, carousel) = mount(&["A", "B", "C"], &Config::default());
        assert_eq!(carousel.render_list().len(), 5);
        assert_eq!(carousel.paging().current_index(), 1);
        assert_eq!(carousel.paging().scroll_offset(), 390.0);

        let frame = carousel.frame(0);
        assert_eq!(frame.cards.len(), 5);
        assert_eq!(frame.cards[1].transform.scale, 1.0);
        assert_eq!(frame.backdrop_opacity, 0.0);
    }

    #[test]
    fn press_on_off_center_card_is_ignored() {
        let (_, mut carousel) = mount(&["A", "B", "C"], &Config::default());
        assert!(carousel.press_start(2, 0).is_none());
        assert!(carousel.press_start(1, 0).is_some());
        // a second finger on the held card does nothing
        assert!(carousel.press_start(1, 10).is_none());
    }

    #[test]
    fn full_hold_toggles_exactly_once() {
        let (store, mut carousel) = mount(&["A", "B", "C"], &Config::default());
        carousel.press_start(1, 0);
        assert!(carousel.tick(2999).is_empty());

        let events = carousel.tick(3000);
        assert!(matches!(events[0], Event::HoldCommitted { index: 1, .. }));
        assert!(matches!(
            events[1],
            Event::HabitToggled {
                checked: true,
                count: 1,
                ..
            }
        ));
        let later = carousel.tick(3100);
        assert!(matches!(later[..], [Event::RenderListRebuilt { len: 5, .. }]));
        assert!(carousel.press_end(1, 3200).is_empty());
        assert_eq!(store.snapshot()[0].count(), 1);
    }

    #[test]
    fn early_release_cancels() {
        let (store, mut carousel) = mount(&["A", "B"], &Config::default());
        carousel.press_start(1, 0);
        let events = carousel.press_end(1, 1200);
        assert!(matches!(
            events[..],
            [Event::HoldCanceled {
                index: 1,
                held_ms: 1200,
                ..
            }]
        ));
        assert!(carousel.tick(5000).is_empty());
        assert_eq!(store.snapshot()[0].count(), 0);
    }

    #[test]
    fn release_at_deadline_commits() {
        let (store, mut carousel) = mount(&["A", "B"], &Config::default());
        carousel.press_start(1, 0);
        let events = carousel.press_end(1, 3000);
        assert!(matches!(events[0], Event::HoldCommitted { .. }));
        assert_eq!(store.snapshot()[0].count(), 1);
    }

    #[test]
    fn hold_after_wrapping_toggles_the_real_habit() {
        let (store, mut carousel) = mount(&["A", "B", "C"], &Config::default());
        // land on the leading copy of C; the list jumps to the real C
        carousel.on_scroll(0.0);
        assert!(carousel.on_momentum_end(0.0).is_some());
        assert_eq!(carousel.paging().current_index(), 3);

        carousel.press_start(3, 0);
        carousel.tick(3000);
        let habits = store.snapshot();
        assert_eq!(habits[2].count(), 1);
        assert_eq!(habits[0].count(), 0);
    }

    #[test]
    fn settling_on_copy_reports_reseek() {
        let (_, mut carousel) = mount(&["A", "B", "C"], &Config::default());
        let event = carousel.on_momentum_end(4.0 * 390.0);
        assert!(matches!(
            event,
            Some(Event::CardReseeked {
                from_index: 4,
                to_index: 1,
                ..
            })
        ));
        assert!(carousel.on_momentum_end(2.0 * 390.0).is_none());
    }

    #[test]
    fn overshoot_settles_on_a_real_card() {
        let (_, mut carousel) = mount(&["A", "B", "C"], &Config::default());
        let event = carousel.on_momentum_end(5.0 * 390.0);
        assert!(matches!(event, Some(Event::CardReseeked { to_index: 1, .. })));
        assert_eq!(carousel.paging().current_index(), 1);
        assert!(carousel.press_start(4, 0).is_none());
        assert!(carousel.press_start(1, 0).is_some());
    }

    #[test]
    fn copies_name_the_habit_at_the_far_end() {
        let (store, carousel) = mount(&["A", "B", "C"], &Config::default());
        let habits = store.snapshot();
        let ids: Vec<_> = carousel.frame(0).cards.iter().map(|c| c.habit_id).collect();
        assert_eq!(
            ids,
            vec![
                Some(habits[2].id),
                Some(habits[0].id),
                Some(habits[1].id),
                Some(habits[2].id),
                Some(habits[0].id),
            ]
        );
    }

    #[test]
    fn event_stamps_come_from_the_clock() {
        let (_, mut carousel) = mount(&["A", "B"], &Config::default());
        let stamp = fixed_clock().with_timezone(&Utc);
        assert_eq!(
            carousel.press_start(1, 0),
            Some(Event::HoldStarted { index: 1, at: stamp })
        );

        let events = carousel.tick(3000);
        assert_eq!(events.len(), 2);
        for event in &events {
            match event {
                Event::HoldCommitted { at, .. } | Event::HabitToggled { at, .. } => {
                    assert_eq!(*at, stamp)
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[test]
    fn added_habit_rebuilds_on_next_tick() {
        let (store, mut carousel) = mount(&["A", "B"], &Config::default());
        store.add(NewHabit::named("C")).unwrap();
        assert!(carousel.is_dirty());
        let events = carousel.tick(0);
        assert!(matches!(events[..], [Event::RenderListRebuilt { len: 5, .. }]));
        assert_eq!(carousel.frame(0).cards.len(), 5);
        assert!(!carousel.is_dirty());
    }

    #[test]
    fn non_reactive_list_keeps_mounted_shape() {
        let mut config = Config::default();
        config.carousel.reactive_render_list = false;
        let (store, mut carousel) = mount(&["A", "B"], &config);
        store.add(NewHabit::named("C")).unwrap();
        assert!(carousel.tick(0).is_empty());
        assert_eq!(carousel.render_list().len(), 4);
    }

    #[test]
    fn classic_variant_cannot_flip() {
        let mut config = Config::default();
        config.carousel.variant = CardVariant::Classic;
        let (_, mut carousel) = mount(&["A"], &config);
        assert!(!carousel.toggle_flip(0, 0));

        let (_, mut flipping) = mount(&["A"], &Config::default());
        assert!(flipping.toggle_flip(0, 0));
        assert!(!flipping.frame(0).cards[0].transform.front_on_top);
    }

    #[test]
    fn drop_unsubscribes() {
        let (store, carousel) = mount(&["A"], &Config::default());
        let subscription = carousel.subscription;
        drop(carousel);
        assert!(!store.unsubscribe(subscription));
    }
}
