//! Per-card visual transforms.
//!
//! Every value here is a pure function of the scroll offset, the card's
//! index and a handful of tweens sampled at `now_ms`. The rendering side
//! reads a [`CardTransform`] each frame and applies it as-is.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use super::animation::{interpolate, Easing, Tween};
use super::matrix::{card_matrix, Matrix4};

/// Scale of a card given how far the scroll offset is from centering it.
///
/// Full size when centered, `far` one page either side, clamped beyond.
pub fn distance_scale(offset: f32, stride: f32, index: usize, far: f32) -> f32 {
    let center = index as f32 * stride;
    interpolate(
        offset,
        &[center - stride, center, center + stride],
        &[far, 1.0, far],
    )
}

/// Card look selected in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardVariant {
    /// Card rests slightly shrunk and grows to full size while held.
    Classic,
    /// Card rests at full size, overshoots while held and can flip over.
    #[default]
    Flip,
}

impl CardVariant {
    pub fn rest_scale(self) -> f32 {
        match self {
            CardVariant::Classic => 0.9,
            CardVariant::Flip => 1.0,
        }
    }

    pub fn peak_scale(self) -> f32 {
        match self {
            CardVariant::Classic => 1.0,
            CardVariant::Flip => 1.1,
        }
    }

    pub fn backdrop_target(self) -> f32 {
        match self {
            CardVariant::Classic => 0.5,
            CardVariant::Flip => 0.9,
        }
    }

    pub fn can_flip(self) -> bool {
        matches!(self, CardVariant::Flip)
    }
}

/// Timing and magnitudes of the hold feedback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressProfile {
    pub complete_ms: u64,
    pub release_ms: u64,
    pub canceled_ms: u64,
    pub vibration_period_ms: u64,
    pub vibration_amplitude: f32,
    pub vibration_peak_multiplier: f32,
    pub rest_scale: f32,
    pub peak_scale: f32,
    pub backdrop_target: f32,
}

impl Default for PressProfile {
    fn default() -> Self {
        let variant = CardVariant::default();
        Self {
            complete_ms: 3000,
            release_ms: 500,
            canceled_ms: 500,
            vibration_period_ms: 50,
            vibration_amplitude: 0.5,
            vibration_peak_multiplier: 2.6,
            rest_scale: variant.rest_scale(),
            peak_scale: variant.peak_scale(),
            backdrop_target: variant.backdrop_target(),
        }
    }
}

/// Scale growth and vibration of one card while it is held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressAnimator {
    growth: Tween,
    /// Multiplier on the vibration amplitude; ramps up while held.
    envelope: Tween,
    vibrating_since: Option<u64>,
}

impl PressAnimator {
    pub fn new(profile: &PressProfile) -> Self {
        Self {
            growth: Tween::settled(profile.rest_scale),
            envelope: Tween::settled(1.0),
            vibrating_since: None,
        }
    }

    pub fn press(&mut self, now_ms: u64, profile: &PressProfile) {
        self.growth.retarget(
            now_ms,
            profile.peak_scale,
            profile.complete_ms,
            Easing::EaseOut,
        );
        self.envelope.snap(1.0);
        self.envelope.retarget(
            now_ms,
            profile.vibration_peak_multiplier,
            profile.complete_ms / 2,
            Easing::InOutQuad,
        );
        self.vibrating_since = Some(now_ms);
    }

    pub fn release(&mut self, now_ms: u64, profile: &PressProfile) {
        self.growth.retarget(
            now_ms,
            profile.rest_scale,
            profile.release_ms,
            Easing::InOutQuad,
        );
        self.envelope.snap(1.0);
        self.vibrating_since = None;
    }

    pub fn is_vibrating(&self) -> bool {
        self.vibrating_since.is_some()
    }

    pub fn scale(&self, now_ms: u64) -> f32 {
        self.growth.value_at(now_ms)
    }

    /// Jitter applied to both X and Y.
    ///
    /// Swings between 0 and `-amplitude * envelope`, one leg per period,
    /// reversing at each end, for as long as the card is held.
    pub fn vibration(&self, now_ms: u64, profile: &PressProfile) -> f32 {
        let Some(since) = self.vibrating_since else {
            return 0.0;
        };
        if profile.vibration_period_ms == 0 {
            return 0.0;
        }
        let elapsed = now_ms.saturating_sub(since);
        let leg = elapsed / profile.vibration_period_ms;
        let within = (elapsed % profile.vibration_period_ms) as f32
            / profile.vibration_period_ms as f32;
        let t = if leg % 2 == 0 { within } else { 1.0 - within };
        let depth = profile.vibration_amplitude * self.envelope.value_at(now_ms);
        -depth * Easing::InOutQuad.apply(t)
    }
}

/// Full-screen dimming layer behind the held card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backdrop {
    opacity: Tween,
}

impl Default for Backdrop {
    fn default() -> Self {
        Self {
            opacity: Tween::settled(0.0),
        }
    }
}

impl Backdrop {
    pub fn show(&mut self, now_ms: u64, profile: &PressProfile) {
        self.opacity.retarget(
            now_ms,
            profile.backdrop_target,
            profile.complete_ms,
            Easing::Linear,
        );
    }

    pub fn hide(&mut self, now_ms: u64, profile: &PressProfile) {
        self.opacity
            .retarget(now_ms, 0.0, profile.canceled_ms, Easing::Linear);
    }

    pub fn opacity(&self, now_ms: u64) -> f32 {
        self.opacity.value_at(now_ms)
    }
}

/// Drag-driven 3D tilt of the card canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiltState {
    rotate_x: Tween,
    rotate_y: Tween,
}

impl Default for TiltState {
    fn default() -> Self {
        Self {
            rotate_x: Tween::settled(0.0),
            rotate_y: Tween::settled(0.0),
        }
    }
}

impl TiltState {
    /// Accumulate a pan delta. Horizontal drag turns around Y, vertical
    /// drag around X (inverted so the card leans toward the finger).
    pub fn on_pan_change(&mut self, now_ms: u64, dx: f32, dy: f32, sensitivity: f32) {
        if sensitivity == 0.0 {
            return;
        }
        let x = self.rotate_x.value_at(now_ms) - dy / sensitivity;
        let y = self.rotate_y.value_at(now_ms) + dx / sensitivity;
        self.rotate_x.snap(x);
        self.rotate_y.snap(y);
    }

    pub fn on_pan_end(&mut self, now_ms: u64, return_ms: u64) {
        self.rotate_x
            .retarget(now_ms, 0.0, return_ms, Easing::InOutQuad);
        self.rotate_y
            .retarget(now_ms, 0.0, return_ms, Easing::InOutQuad);
    }

    pub fn angles(&self, now_ms: u64) -> (f32, f32) {
        (
            self.rotate_x.value_at(now_ms),
            self.rotate_y.value_at(now_ms),
        )
    }
}

/// Front/back flip triggered from the settings icon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlipState {
    value: Tween,
}

impl Default for FlipState {
    fn default() -> Self {
        Self {
            value: Tween::settled(0.0),
        }
    }
}

impl FlipState {
    pub fn toggle(&mut self, now_ms: u64, flip_ms: u64) {
        let to = if self.value.target() == 0.0 { 1.0 } else { 0.0 };
        self.value.retarget(now_ms, to, flip_ms, Easing::InOutQuad);
    }

    /// Rotation around Y in radians, 0 (front) to π (back).
    pub fn angle(&self, now_ms: u64) -> f32 {
        interpolate(self.value.value_at(now_ms), &[0.0, 1.0], &[0.0, PI])
    }

    /// The front face is stacked on top as soon as the flip targets it.
    pub fn front_on_top(&self) -> bool {
        self.value.target() == 0.0
    }
}

/// Card geometry the matrix is built around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardGeometry {
    pub width: f32,
    pub height: f32,
    pub perspective: f32,
    /// Extra vertical room of the canvas above the card, split evenly.
    pub canvas_padding: f32,
}

impl CardGeometry {
    pub fn new(width: f32, perspective: f32, canvas_padding: f32) -> Self {
        Self {
            width,
            height: width * 1.5,
            perspective,
            canvas_padding,
        }
    }
}

/// Everything the renderer needs to place one card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardTransform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub front_on_top: bool,
    pub matrix: Matrix4,
}

/// Inputs for [`card_transform`].
#[derive(Debug, Clone, Copy)]
pub struct CardInputs<'a> {
    pub now_ms: u64,
    pub scroll_offset: f32,
    pub stride: f32,
    pub index: usize,
    pub far_scale: f32,
    pub profile: &'a PressProfile,
    pub geometry: &'a CardGeometry,
}

pub fn card_transform(
    inputs: CardInputs<'_>,
    press: &PressAnimator,
    tilt: &TiltState,
    flip: &FlipState,
) -> CardTransform {
    let now = inputs.now_ms;
    let scale = distance_scale(
        inputs.scroll_offset,
        inputs.stride,
        inputs.index,
        inputs.far_scale,
    ) * press.scale(now);
    let jitter = press.vibration(now, inputs.profile);
    let (rotate_x, tilt_y) = tilt.angles(now);
    let rotate_y = tilt_y + flip.angle(now);

    let geometry = inputs.geometry;
    let matrix = card_matrix(
        (geometry.width / 2.0, geometry.height / 2.0),
        geometry.perspective,
        rotate_x,
        rotate_y,
        geometry.canvas_padding / 2.0,
    );

    CardTransform {
        scale,
        translate_x: jitter,
        translate_y: jitter,
        rotate_x,
        rotate_y,
        front_on_top: flip.front_on_top(),
        matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn distance_scale_control_points() {
        assert_eq!(distance_scale(600.0, 300.0, 2, 0.3), 1.0);
        assert!(close(distance_scale(300.0, 300.0, 2, 0.3), 0.3));
        assert!(close(distance_scale(900.0, 300.0, 2, 0.3), 0.3));
        assert!(close(distance_scale(0.0, 300.0, 2, 0.3), 0.3));
        assert!(close(distance_scale(450.0, 300.0, 2, 0.3), 0.65));
    }

    #[test]
    fn centered_idle_card_is_full_size_and_still() {
        let profile = PressProfile::default();
        let geometry = CardGeometry::new(312.0, 500.0, 48.0);
        let press = PressAnimator::new(&profile);
        let t = card_transform(
            CardInputs {
                now_ms: 10_000,
                scroll_offset: 600.0,
                stride: 300.0,
                index: 2,
                far_scale: 0.3,
                profile: &profile,
                geometry: &geometry,
            },
            &press,
            &TiltState::default(),
            &FlipState::default(),
        );
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.translate_x, 0.0);
        assert_eq!(t.translate_y, 0.0);
        assert!(t.front_on_top);
    }

    #[test]
    fn press_grows_toward_peak_and_release_returns() {
        let profile = PressProfile::default();
        let mut press = PressAnimator::new(&profile);
        press.press(0, &profile);
        let mid = press.scale(1500);
        assert!(mid > profile.rest_scale && mid < profile.peak_scale);
        assert!(close(press.scale(3000), profile.peak_scale));

        press.release(3000, &profile);
        assert!(close(press.scale(3000), profile.peak_scale));
        assert!(close(press.scale(3500), profile.rest_scale));
    }

    #[test]
    fn vibration_oscillates_with_growing_amplitude() {
        let profile = PressProfile::default();
        let mut press = PressAnimator::new(&profile);
        press.press(0, &profile);

        assert_eq!(press.vibration(0, &profile), 0.0);
        // end of the first leg: about one amplitude deep
        let first = press.vibration(49, &profile);
        assert!(first < -0.45 && first > -0.55, "{first}");
        // back at rest after two legs
        assert!(close(press.vibration(100, &profile), 0.0));
        // after the envelope finished, depth is amplitude * peak multiplier
        let deep = press.vibration(1500 + 50, &profile);
        assert!(close(deep, -0.5 * 2.6));

        press.release(1600, &profile);
        assert_eq!(press.vibration(1650, &profile), 0.0);
    }

    #[test]
    fn backdrop_ramps_and_cancels() {
        let profile = PressProfile::default();
        let mut backdrop = Backdrop::default();
        backdrop.show(0, &profile);
        assert!(close(backdrop.opacity(1500), profile.backdrop_target / 2.0));
        backdrop.hide(1500, &profile);
        assert!(close(backdrop.opacity(1750), profile.backdrop_target / 4.0));
        assert_eq!(backdrop.opacity(2000), 0.0);
    }

    #[test]
    fn tilt_accumulates_and_springs_back() {
        let mut tilt = TiltState::default();
        tilt.on_pan_change(0, 100.0, 50.0, 1000.0);
        tilt.on_pan_change(16, 100.0, 50.0, 1000.0);
        let (x, y) = tilt.angles(16);
        assert!(close(x, -0.1));
        assert!(close(y, 0.2));

        tilt.on_pan_end(16, 300);
        assert_eq!(tilt.angles(316), (0.0, 0.0));
    }

    #[test]
    fn flip_swings_half_a_turn() {
        let mut flip = FlipState::default();
        flip.toggle(0, 300);
        assert!(!flip.front_on_top());
        assert!(close(flip.angle(300), PI));
        flip.toggle(300, 300);
        assert!(flip.front_on_top());
        assert!(close(flip.angle(600), 0.0));
    }

    #[test]
    fn classic_variant_rests_shrunk() {
        assert_eq!(CardVariant::Classic.rest_scale(), 0.9);
        assert!(!CardVariant::Classic.can_flip());
        assert!(CardVariant::Flip.can_flip());
    }
}
