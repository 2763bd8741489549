mod animation;
mod controller;
mod hold;
mod matrix;
mod paging;
mod render;
mod transform;

pub use animation::{interpolate, Easing, Tween};
pub use controller::{CardFrame, Carousel, Frame};
pub use hold::{CompletionTimer, HoldEvent, HoldGate, HoldState};
pub use matrix::{card_matrix, Matrix4};
pub use paging::{PagingController, Settle};
pub use render::{RenderItem, RenderList, Slot};
pub use transform::{
    card_transform, distance_scale, Backdrop, CardGeometry, CardInputs, CardTransform,
    CardVariant, FlipState, PressAnimator, PressProfile, TiltState,
};
