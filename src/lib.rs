//! Game-oriented Entity-Component-System runtime with an immediate-mode
//! layout and widget engine layered on top.
//!
//! The two halves are tightly coupled: widgets are entities with components,
//! the layout engine walks component trees, and the system scheduler drives
//! both game logic and UI updates each frame.
//!
//! Rendering, font measurement, and platform input stay outside the crate;
//! hosts implement [`ui::UIRenderer`] / [`ui::FontBackend`] and fill an
//! input snapshot every frame.

pub mod app;
pub mod ecs;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod ui;

#[cfg(test)]
mod test;

pub mod prelude {
    pub use lateshift_derive::Component;

    pub use crate::app::App;
    pub use crate::ecs::{
        CallbackSystem, Component, EnforceSingleton, Entity, EntityCollection, EntityId,
        EntityQuery, Handle, System, SystemManager, SystemSignature, TagFilter, tag_set,
    };
    pub use crate::geometry::{Rect, Resolution, Vec2};
    pub use crate::input::{ActionDone, InputAction, InputSnapshot, ValidationMode};
    pub use crate::ui::{
        ComponentConfig, ComponentSize, ElementResult, Imm, Theme, UIComponent, UIContext,
    };
    pub use crate::ui::layout_types::{
        Axis, Dim, FlexDirection, FlexWrap, JustifyContent, AlignItems, SelfAlign, Size,
        Spacing, children, children_min, expand, percent, pixels, screen_pct, text_size,
    };
}
