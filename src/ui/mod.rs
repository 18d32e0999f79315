pub mod animation;
pub mod autolayout;
pub mod color;
pub mod component;
pub mod components;
pub mod config;
pub mod context;
pub mod identity;
pub mod layout_types;
pub mod rendering;
pub mod systems;
pub mod text;
pub mod text_cache;
pub mod theme;
pub mod widgets;

pub use animation::{
    Animation, AnimationConfig, AnimationDirection, AnimationRange, AnimationType, AnimationWhen,
    EasingFunction, HasAnimations, UIAnimationSystem,
};
pub use autolayout::{AutoLayout, Measurer, autolayout};
pub use color::{Color, auto_text_color, contrast_ratio, meets_wcag_aa};
pub use component::{AutoLayoutRoot, NO_PARENT, UIComponent, UIComponentDebug};
pub use config::{
    ComponentConfig, ComponentSize, DEFAULT_COMPONENT_SIZE, StylingDefault, UIStylingDefaults,
    WidgetKind, overwrite_defaults,
};
pub use context::{FAKE, MousePointerState, ROOT, RenderInfo, UIContext};
pub use identity::{EntityParent, UIElementRegistry, UiId, mk, mk_indexed};
pub use rendering::{FontBackend, TextureHandle, UIRenderer, render_ui};
pub use systems::{
    BeginUIContextManager, ClearVisibility, DropdownClickOutside, DropdownKeyboardNav,
    EndUIContextManager, HandleClicks, HandleDrags, HandleLeftRight, HandleTabbing,
    LineIndexUpdateSystem, RunAutoLayout, SCROLL_MULTIPLIER, ScrollViewSystem, SetVisibility,
    TextAreaInputSystem, TextCursorBlinkSystem, TextInputSystem, ToggleSwitchAnimation,
    UpdateDropdownOptions, add_singleton_components, register_after_ui_systems,
    register_before_ui_systems,
};
pub use text_cache::TextMeasureCache;
pub use theme::{
    ClickActivationMode, ColorUsage, CornerMask, MIN_FONT_SIZE, Theme, UNSET_FONT_SIZE,
    modify_corners,
};
pub use widgets::{
    ElementData, ElementResult, Imm, ProgressBarStyle, TextInputConfig, TreeNode,
};
