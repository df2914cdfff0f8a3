pub mod container;
pub mod reveal;
pub mod transition;
pub mod viewport;
pub mod zone;

pub use container::{
    active_section, Axis, Child, ContainerConfig, Edge, Navigation, NavigationAnchor,
    NavigationDot, ScrollBehavior, ScrollDriver, SectionBounds, SectionContainer, SnapMode,
    ZoneContent, NAVIGATION_INSET_PX, NAVIGATION_Z_INDEX, SECTION_Z_INDEX,
};
pub use reveal::{visible_ratio, RevealTrigger, DEFAULT_THRESHOLD};
pub use transition::{
    Navigator, PageTransition, TransitionError, TransitionLink, TransitionScope, TransitionTiming,
};
pub use viewport::{
    breakpoint_value, Breakpoint, Orientation, ResizeDebouncer, ViewportInfo, DESKTOP_MIN,
    LARGE_DESKTOP_MIN, NORMAL_PHONE_MAX, RESIZE_DEBOUNCE, SERVER_VIEWPORT, SMALL_PHONE_MAX,
};
pub use zone::{
    Anchor, DebugGrid, GridAxis, GridLine, Layer, Placement, UnknownLayer, UnknownZone, Zone,
    ZoneOverlay, OVERLAY_Z_INDEX,
};
