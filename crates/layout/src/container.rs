//! Scroll-snapping section container.
//!
//! The container owns an ordered list of sections plus any zone content that
//! should float above them. Scroll samples drive the active section; nothing
//! else does. Programmatic navigation only issues a scroll through a
//! [`ScrollDriver`] and waits for the resulting samples like any other scroll.

use std::fmt;
use std::time::Duration;

use crate::zone::{Layer, Zone, ZoneOverlay};

/// 導覽指示器距邊緣的距離。 / Inset of the navigation indicators from the viewport edge, in CSS pixels.
pub const NAVIGATION_INSET_PX: f64 = 24.0;
/// 導覽指示器的堆疊順序。 / Stacking order of the navigation indicators.
pub const NAVIGATION_Z_INDEX: u16 = 50;
/// 區段內容的堆疊順序。 / Stacking order of section content; zone layers sit above or below it.
pub const SECTION_Z_INDEX: u16 = 1;

/// 捲動軸向。 / Scroll axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

impl Axis {
    fn css_letter(self) -> &'static str {
        match self {
            Axis::Vertical => "y",
            Axis::Horizontal => "x",
        }
    }
}

/// 吸附模式。 / Scroll snapping strength.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapMode {
    Off,
    #[default]
    Mandatory,
    Proximity,
}

/// 導覽列對齊位置。 / Where the navigation strip sits along its edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationAnchor {
    Start,
    #[default]
    Center,
    End,
}

/// 捲動方式。 / How a programmatic scroll moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// 容器設定。 / Container settings; every field has the default the page template uses.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerConfig {
    pub axis: Axis,
    pub snap: SnapMode,
    pub snap_duration: Duration,
    pub show_navigation: bool,
    pub navigation_anchor: NavigationAnchor,
    /// Gap between sections in CSS pixels.
    pub gap: f64,
    pub debug_grid: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Vertical,
            snap: SnapMode::Mandatory,
            snap_duration: Duration::from_millis(300),
            show_navigation: false,
            navigation_anchor: NavigationAnchor::Center,
            gap: 0.0,
            debug_grid: false,
        }
    }
}

impl ContainerConfig {
    /// 產生吸附樣式。 / Value for the CSS `scroll-snap-type` property.
    pub fn snap_style(&self) -> String {
        match self.snap {
            SnapMode::Off => "none".to_string(),
            SnapMode::Mandatory => format!("{} mandatory", self.axis.css_letter()),
            SnapMode::Proximity => format!("{} proximity", self.axis.css_letter()),
        }
    }
}

/// 固定於區域的內容。 / Content pinned to a screen zone instead of scrolling with the sections.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneContent<T> {
    pub zone: Zone,
    pub layer: Layer,
    pub content: T,
}

/// 子元素分類，於建構時標記。 / A container child, tagged by the caller at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Child<T> {
    Section(T),
    Zone(ZoneContent<T>),
}

impl<T> Child<T> {
    /// 建立區段子元素。 / Tags content as a scrolling section.
    pub fn section(content: T) -> Self {
        Child::Section(content)
    }

    /// 建立區域子元素。 / Tags content as pinned to a zone and layer.
    pub fn zone(zone: Zone, layer: Layer, content: T) -> Self {
        Child::Zone(ZoneContent {
            zone,
            layer,
            content,
        })
    }
}

/// 區段幾何。 / Geometry of one mounted section along the scroll axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBounds {
    /// Distance from the start of the scroll content.
    pub offset: f64,
    pub length: f64,
}

impl SectionBounds {
    /// 建立區段幾何。 / Creates bounds from an offset and length.
    pub fn new(offset: f64, length: f64) -> Self {
        Self { offset, length }
    }

    /// 區段中心。 / Centre of the section along the scroll axis.
    pub fn center(&self) -> f64 {
        self.offset + self.length / 2.0
    }

    /// 等距排列區段。 / Lays out `count` sections of equal `length` separated by `gap`.
    pub fn evenly_spaced(count: usize, length: f64, gap: f64) -> Vec<SectionBounds> {
        (0..count)
            .map(|index| SectionBounds::new(index as f64 * (length + gap), length))
            .collect()
    }
}

/// 計算作用中區段。 / Index of the section whose centre is closest to the viewport centre.
///
/// Ties go to the earlier section. Returns `None` when there are no sections
/// or no finite distance could be computed.
pub fn active_section(
    sections: &[SectionBounds],
    scroll_offset: f64,
    viewport_length: f64,
) -> Option<usize> {
    let viewport_center = viewport_length / 2.0;
    let mut best: Option<(usize, f64)> = None;
    for (index, bounds) in sections.iter().enumerate() {
        let distance = (bounds.center() - scroll_offset - viewport_center).abs();
        if !distance.is_finite() {
            continue;
        }
        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

/// 原生捲動能力。 / Native scrolling capability of the host viewport.
pub trait ScrollDriver {
    fn scroll_to(&mut self, axis: Axis, offset: f64, behavior: ScrollBehavior);
}

/// 導覽圓點。 / One navigation dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationDot {
    pub index: usize,
    pub active: bool,
    pub label: String,
}

/// 導覽列所在邊緣。 / Viewport edge holding the navigation strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Right,
    Bottom,
}

/// 導覽列。 / Indicator strip: one dot per section, pinned to a viewport edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub edge: Edge,
    pub anchor: NavigationAnchor,
    /// Direction in which dots are stacked.
    pub stack: Axis,
    pub inset: f64,
    pub z_index: u16,
    pub dots: Vec<NavigationDot>,
}

type ChangeCallback = Box<dyn FnMut(usize)>;

/// 區段容器。 / Scroll-snapping container of sections and zone content.
pub struct SectionContainer<T> {
    config: ContainerConfig,
    sections: Vec<T>,
    zones: Vec<ZoneContent<T>>,
    mounted: Vec<SectionBounds>,
    active: usize,
    on_change: Option<ChangeCallback>,
}

impl<T: fmt::Debug> fmt::Debug for SectionContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionContainer")
            .field("config", &self.config)
            .field("sections", &self.sections)
            .field("zones", &self.zones)
            .field("mounted", &self.mounted)
            .field("active", &self.active)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl<T> SectionContainer<T> {
    /// 建立容器。 / Creates a container from tagged children.
    pub fn new(config: ContainerConfig, children: Vec<Child<T>>) -> Self {
        let mut container = Self {
            config,
            sections: Vec::new(),
            zones: Vec::new(),
            mounted: Vec::new(),
            active: 0,
            on_change: None,
        };
        container.set_children(children);
        container
    }

    /// 註冊切換回呼。 / Registers the callback fired whenever the active section changes.
    pub fn on_section_change(&mut self, callback: impl FnMut(usize) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// 目前設定。 / Returns the container settings.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 區段內容。 / Section content, in child order.
    pub fn sections(&self) -> &[T] {
        &self.sections
    }

    /// 區域內容。 / Zone content, in child order.
    pub fn zones(&self) -> &[ZoneContent<T>] {
        &self.zones
    }

    /// 已掛載的區段幾何。 / Geometry registered by the last mount.
    pub fn mounted(&self) -> &[SectionBounds] {
        &self.mounted
    }

    /// 作用中區段索引。 / Index of the active section.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// 吸附樣式。 / Value for the CSS `scroll-snap-type` property.
    pub fn snap_style(&self) -> String {
        self.config.snap_style()
    }

    /// 重新分類子元素。 / Re-partitions children into sections and zone content.
    ///
    /// The mounted registry is cleared until the host calls [`mount`](Self::mount)
    /// again. The active index is clamped into range without firing the change
    /// callback.
    pub fn set_children(&mut self, children: Vec<Child<T>>) {
        self.sections.clear();
        self.zones.clear();
        for child in children {
            match child {
                Child::Section(content) => self.sections.push(content),
                Child::Zone(content) => self.zones.push(content),
            }
        }
        self.mounted.clear();
        self.active = self.active.min(self.sections.len().saturating_sub(1));
    }

    /// 重建區段登記。 / Rebuilds the registry of mounted section geometry, in child order.
    pub fn mount(&mut self, mut bounds: Vec<SectionBounds>) {
        bounds.truncate(self.sections.len());
        self.mounted = bounds;
    }

    /// 處理捲動取樣。 / Feeds one scroll-position sample along the configured axis.
    ///
    /// Returns the new active index when it changed.
    pub fn on_scroll(&mut self, scroll_offset: f64, viewport_length: f64) -> Option<usize> {
        if self.mounted.is_empty() {
            return None;
        }
        let next = active_section(&self.mounted, scroll_offset, viewport_length)?;
        if next == self.active {
            return None;
        }
        tracing::debug!(from = self.active, to = next, "active section changed");
        self.active = next;
        if let Some(callback) = self.on_change.as_mut() {
            callback(next);
        }
        Some(next)
    }

    /// 捲動至區段。 / Smoothly scrolls to a mounted section; out-of-range indices are ignored.
    pub fn go_to_section(&self, index: usize, driver: &mut dyn ScrollDriver) -> bool {
        let Some(bounds) = self.mounted.get(index) else {
            return false;
        };
        driver.scroll_to(self.config.axis, bounds.offset, ScrollBehavior::Smooth);
        true
    }

    /// 導覽指示器。 / Navigation indicators, or `None` when hidden or there are no sections.
    pub fn navigation(&self) -> Option<Navigation> {
        if !self.config.show_navigation || self.sections.is_empty() {
            return None;
        }
        let (edge, stack) = match self.config.axis {
            Axis::Vertical => (Edge::Right, Axis::Vertical),
            Axis::Horizontal => (Edge::Bottom, Axis::Horizontal),
        };
        let dots = (0..self.sections.len())
            .map(|index| NavigationDot {
                index,
                active: index == self.active,
                label: format!("Go to section {}", index + 1),
            })
            .collect();
        Some(Navigation {
            edge,
            anchor: self.config.navigation_anchor,
            stack,
            inset: NAVIGATION_INSET_PX,
            z_index: NAVIGATION_Z_INDEX,
            dots,
        })
    }

    /// 區域覆蓋層。 / Zone overlay for the collected zone content, when there is any.
    pub fn overlay(&self) -> Option<ZoneOverlay<'_, T>> {
        if self.zones.is_empty() {
            return None;
        }
        Some(ZoneOverlay::new(&self.zones, self.config.debug_grid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingDriver {
        calls: Vec<(Axis, f64, ScrollBehavior)>,
    }

    impl ScrollDriver for RecordingDriver {
        fn scroll_to(&mut self, axis: Axis, offset: f64, behavior: ScrollBehavior) {
            self.calls.push((axis, offset, behavior));
        }
    }

    fn three_sections(config: ContainerConfig) -> SectionContainer<&'static str> {
        let mut container = SectionContainer::new(
            config,
            vec![
                Child::section("hero"),
                Child::zone(Zone::TopLeft, Layer::Navigation, "logo"),
                Child::section("features"),
                Child::section("contact"),
            ],
        );
        container.mount(SectionBounds::evenly_spaced(3, 800.0, 0.0));
        container
    }

    #[test]
    fn children_are_partitioned_by_tag() {
        let container = three_sections(ContainerConfig::default());
        assert_eq!(container.sections(), &["hero", "features", "contact"]);
        assert_eq!(container.zones().len(), 1);
        assert_eq!(container.zones()[0].content, "logo");
    }

    #[test]
    fn closest_center_wins() {
        let sections = SectionBounds::evenly_spaced(3, 800.0, 0.0);
        assert_eq!(active_section(&sections, 0.0, 800.0), Some(0));
        assert_eq!(active_section(&sections, 790.0, 800.0), Some(1));
        assert_eq!(active_section(&sections, 1500.0, 800.0), Some(2));
    }

    #[test]
    fn ties_go_to_the_earlier_section() {
        let sections = SectionBounds::evenly_spaced(2, 800.0, 0.0);
        assert_eq!(active_section(&sections, 400.0, 800.0), Some(0));
    }

    #[test]
    fn callback_fires_only_on_change() {
        let mut container = three_sections(ContainerConfig::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        container.on_section_change(move |index| sink.borrow_mut().push(index));

        assert_eq!(container.on_scroll(10.0, 800.0), None);
        assert_eq!(container.on_scroll(820.0, 800.0), Some(1));
        assert_eq!(container.on_scroll(830.0, 800.0), None);
        assert_eq!(container.on_scroll(1600.0, 800.0), Some(2));
        assert_eq!(container.on_scroll(0.0, 800.0), Some(0));

        assert_eq!(*seen.borrow(), vec![1, 2, 0]);
        assert_eq!(container.active_index(), 0);
    }

    #[test]
    fn go_to_section_scrolls_along_configured_axis() {
        let container = three_sections(ContainerConfig {
            axis: Axis::Horizontal,
            ..ContainerConfig::default()
        });
        let mut driver = RecordingDriver::default();
        assert!(container.go_to_section(2, &mut driver));
        assert!(!container.go_to_section(3, &mut driver));
        assert_eq!(
            driver.calls,
            vec![(Axis::Horizontal, 1600.0, ScrollBehavior::Smooth)]
        );
        assert_eq!(container.active_index(), 0, "navigation waits for scroll samples");
    }

    #[test]
    fn unmounted_sections_are_not_navigable() {
        let container = SectionContainer::new(
            ContainerConfig::default(),
            vec![Child::section("a"), Child::section("b")],
        );
        let mut driver = RecordingDriver::default();
        assert!(!container.go_to_section(0, &mut driver));
        assert!(driver.calls.is_empty());
    }

    #[test]
    fn zero_sections_is_inert() {
        let mut container: SectionContainer<&str> = SectionContainer::new(
            ContainerConfig {
                show_navigation: true,
                ..ContainerConfig::default()
            },
            Vec::new(),
        );
        container.mount(SectionBounds::evenly_spaced(2, 100.0, 0.0));
        let mut driver = RecordingDriver::default();

        assert!(container.mounted().is_empty());
        assert_eq!(container.on_scroll(500.0, 100.0), None);
        assert!(!container.go_to_section(0, &mut driver));
        assert_eq!(container.navigation(), None);
        assert!(container.overlay().is_none());
        assert_eq!(container.active_index(), 0);
    }

    #[test]
    fn navigation_marks_active_dot() {
        let mut container = three_sections(ContainerConfig {
            show_navigation: true,
            navigation_anchor: NavigationAnchor::End,
            ..ContainerConfig::default()
        });
        container.on_scroll(800.0, 800.0);
        let nav = container.navigation().expect("navigation shown");
        assert_eq!(nav.edge, Edge::Right);
        assert_eq!(nav.anchor, NavigationAnchor::End);
        assert_eq!(nav.dots.len(), 3);
        assert!(nav.dots[1].active);
        assert_eq!(nav.dots[2].label, "Go to section 3");
    }

    #[test]
    fn shrinking_children_clamps_active_index() {
        let mut container = three_sections(ContainerConfig::default());
        container.on_scroll(1600.0, 800.0);
        assert_eq!(container.active_index(), 2);

        container.set_children(vec![Child::section("only")]);
        assert_eq!(container.active_index(), 0);
        assert!(container.mounted().is_empty());
    }

    #[test]
    fn replacing_children_drops_stale_geometry() {
        let mut container = three_sections(ContainerConfig::default());
        container.set_children(vec![
            Child::section("a"),
            Child::section("b"),
            Child::section("c"),
        ]);
        let mut driver = RecordingDriver::default();
        assert!(container.mounted().is_empty());
        assert!(!container.go_to_section(1, &mut driver));
        assert_eq!(container.on_scroll(800.0, 800.0), None);

        container.mount(SectionBounds::evenly_spaced(3, 500.0, 20.0));
        assert!(container.go_to_section(1, &mut driver));
        assert_eq!(
            driver.calls,
            vec![(Axis::Vertical, 520.0, ScrollBehavior::Smooth)]
        );
    }

    #[test]
    fn snap_style_reflects_axis_and_mode() {
        let mut config = ContainerConfig::default();
        assert_eq!(config.snap_style(), "y mandatory");
        config.axis = Axis::Horizontal;
        config.snap = SnapMode::Proximity;
        assert_eq!(config.snap_style(), "x proximity");
        config.snap = SnapMode::Off;
        assert_eq!(config.snap_style(), "none");
    }
}
