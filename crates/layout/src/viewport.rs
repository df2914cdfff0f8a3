use std::fmt;
use std::time::{Duration, Instant};

/// 縮放合併時間窗。 / Window used to coalesce resize and orientation-change bursts.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// 預設視窗尺寸。 / Dimensions reported before a real viewport is available.
pub const SERVER_VIEWPORT: (u32, u32) = (1024, 768);

/// 寬度門檻。 / Width thresholds; each category ends just below the next threshold.
pub const SMALL_PHONE_MAX: u32 = 375;
pub const NORMAL_PHONE_MAX: u32 = 430;
pub const DESKTOP_MIN: u32 = 1024;
pub const LARGE_DESKTOP_MIN: u32 = 1920;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Breakpoint {
    SmallPhone,
    NormalPhone,
    Tablet,
    Desktop,
    LargeDesktop,
}

impl Breakpoint {
    /// 依寬度分類。 / Classifies a viewport width.
    pub fn for_width(width: u32) -> Self {
        if width < SMALL_PHONE_MAX {
            Breakpoint::SmallPhone
        } else if width < NORMAL_PHONE_MAX {
            Breakpoint::NormalPhone
        } else if width < DESKTOP_MIN {
            Breakpoint::Tablet
        } else if width < LARGE_DESKTOP_MIN {
            Breakpoint::Desktop
        } else {
            Breakpoint::LargeDesktop
        }
    }

    /// 斷點名稱。 / Kebab-case breakpoint name.
    pub fn as_str(self) -> &'static str {
        match self {
            Breakpoint::SmallPhone => "small-phone",
            Breakpoint::NormalPhone => "normal-phone",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Desktop => "desktop",
            Breakpoint::LargeDesktop => "large-desktop",
        }
    }

    /// 是否為手機。 / Small or normal phone.
    pub fn is_mobile(self) -> bool {
        matches!(self, Breakpoint::SmallPhone | Breakpoint::NormalPhone)
    }

    /// 是否為桌面。 / Desktop or large desktop.
    pub fn is_desktop_or_larger(self) -> bool {
        matches!(self, Breakpoint::Desktop | Breakpoint::LargeDesktop)
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportInfo {
    pub width: u32,
    pub height: u32,
    pub breakpoint: Breakpoint,
    pub orientation: Orientation,
    pub aspect_ratio: f64,
    /// Best guess: mobile widths always count as touch.
    pub is_touch: bool,
}

impl ViewportInfo {
    /// 計算視窗資訊。 / Derives breakpoint, orientation and touch flags from a size.
    pub fn new(width: u32, height: u32, touch_capable: bool) -> Self {
        let breakpoint = Breakpoint::for_width(width);
        let orientation = if height > width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        };
        let aspect_ratio = if height == 0 {
            0.0
        } else {
            f64::from(width) / f64::from(height)
        };
        Self {
            width,
            height,
            breakpoint,
            orientation,
            aspect_ratio,
            is_touch: breakpoint.is_mobile() || touch_capable,
        }
    }

    /// 小型手機。 / Whether the width is below the small-phone limit.
    pub fn is_small_phone(&self) -> bool {
        self.breakpoint == Breakpoint::SmallPhone
    }

    /// 一般手機。 / Whether the breakpoint is a normal phone.
    pub fn is_normal_phone(&self) -> bool {
        self.breakpoint == Breakpoint::NormalPhone
    }

    /// 平板。 / Whether the breakpoint is a tablet.
    pub fn is_tablet(&self) -> bool {
        self.breakpoint == Breakpoint::Tablet
    }

    /// 桌面。 / Whether the breakpoint is a desktop.
    pub fn is_desktop(&self) -> bool {
        self.breakpoint == Breakpoint::Desktop
    }

    /// 大型桌面。 / Whether the breakpoint is a large desktop.
    pub fn is_large_desktop(&self) -> bool {
        self.breakpoint == Breakpoint::LargeDesktop
    }

    /// 是否為手機。 / Small or normal phone.
    pub fn is_mobile(&self) -> bool {
        self.breakpoint.is_mobile()
    }

    /// 是否為桌面。 / Desktop or large desktop.
    pub fn is_desktop_or_larger(&self) -> bool {
        self.breakpoint.is_desktop_or_larger()
    }
}

impl Default for ViewportInfo {
    fn default() -> Self {
        let (width, height) = SERVER_VIEWPORT;
        Self::new(width, height, false)
    }
}

/// 依斷點取值。 / Picks the value configured for `breakpoint`, or `fallback` when none is.
pub fn breakpoint_value<'a, T>(
    breakpoint: Breakpoint,
    values: &'a [(Breakpoint, T)],
    fallback: &'a T,
) -> &'a T {
    values
        .iter()
        .find(|(candidate, _)| *candidate == breakpoint)
        .map(|(_, value)| value)
        .unwrap_or(fallback)
}

/// 縮放防抖。 / Trailing-edge debouncer: fires once the input has been quiet for the window.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    window: Duration,
    pending: Option<(Instant, (u32, u32))>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}

impl ResizeDebouncer {
    /// 建立防抖器。 / Debouncer with a custom quiet window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// 是否等待中。 / Whether a resize is waiting to settle.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 記錄縮放。 / Records a resize event; restarts the quiet window.
    pub fn resized(&mut self, width: u32, height: u32, now: Instant) {
        self.pending = Some((now + self.window, (width, height)));
    }

    /// 取得穩定尺寸。 / Returns the settled viewport once the window has elapsed.
    pub fn poll(&mut self, now: Instant, touch_capable: bool) -> Option<ViewportInfo> {
        match self.pending {
            Some((due, (width, height))) if now >= due => {
                self.pending = None;
                tracing::trace!(width, height, "viewport settled");
                Some(ViewportInfo::new(width, height, touch_capable))
            }
            _ => None,
        }
    }
}
