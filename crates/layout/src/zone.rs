//! Fixed screen zones and the overlay that hosts zone content.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::container::ZoneContent;

/// 覆蓋層堆疊順序。 / Stacking order of the overlay root, above every section.
pub const OVERLAY_Z_INDEX: u16 = 100;

/// 畫面區域。 / One cell of the 3×3 screen grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Zone {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Zone {
    pub const ALL: [Zone; 9] = [
        Zone::TopLeft,
        Zone::TopCenter,
        Zone::TopRight,
        Zone::CenterLeft,
        Zone::Center,
        Zone::CenterRight,
        Zone::BottomLeft,
        Zone::BottomCenter,
        Zone::BottomRight,
    ];

    /// 區域名稱。 / Canonical kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Zone::TopLeft => "top-left",
            Zone::TopCenter => "top-center",
            Zone::TopRight => "top-right",
            Zone::CenterLeft => "center-left",
            Zone::Center => "center",
            Zone::CenterRight => "center-right",
            Zone::BottomLeft => "bottom-left",
            Zone::BottomCenter => "bottom-center",
            Zone::BottomRight => "bottom-right",
        }
    }

    fn anchors(self) -> (Anchor, Anchor) {
        use Anchor::{Center, End, Start};
        match self {
            Zone::TopLeft => (Start, Start),
            Zone::TopCenter => (Center, Start),
            Zone::TopRight => (End, Start),
            Zone::CenterLeft => (Start, Center),
            Zone::Center => (Center, Center),
            Zone::CenterRight => (End, Center),
            Zone::BottomLeft => (Start, End),
            Zone::BottomCenter => (Center, End),
            Zone::BottomRight => (End, End),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown zone `{0}`")]
pub struct UnknownZone(pub String);

impl FromStr for Zone {
    type Err = UnknownZone;

    /// Accepts the canonical names plus `middle-*` aliases for the centre row.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let canonical = match normalized.as_str() {
            "middle-left" => "center-left",
            "middle-center" | "middle" => "center",
            "middle-right" => "center-right",
            other => other,
        };
        Zone::ALL
            .into_iter()
            .find(|zone| zone.as_str() == canonical)
            .ok_or_else(|| UnknownZone(value.to_string()))
    }
}

/// 區域圖層。 / Named stacking layer inside a zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Background,
    #[default]
    Content,
    Navigation,
    Overlay,
}

impl Layer {
    pub const ALL: [Layer; 4] = [
        Layer::Background,
        Layer::Content,
        Layer::Navigation,
        Layer::Overlay,
    ];

    /// 圖層堆疊順序。 / Stacking order of the layer inside its zone.
    pub fn z_index(self) -> u16 {
        match self {
            Layer::Background => 0,
            Layer::Content => 10,
            Layer::Navigation => 20,
            Layer::Overlay => 30,
        }
    }

    /// 圖層名稱。 / Lowercase layer name.
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Background => "background",
            Layer::Content => "content",
            Layer::Navigation => "navigation",
            Layer::Overlay => "overlay",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layer `{0}`")]
pub struct UnknownLayer(pub String);

impl FromStr for Layer {
    type Err = UnknownLayer;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Layer::ALL
            .into_iter()
            .find(|layer| layer.as_str() == normalized)
            .ok_or_else(|| UnknownLayer(value.to_string()))
    }
}

/// 對齊位置。 / Position along one axis of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Center,
    End,
}

impl Anchor {
    fn flex_value(self) -> &'static str {
        match self {
            Anchor::Start => "flex-start",
            Anchor::Center => "center",
            Anchor::End => "flex-end",
        }
    }

    fn translate(self) -> i8 {
        match self {
            Anchor::Center => -50,
            Anchor::Start | Anchor::End => 0,
        }
    }
}

/// 區域定位。 / Resolved positioning rule for one piece of zone content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub zone: Zone,
    pub layer: Layer,
    pub horizontal: Anchor,
    pub vertical: Anchor,
    pub z_index: u16,
}

impl Placement {
    /// 解析區域定位。 / Resolves the anchors and stacking for a zone and layer.
    pub fn new(zone: Zone, layer: Layer) -> Self {
        let (horizontal, vertical) = zone.anchors();
        Self {
            zone,
            layer,
            horizontal,
            vertical,
            z_index: layer.z_index(),
        }
    }

    /// 行內樣式宣告。 / Inline style declarations, in emission order.
    pub fn css_declarations(&self) -> Vec<(&'static str, String)> {
        let mut declarations = vec![("position", "absolute".to_string())];
        match self.vertical {
            Anchor::Start => declarations.push(("top", "0".to_string())),
            Anchor::Center => declarations.push(("top", "50%".to_string())),
            Anchor::End => declarations.push(("bottom", "0".to_string())),
        }
        match self.horizontal {
            Anchor::Start => declarations.push(("left", "0".to_string())),
            Anchor::Center => declarations.push(("left", "50%".to_string())),
            Anchor::End => declarations.push(("right", "0".to_string())),
        }
        let (tx, ty) = (self.horizontal.translate(), self.vertical.translate());
        if tx != 0 || ty != 0 {
            declarations.push(("transform", format!("translate({tx}%, {ty}%)")));
        }
        declarations.push(("display", "flex".to_string()));
        declarations.push(("justify-content", self.horizontal.flex_value().to_string()));
        declarations.push(("align-items", self.vertical.flex_value().to_string()));
        declarations.push(("z-index", self.z_index.to_string()));
        declarations.push(("pointer-events", "auto".to_string()));
        declarations
    }

    /// 輸出樣式字串。 / Declarations joined into one inline style.
    pub fn css(&self) -> String {
        self.css_declarations()
            .into_iter()
            .map(|(property, value)| format!("{property}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub axis: GridAxis,
    /// Position as a fraction of the viewport.
    pub position: f64,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAxis {
    /// A vertical line, positioned horizontally.
    Column,
    /// A horizontal line, positioned vertically.
    Row,
}

/// 除錯格線。 / Visual guide drawn over the overlay while laying out zones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugGrid;

impl DebugGrid {
    /// 格線。 / Thirds and centre guides on both axes.
    pub fn lines(&self) -> Vec<GridLine> {
        let guides = [(1.0 / 3.0, 0.3), (0.5, 0.5), (2.0 / 3.0, 0.3)];
        [GridAxis::Column, GridAxis::Row]
            .into_iter()
            .flat_map(|axis| {
                guides.into_iter().map(move |(position, opacity)| GridLine {
                    axis,
                    position,
                    opacity,
                })
            })
            .collect()
    }

    /// 區域標籤。 / One label per zone, centred in its cell.
    pub fn labels(&self) -> Vec<(Zone, Placement)> {
        Zone::ALL
            .into_iter()
            .map(|zone| (zone, Placement::new(zone, Layer::Overlay)))
            .collect()
    }
}

/// 區域覆蓋層。 / Full-viewport layer that positions zone content without intercepting input.
#[derive(Debug)]
pub struct ZoneOverlay<'a, T> {
    elements: &'a [ZoneContent<T>],
    debug: Option<DebugGrid>,
}

impl<'a, T> ZoneOverlay<'a, T> {
    /// 建立覆蓋層。 / Wraps zone content, with the debug grid when requested.
    pub fn new(elements: &'a [ZoneContent<T>], debug: bool) -> Self {
        Self {
            elements,
            debug: debug.then_some(DebugGrid),
        }
    }

    /// 覆蓋層堆疊順序。 / Stacking order of the overlay root.
    pub fn z_index(&self) -> u16 {
        OVERLAY_Z_INDEX
    }

    /// 根節點指標事件。 / The overlay root never captures pointer events; placed elements do.
    pub fn root_pointer_events(&self) -> &'static str {
        "none"
    }

    /// 除錯格線。 / Debug grid, when enabled.
    pub fn debug_grid(&self) -> Option<DebugGrid> {
        self.debug
    }

    /// 元素數量。 / Number of placed elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// 是否為空。 / Whether there is nothing to place.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// 元素定位。 / Elements with their resolved placement, in child order.
    pub fn placements(&self) -> impl Iterator<Item = (Placement, &'a T)> + 'a {
        self.elements
            .iter()
            .map(|element| (Placement::new(element.zone, element.layer), &element.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_z_indices_are_fixed() {
        let indices: Vec<u16> = Layer::ALL.iter().map(|layer| layer.z_index()).collect();
        assert_eq!(indices, vec![0, 10, 20, 30]);
        assert!(OVERLAY_Z_INDEX > Layer::Overlay.z_index());
    }

    #[test]
    fn corner_zone_has_no_transform() {
        let css = Placement::new(Zone::BottomRight, Layer::Content).css();
        assert_eq!(
            css,
            "position: absolute; bottom: 0; right: 0; display: flex; \
             justify-content: flex-end; align-items: flex-end; z-index: 10; \
             pointer-events: auto;"
        );
    }

    #[test]
    fn centered_zones_translate_back_by_half() {
        let middle = Placement::new(Zone::Center, Layer::Overlay).css();
        assert!(middle.contains("top: 50%; left: 50%; transform: translate(-50%, -50%);"));

        let top = Placement::new(Zone::TopCenter, Layer::Navigation).css();
        assert!(top.contains("transform: translate(-50%, 0%);"));
        assert!(top.contains("z-index: 20;"));
    }

    #[test]
    fn zone_and_layer_names_parse() {
        assert_eq!("Bottom-Center".parse::<Zone>(), Ok(Zone::BottomCenter));
        assert_eq!("overlay".parse::<Layer>(), Ok(Layer::Overlay));
        assert_eq!("center".parse::<Zone>(), Ok(Zone::Center));
        assert_eq!("center-left".parse::<Zone>(), Ok(Zone::CenterLeft));
        assert_eq!("center-right".parse::<Zone>(), Ok(Zone::CenterRight));
        assert_eq!("middle-right".parse::<Zone>(), Ok(Zone::CenterRight));
        assert!("centre".parse::<Zone>().is_err());
        for zone in Zone::ALL {
            assert_eq!(zone.to_string().parse::<Zone>(), Ok(zone));
        }
    }

    #[test]
    fn debug_grid_draws_thirds_and_center() {
        let lines = DebugGrid.lines();
        assert_eq!(lines.len(), 6);
        let centers = lines.iter().filter(|line| line.position == 0.5).count();
        assert_eq!(centers, 2);
        assert_eq!(DebugGrid.labels().len(), 9);
    }

    #[test]
    fn overlay_preserves_child_order() {
        let elements = vec![
            ZoneContent {
                zone: Zone::TopLeft,
                layer: Layer::Navigation,
                content: "logo",
            },
            ZoneContent {
                zone: Zone::BottomRight,
                layer: Layer::Overlay,
                content: "chat",
            },
        ];
        let overlay = ZoneOverlay::new(&elements, false);
        assert_eq!(overlay.z_index(), 100);
        assert!(overlay.debug_grid().is_none());
        let placed: Vec<_> = overlay
            .placements()
            .map(|(placement, content)| (placement.zone, *content))
            .collect();
        assert_eq!(
            placed,
            vec![(Zone::TopLeft, "logo"), (Zone::BottomRight, "chat")]
        );
    }
}
