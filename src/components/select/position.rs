use gpui::{Bounds, Pixels, Point, Size, point, px};

use crate::error::SelectError;

/// Measurements taken when an options panel is about to be positioned. All
/// coordinates are window-relative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelGeometry {
    /// Bounds of the select trigger.
    pub trigger: Bounds<Pixels>,
    pub border_top: Pixels,
    pub border_bottom: Pixels,
    /// Height of the panel's content, when it has been laid out before.
    pub content_height: Option<Pixels>,
    /// Maximum height of the panel.
    pub max_height: Option<Pixels>,
    pub viewport: Size<Pixels>,
}

/// Where a fixed-position panel is anchored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Opens upwards; `bottom` is the distance from the viewport's bottom edge.
    Above { bottom: Pixels, left: Pixels },
    /// Opens downwards; `top` is the distance from the viewport's top edge.
    Below { top: Pixels, left: Pixels },
}

impl Placement {
    pub fn is_above(&self) -> bool {
        matches!(self, Self::Above { .. })
    }

    pub fn left(&self) -> Pixels {
        match self {
            Self::Above { left, .. } | Self::Below { left, .. } => *left,
        }
    }

    /// The window point the panel is anchored to: its bottom-left corner
    /// when above, its top-left corner when below.
    pub fn anchor_point(&self, viewport: Size<Pixels>) -> Point<Pixels> {
        match *self {
            Self::Above { bottom, left } => point(left, viewport.height - bottom),
            Self::Below { top, left } => point(left, top),
        }
    }
}

/// Snapshot of the room around a select trigger. Recomputed on every open.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptionsPosition {
    pub can_be_upward: bool,
    pub can_be_downward: bool,
    /// The side with more room, used when neither side fits.
    pub optimal: Placement,
    /// Anchor for an upward panel.
    pub bottom: Pixels,
    /// Anchor for a downward panel.
    pub top: Pixels,
    pub left: Pixels,
    pub width: Pixels,
    /// Height the panel will occupy.
    pub max_height: Pixels,
}

/// Measures the room above and below the trigger.
///
/// Fails with [`SelectError::MissingMaxHeight`] when the panel has no
/// positive maximum height.
pub fn options_position(geometry: &PanelGeometry) -> Result<OptionsPosition, SelectError> {
    let max_height = geometry
        .max_height
        .filter(|max_height| *max_height > px(0.))
        .ok_or(SelectError::MissingMaxHeight)?;
    let max_height = match geometry.content_height {
        Some(content_height) => content_height.min(max_height),
        None => max_height,
    };

    let trigger = geometry.trigger;
    let top_avail = trigger.origin.y;
    let bottom_avail = geometry.viewport.height - top_avail - trigger.size.height;

    let bottom = geometry.viewport.height - top_avail - geometry.border_top;
    let top = trigger.bottom() - geometry.border_bottom;
    let left = trigger.origin.x;

    Ok(OptionsPosition {
        can_be_upward: top_avail - max_height > px(0.),
        can_be_downward: bottom_avail > max_height,
        optimal: if bottom_avail > top_avail {
            Placement::Below { top, left }
        } else {
            Placement::Above { bottom, left }
        },
        bottom,
        top,
        left,
        width: trigger.size.width,
        max_height,
    })
}

impl OptionsPosition {
    /// Placement of a fixed panel: the preferred side if it fits, else the
    /// other side if that fits, else the side with more room.
    pub fn fixed_placement(&self, prefer_upward: bool) -> Placement {
        let above = Placement::Above {
            bottom: self.bottom,
            left: self.left,
        };
        let below = Placement::Below {
            top: self.top,
            left: self.left,
        };

        let placement = match (prefer_upward, self.can_be_upward, self.can_be_downward) {
            (true, true, _) => above,
            (true, false, true) => below,
            (false, _, true) => below,
            (false, true, false) => above,
            _ => self.optimal,
        };

        if placement.is_above() != prefer_upward {
            tracing::debug!(?placement, prefer_upward, "options panel flipped");
        }

        placement
    }

    /// Whether an inline panel that asks to open upwards actually does.
    pub fn effective_upward(&self, upward: bool) -> bool {
        upward && (self.can_be_upward || self.optimal.is_above())
    }
}
