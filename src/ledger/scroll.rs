//! Near-bottom detection for scroll-triggered loading

/// Viewport measurements reported by a scrolling view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    /// Distance scrolled from the top
    pub scroll_top: f64,
    /// Height of the visible area
    pub client_height: f64,
    /// Height of the full scrollable content
    pub scroll_height: f64,
}

impl ScrollPosition {
    pub fn new(scroll_top: f64, client_height: f64, scroll_height: f64) -> Self {
        Self {
            scroll_top,
            client_height,
            scroll_height,
        }
    }

    /// Remaining distance below the visible area
    pub fn distance_to_bottom(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    /// True when the viewport is within `threshold` of the end
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.distance_to_bottom() < threshold
    }
}
