//! Scroll and pointer input bridge
//!
//! Reduces raw window events into the two normalized signals the backdrop
//! consumes: scroll progress in [0, 1] and a pointer offset in [-1, 1] on
//! both axes. The trackers hold no references to the window; the host feeds
//! them raw values and forwards the normalized results to the driver.

/// Tracks an absolute scroll offset through a virtual page and reduces it to
/// a progress value.
///
/// Progress is 0 at the top of the page and 1 at the bottom. When the
/// content fits inside the viewport there is nothing to scroll, and the
/// progress stays 0.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTracker {
    offset: f32,
    viewport: f32,
    content: f32,
}

impl ScrollTracker {
    pub fn new(viewport: f32, content: f32) -> Self {
        Self {
            offset: 0.0,
            viewport,
            content,
        }
    }

    /// Updates the viewport/content heights, clamping the current offset
    /// into the new scrollable range.
    pub fn set_metrics(&mut self, viewport: f32, content: f32) {
        self.viewport = viewport;
        self.content = content;
        self.offset = self.offset.clamp(0.0, self.scrollable());
    }

    /// Applies a scroll delta (positive scrolls down) and returns the new
    /// progress.
    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        if delta.is_finite() {
            self.offset = (self.offset + delta).clamp(0.0, self.scrollable());
        }
        self.progress()
    }

    /// Current progress in [0, 1].
    pub fn progress(&self) -> f32 {
        let scrollable = self.scrollable();
        if scrollable <= 0.0 {
            0.0
        } else {
            self.offset / scrollable
        }
    }

    fn scrollable(&self) -> f32 {
        (self.content - self.viewport).max(0.0)
    }
}

/// Converts window-space cursor positions into offsets in [-1, 1].
#[derive(Debug, Clone, Copy)]
pub struct PointerTracker {
    width: f32,
    height: f32,
}

impl PointerTracker {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Normalizes a cursor position: the window center maps to (0, 0), the
    /// edges to ±1.
    pub fn normalize(&self, x: f32, y: f32) -> (f32, f32) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return (0.0, 0.0);
        }
        let nx = (x / self.width - 0.5) * 2.0;
        let ny = (y / self.height - 0.5) * 2.0;
        (nx.clamp(-1.0, 1.0), ny.clamp(-1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_spans_zero_to_one() {
        let mut scroll = ScrollTracker::new(800.0, 4800.0);
        assert_eq!(scroll.progress(), 0.0);

        scroll.scroll_by(2000.0);
        assert!((scroll.progress() - 0.5).abs() < 1e-6);

        scroll.scroll_by(1_000_000.0);
        assert_eq!(scroll.progress(), 1.0);

        scroll.scroll_by(-1_000_000.0);
        assert_eq!(scroll.progress(), 0.0);
    }

    #[test]
    fn test_degenerate_content_yields_zero() {
        let mut scroll = ScrollTracker::new(800.0, 600.0);
        scroll.scroll_by(500.0);
        assert_eq!(scroll.progress(), 0.0);
    }

    #[test]
    fn test_metrics_change_clamps_offset() {
        let mut scroll = ScrollTracker::new(800.0, 4800.0);
        scroll.scroll_by(4000.0);
        scroll.set_metrics(800.0, 1800.0);
        assert_eq!(scroll.progress(), 1.0);
    }

    #[test]
    fn test_non_finite_delta_is_ignored() {
        let mut scroll = ScrollTracker::new(800.0, 4800.0);
        scroll.scroll_by(2000.0);
        let before = scroll.progress();
        scroll.scroll_by(f32::NAN);
        assert_eq!(before, scroll.progress());
    }

    #[test]
    fn test_pointer_center_maps_to_origin() {
        let pointer = PointerTracker::new(1200.0, 800.0);
        let (nx, ny) = pointer.normalize(600.0, 400.0);
        assert_eq!(nx, 0.0);
        assert_eq!(ny, 0.0);
    }

    #[test]
    fn test_pointer_corners_map_to_units() {
        let pointer = PointerTracker::new(1200.0, 800.0);
        assert_eq!(pointer.normalize(0.0, 0.0), (-1.0, -1.0));
        assert_eq!(pointer.normalize(1200.0, 800.0), (1.0, 1.0));
    }

    #[test]
    fn test_pointer_with_zero_size_is_safe() {
        let pointer = PointerTracker::new(0.0, 0.0);
        assert_eq!(pointer.normalize(100.0, 100.0), (0.0, 0.0));
    }
}
