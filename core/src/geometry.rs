//! Screen rectangle math shared by the fullscreen watcher and the platform
//! layer.

/// Axis-aligned rectangle in screen coordinates, stored as edges.
///
/// Matches the Win32 `RECT` convention: `right` and `bottom` are exclusive,
/// so a window covering a 1920x1080 screen is `(0, 0, 1920, 1080)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// True iff this rect exactly covers a screen of the given size.
    ///
    /// All four edges must match. A maximized-but-bordered window whose
    /// frame hangs a few pixels past the screen edges does not count, and
    /// neither does an off-by-one on any edge.
    pub fn covers_screen(&self, screen_width: i32, screen_height: i32) -> bool {
        self.left == 0 && self.top == 0 && self.right == screen_width && self.bottom == screen_height
    }

    /// The same rect with a strip of `height` pixels removed from the top.
    /// This is the shape the work-area reservation applies.
    pub fn without_top_strip(&self, height: i32) -> Self {
        Self {
            top: self.top + height,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: i32 = 1920;
    const H: i32 = 1080;

    #[test]
    fn exact_cover_is_fullscreen() {
        assert!(ScreenRect::new(0, 0, W, H).covers_screen(W, H));
    }

    #[test]
    fn off_by_one_on_any_edge_is_not_fullscreen() {
        assert!(!ScreenRect::new(1, 0, W, H).covers_screen(W, H));
        assert!(!ScreenRect::new(-1, 0, W, H).covers_screen(W, H));
        assert!(!ScreenRect::new(0, 1, W, H).covers_screen(W, H));
        assert!(!ScreenRect::new(0, -1, W, H).covers_screen(W, H));
        assert!(!ScreenRect::new(0, 0, W - 1, H).covers_screen(W, H));
        assert!(!ScreenRect::new(0, 0, W + 1, H).covers_screen(W, H));
        assert!(!ScreenRect::new(0, 0, W, H - 1).covers_screen(W, H));
        assert!(!ScreenRect::new(0, 0, W, H + 1).covers_screen(W, H));
    }

    #[test]
    fn maximized_window_with_border_is_not_fullscreen() {
        // Maximized windows on Windows overhang the screen by the frame width
        assert!(!ScreenRect::new(-8, -8, W + 8, H + 8).covers_screen(W, H));
    }

    #[test]
    fn top_strip_removal() {
        let full = ScreenRect::new(0, 0, W, H);
        let shrunk = full.without_top_strip(30);
        assert_eq!(shrunk, ScreenRect::new(0, 30, W, H));
        assert_eq!(shrunk.height(), H - 30);
        assert_eq!(shrunk.width(), W);
    }
}
