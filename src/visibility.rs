//! Visible-surface detection
//!
//! Decides which page surfaces are currently on-screen and large enough
//! to host agents. Mid-turn pages report transient zero or near-zero
//! rects; the minimum-size filter keeps those out until geometry settles.

use std::cmp::Ordering;

use crate::config::SurfaceConfig;
use crate::stage::{PageId, PageStage, Rect};

/// An open book shows at most a two-page spread.
const MAX_VISIBLE: usize = 2;

/// Pages whose rect has practical size and intersects the viewport
/// vertically, largest first, at most two. An empty result means "no-op
/// this cycle", not an error.
pub fn visible_surfaces(stage: &impl PageStage, surface: &SurfaceConfig) -> Vec<PageId> {
    let candidates: Vec<(PageId, Rect)> = stage
        .pages()
        .into_iter()
        .filter_map(|page| stage.page_rect(page).map(|rect| (page, rect)))
        .collect();

    select_visible(candidates, stage.viewport_height(), surface.min_rect_px)
}

/// Filter and rank candidate rects; separated from the stage query so the
/// selection rules are testable on plain geometry.
fn select_visible(candidates: Vec<(PageId, Rect)>, viewport_height: f32, min_side: f32) -> Vec<PageId> {
    let mut visible: Vec<(PageId, Rect)> = candidates
        .into_iter()
        .filter(|(_, r)| r.width > min_side && r.height > min_side)
        .filter(|(_, r)| r.bottom() > 0.0 && r.y < viewport_height)
        .collect();

    // Prefer the two largest (typical open spread)
    visible.sort_by(|a, b| {
        b.1.area()
            .partial_cmp(&a.1.area())
            .unwrap_or(Ordering::Equal)
    });
    visible.truncate(MAX_VISIBLE);

    visible.into_iter().map(|(page, _)| page).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT_H: f32 = 800.0;
    const MIN_SIDE: f32 = 20.0;

    #[test]
    fn test_filters_degenerate_rects() {
        let candidates = vec![
            (PageId(0), Rect::new(0.0, 0.0, 0.0, 640.0)),
            (PageId(1), Rect::new(0.0, 0.0, 480.0, 640.0)),
            (PageId(2), Rect::new(0.0, 0.0, 15.0, 640.0)),
        ];

        let visible = select_visible(candidates, VIEWPORT_H, MIN_SIDE);
        assert_eq!(visible, vec![PageId(1)]);
    }

    #[test]
    fn test_filters_pages_outside_viewport() {
        let candidates = vec![
            // Fully above the viewport
            (PageId(0), Rect::new(0.0, -700.0, 480.0, 640.0)),
            // Fully below the viewport
            (PageId(1), Rect::new(0.0, 900.0, 480.0, 640.0)),
            // Partially visible at the top
            (PageId(2), Rect::new(0.0, -600.0, 480.0, 640.0)),
            (PageId(3), Rect::new(0.0, 100.0, 480.0, 640.0)),
        ];

        let visible = select_visible(candidates, VIEWPORT_H, MIN_SIDE);
        assert_eq!(visible.len(), 2);
        assert!(visible.contains(&PageId(2)));
        assert!(visible.contains(&PageId(3)));
    }

    #[test]
    fn test_two_largest_win() {
        let candidates = vec![
            (PageId(0), Rect::new(0.0, 0.0, 100.0, 100.0)),
            (PageId(1), Rect::new(0.0, 0.0, 480.0, 640.0)),
            (PageId(2), Rect::new(0.0, 0.0, 480.0, 620.0)),
            (PageId(3), Rect::new(0.0, 0.0, 50.0, 400.0)),
        ];

        let visible = select_visible(candidates, VIEWPORT_H, MIN_SIDE);
        assert_eq!(visible, vec![PageId(1), PageId(2)]);
    }

    #[test]
    fn test_nothing_qualifies_is_empty_not_error() {
        let candidates = vec![(PageId(0), Rect::new(0.0, 0.0, 1.0, 1.0))];
        let visible = select_visible(candidates, VIEWPORT_H, MIN_SIDE);
        assert!(visible.is_empty());
    }
}
