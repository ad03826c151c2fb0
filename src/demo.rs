//! Scripted demo book
//!
//! A synthetic stage for the demo binary and the integration tests: a
//! two-page spread with scripted page turns. A turn animates the page
//! width down through zero and back, which is what a real page-turn
//! library does to bounding boxes mid-flip, and finishes by detaching the
//! page's overlay the way DOM reparenting does. This exercises every
//! degenerate-geometry and reattachment path in the engine without a
//! browser.

use ahash::AHashMap;
use glam::Vec2;

use crate::stage::{OverlayId, PageId, PageStage, Rect, SpriteId, StageEvent};

#[derive(Debug, Clone)]
struct DemoPage {
    rect: Rect,
    full_width: f32,
}

#[derive(Debug, Clone)]
struct DemoOverlay {
    page: PageId,
    attached: bool,
}

#[derive(Debug, Clone)]
struct DemoSprite {
    overlay: OverlayId,
    position: Vec2,
    rotation: f32,
    frame: usize,
    exiting: bool,
}

#[derive(Debug, Clone)]
struct TurnScript {
    page: usize,
    elapsed: f32,
    duration: f32,
}

/// In-memory book viewer standing in for the real page-turning host.
#[derive(Debug, Default)]
pub struct DemoBook {
    pages: Vec<DemoPage>,
    viewport_height: f32,
    reduced_motion: bool,
    turn_events: bool,
    overlays: AHashMap<OverlayId, DemoOverlay>,
    sprites: AHashMap<SpriteId, DemoSprite>,
    next_overlay: u64,
    next_sprite: u64,
    overlays_created: usize,
    sprites_removed: usize,
    turn: Option<TurnScript>,
}

impl DemoBook {
    /// Open two-page spread, both pages `w` x `h`, side by side.
    pub fn spread(w: f32, h: f32) -> Self {
        Self {
            pages: vec![
                DemoPage {
                    rect: Rect::new(0.0, 0.0, w, h),
                    full_width: w,
                },
                DemoPage {
                    rect: Rect::new(w, 0.0, w, h),
                    full_width: w,
                },
            ],
            viewport_height: h,
            reduced_motion: false,
            turn_events: true,
            overlays: AHashMap::new(),
            sprites: AHashMap::new(),
            next_overlay: 0,
            next_sprite: 0,
            overlays_created: 0,
            sprites_removed: 0,
            turn: None,
        }
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.reduced_motion = on;
    }

    pub fn set_turn_events(&mut self, on: bool) {
        self.turn_events = on;
    }

    /// Start a scripted turn of one page. The page's width collapses to
    /// zero at the midpoint and recovers by the end.
    pub fn begin_turn(&mut self, page: usize, duration: f32) -> StageEvent {
        self.turn = Some(TurnScript {
            page,
            elapsed: 0.0,
            duration: duration.max(0.01),
        });
        StageEvent::PageTurning
    }

    /// Whether a scripted turn is in progress.
    pub fn turning(&self) -> bool {
        self.turn.is_some()
    }

    /// Advance the scripted turn by `dt` seconds. Returns the event a real
    /// host would fire when the turn completes.
    pub fn update(&mut self, dt: f32) -> Option<StageEvent> {
        let turn = self.turn.as_mut()?;
        turn.elapsed += dt;
        let page = turn.page;
        let progress = turn.elapsed / turn.duration;
        let done = turn.elapsed >= turn.duration;

        if done {
            self.turn = None;
            self.pages[page].rect.width = self.pages[page].full_width;
            // The turn library rebuilt the page subtree; our overlay fell off
            for overlay in self.overlays.values_mut() {
                if overlay.page == PageId(page) {
                    overlay.attached = false;
                }
            }
            return Some(StageEvent::PageTurned);
        }

        // Triangle profile: full width -> 0 at the midpoint -> full width
        self.pages[page].rect.width = self.pages[page].full_width * (1.0 - 2.0 * progress).abs();
        None
    }

    /// Detach an overlay directly (simulates external DOM mutation).
    pub fn detach_overlay(&mut self, overlay: OverlayId) {
        if let Some(o) = self.overlays.get_mut(&overlay) {
            o.attached = false;
        }
    }

    /// Total overlays ever created; stays flat across repeated ensures.
    pub fn overlays_created(&self) -> usize {
        self.overlays_created
    }

    /// Sprites currently present in the host.
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Sprites removed over the book's lifetime.
    pub fn sprites_removed(&self) -> usize {
        self.sprites_removed
    }

    /// Sprites currently playing their exit transition.
    pub fn exiting_count(&self) -> usize {
        self.sprites.values().filter(|s| s.exiting).count()
    }

    /// Sprites currently hosted on one overlay.
    pub fn sprites_on(&self, overlay: OverlayId) -> usize {
        self.sprites.values().filter(|s| s.overlay == overlay).count()
    }

    /// Current frame index of every hosted sprite.
    pub fn sprite_frames(&self) -> Vec<usize> {
        self.sprites.values().map(|s| s.frame).collect()
    }

    /// Current position of every hosted sprite.
    pub fn sprite_positions(&self) -> Vec<Vec2> {
        self.sprites.values().map(|s| s.position).collect()
    }

    /// Current rotation of every hosted sprite.
    pub fn sprite_rotations(&self) -> Vec<f32> {
        self.sprites.values().map(|s| s.rotation).collect()
    }
}

impl PageStage for DemoBook {
    fn pages(&self) -> Vec<PageId> {
        (0..self.pages.len()).map(PageId).collect()
    }

    fn page_rect(&self, page: PageId) -> Option<Rect> {
        self.pages.get(page.0).map(|p| p.rect)
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn supports_turn_events(&self) -> bool {
        self.turn_events
    }

    fn create_overlay(&mut self, page: PageId) -> OverlayId {
        let id = OverlayId(self.next_overlay);
        self.next_overlay += 1;
        self.overlays.insert(
            id,
            DemoOverlay {
                page,
                attached: true,
            },
        );
        self.overlays_created += 1;
        id
    }

    fn overlay_attached(&self, overlay: OverlayId, page: PageId) -> bool {
        self.overlays
            .get(&overlay)
            .map(|o| o.attached && o.page == page)
            .unwrap_or(false)
    }

    fn reattach_overlay(&mut self, overlay: OverlayId, page: PageId) {
        if let Some(o) = self.overlays.get_mut(&overlay) {
            o.page = page;
            o.attached = true;
        }
    }

    fn restyle_overlay(&mut self, _overlay: OverlayId) {
        // Full-bleed sizing is implicit here; the overlay always measures
        // as its page's current rect.
    }

    fn overlay_size(&self, overlay: OverlayId) -> (f32, f32) {
        self.overlays
            .get(&overlay)
            .and_then(|o| self.pages.get(o.page.0))
            .map(|p| (p.rect.width, p.rect.height))
            .unwrap_or((0.0, 0.0))
    }

    fn create_sprite(&mut self, overlay: OverlayId) -> SpriteId {
        let id = SpriteId(self.next_sprite);
        self.next_sprite += 1;
        self.sprites.insert(
            id,
            DemoSprite {
                overlay,
                position: Vec2::ZERO,
                rotation: 0.0,
                frame: 0,
                exiting: false,
            },
        );
        id
    }

    fn place_sprite(&mut self, sprite: SpriteId, position: Vec2, rotation: f32) {
        if let Some(s) = self.sprites.get_mut(&sprite) {
            s.position = position;
            s.rotation = rotation;
        }
    }

    fn set_sprite_frame(&mut self, sprite: SpriteId, frame: usize) {
        if let Some(s) = self.sprites.get_mut(&sprite) {
            s.frame = frame;
        }
    }

    fn begin_exit(&mut self, sprite: SpriteId) {
        if let Some(s) = self.sprites.get_mut(&sprite) {
            s.exiting = true;
        }
    }

    fn remove_sprite(&mut self, sprite: SpriteId) {
        if self.sprites.remove(&sprite).is_some() {
            self.sprites_removed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_collapses_width_through_zero() {
        let mut book = DemoBook::spread(400.0, 300.0);
        book.begin_turn(0, 1.0);

        book.update(0.5);
        let rect = book.page_rect(PageId(0)).unwrap();
        assert!(rect.width < 1.0, "width should collapse at the midpoint");

        let event = book.update(0.6);
        assert_eq!(event, Some(StageEvent::PageTurned));
        assert_eq!(book.page_rect(PageId(0)).unwrap().width, 400.0);
    }

    #[test]
    fn test_turn_detaches_the_overlay() {
        let mut book = DemoBook::spread(400.0, 300.0);
        let overlay = book.create_overlay(PageId(0));
        assert!(book.overlay_attached(overlay, PageId(0)));

        book.begin_turn(0, 0.5);
        while book.update(0.1).is_none() {}

        assert!(!book.overlay_attached(overlay, PageId(0)));
        book.reattach_overlay(overlay, PageId(0));
        assert!(book.overlay_attached(overlay, PageId(0)));
    }

    #[test]
    fn test_sprite_bookkeeping() {
        let mut book = DemoBook::spread(400.0, 300.0);
        let overlay = book.create_overlay(PageId(0));
        let sprite = book.create_sprite(overlay);

        book.place_sprite(sprite, Vec2::new(10.0, 20.0), 0.5);
        assert_eq!(book.sprite_positions(), vec![Vec2::new(10.0, 20.0)]);

        book.begin_exit(sprite);
        assert_eq!(book.exiting_count(), 1);

        book.remove_sprite(sprite);
        assert_eq!(book.sprite_count(), 0);
        assert_eq!(book.sprites_removed(), 1);
    }
}
