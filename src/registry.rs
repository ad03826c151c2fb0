//! Surface registry
//!
//! Maps each page to a persistent overlay layer and its set of active
//! agents. Surfaces are never removed once registered: a page that
//! scrolls out of view keeps its surface so in-flight agents finish their
//! route undisturbed.

use ahash::AHashMap;

use crate::agent::{Agent, AgentId};
use crate::stage::{OverlayId, PageId, PageStage};

/// One registered page surface.
#[derive(Debug)]
pub struct Surface {
    /// Host-side overlay layer hosting this surface's sprites
    pub overlay: OverlayId,
    /// Active agents, including despawned ones awaiting removal
    pub agents: AHashMap<AgentId, Agent>,
}

impl Surface {
    fn new(overlay: OverlayId) -> Self {
        Self {
            overlay,
            agents: AHashMap::new(),
        }
    }

    /// Agents still integrating (not yet despawned).
    pub fn alive_count(&self) -> usize {
        self.agents.values().filter(|a| a.alive).count()
    }
}

/// Registry of all surfaces that have ever been visible.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: AHashMap<PageId, Surface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self {
            surfaces: AHashMap::new(),
        }
    }

    /// Ensure each visible page has an attached, full-bleed overlay.
    ///
    /// Lazily creates overlays on first sight; reattaches an overlay the
    /// page-turning library detached by reparenting nodes; re-asserts
    /// sizing every call since external style resets can undo it. Safe to
    /// call every tick, on resize and on turn completion without creating
    /// duplicates.
    pub fn ensure(&mut self, stage: &mut impl PageStage, visible: &[PageId]) {
        for &page in visible {
            match self.surfaces.get(&page) {
                None => {
                    let overlay = stage.create_overlay(page);
                    stage.restyle_overlay(overlay);
                    self.surfaces.insert(page, Surface::new(overlay));
                    log::debug!("Registered surface {page}");
                }
                Some(surface) => {
                    let overlay = surface.overlay;
                    if !stage.overlay_attached(overlay, page) {
                        stage.reattach_overlay(overlay, page);
                        log::debug!("Reattached overlay on {page}");
                    }
                    stage.restyle_overlay(overlay);
                }
            }
        }
    }

    pub fn get(&self, page: PageId) -> Option<&Surface> {
        self.surfaces.get(&page)
    }

    pub fn get_mut(&mut self, page: PageId) -> Option<&mut Surface> {
        self.surfaces.get_mut(&page)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PageId, &Surface)> {
        self.surfaces.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&PageId, &mut Surface)> {
        self.surfaces.iter_mut()
    }

    /// Number of registered surfaces (visible or not).
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Total agents across all surfaces, including those awaiting removal.
    pub fn agent_count(&self) -> usize {
        self.surfaces.values().map(|s| s.agents.len()).sum()
    }

    /// Alive agents across all surfaces.
    pub fn alive_count(&self) -> usize {
        self.surfaces.values().map(|s| s.alive_count()).sum()
    }

    /// Remove one agent from its surface, if both still exist.
    pub fn remove_agent(&mut self, page: PageId, agent: AgentId) -> Option<Agent> {
        self.surfaces.get_mut(&page)?.agents.remove(&agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoBook;

    fn spread() -> DemoBook {
        DemoBook::spread(400.0, 300.0)
    }

    #[test]
    fn test_ensure_is_lazy_and_idempotent() {
        let mut book = spread();
        let mut registry = SurfaceRegistry::new();
        let visible = book.pages();

        registry.ensure(&mut book, &visible);
        assert_eq!(registry.surface_count(), 2);
        assert_eq!(book.overlays_created(), 2);

        // No DOM change between calls: no duplicate layers
        registry.ensure(&mut book, &visible);
        registry.ensure(&mut book, &visible);
        assert_eq!(registry.surface_count(), 2);
        assert_eq!(book.overlays_created(), 2);
    }

    #[test]
    fn test_ensure_reattaches_detached_overlay() {
        let mut book = spread();
        let mut registry = SurfaceRegistry::new();
        let visible = book.pages();

        registry.ensure(&mut book, &visible);
        let page = visible[0];
        let overlay = registry.get(page).unwrap().overlay;

        // Simulate the page-turning library reparenting the page
        book.detach_overlay(overlay);
        assert!(!book.overlay_attached(overlay, page));

        registry.ensure(&mut book, &visible);
        assert!(book.overlay_attached(overlay, page));
        // Reattachment, not re-creation
        assert_eq!(book.overlays_created(), 2);
    }

    #[test]
    fn test_surfaces_survive_leaving_view() {
        let mut book = spread();
        let mut registry = SurfaceRegistry::new();
        let visible = book.pages();

        registry.ensure(&mut book, &visible);
        assert_eq!(registry.surface_count(), 2);

        // Nothing visible this cycle; registry keeps everything
        registry.ensure(&mut book, &[]);
        assert_eq!(registry.surface_count(), 2);
    }
}
