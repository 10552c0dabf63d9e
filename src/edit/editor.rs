use slotmap::{SlotMap, new_key_type};

use crate::animation::AnimationClock;
use crate::edit::Canvas;
use crate::scene::{EntityId, SceneManager};
use crate::settings::EditorSettings;

new_key_type! {
    pub struct CanvasHandle;
}

/// Editing context: the scene manager, every open canvas, and which one has
/// focus. Edits key their keyframes off the focused canvas's timeline.
pub struct Editor {
    manager: SceneManager,
    canvases: SlotMap<CanvasHandle, Canvas>,
    focused: Option<CanvasHandle>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl Editor {
    #[must_use]
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            manager: SceneManager::with_settings(settings),
            canvases: SlotMap::with_key(),
            focused: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn manager(&self) -> &SceneManager {
        &self.manager
    }

    #[inline]
    pub fn manager_mut(&mut self) -> &mut SceneManager {
        &mut self.manager
    }

    // ========================================================================
    // Canvases
    // ========================================================================

    pub fn create_canvas(&mut self) -> CanvasHandle {
        let canvas = Canvas::new(&mut self.manager);
        self.canvases.insert(canvas)
    }

    /// Closes a canvas and drops every scene it owns. Clears focus if it had it.
    pub fn destroy_canvas(&mut self, handle: CanvasHandle) -> bool {
        let Some(canvas) = self.canvases.remove(handle) else {
            return false;
        };
        canvas.on_destroy(&mut self.manager);
        if self.focused == Some(handle) {
            self.focused = None;
        }
        true
    }

    /// Gives `handle` focus. An unknown handle leaves focus unchanged.
    pub fn focus(&mut self, handle: CanvasHandle) -> bool {
        if !self.canvases.contains_key(handle) {
            log::warn!("Cannot focus unknown canvas {handle:?}");
            return false;
        }
        self.focused = Some(handle);
        true
    }

    #[inline]
    #[must_use]
    pub fn focused(&self) -> Option<CanvasHandle> {
        self.focused
    }

    #[must_use]
    pub fn canvas(&self, handle: CanvasHandle) -> Option<&Canvas> {
        self.canvases.get(handle)
    }

    pub fn canvas_mut(&mut self, handle: CanvasHandle) -> Option<&mut Canvas> {
        self.canvases.get_mut(handle)
    }

    #[must_use]
    pub fn focused_canvas(&self) -> Option<&Canvas> {
        self.canvases.get(self.focused?)
    }

    pub fn focused_canvas_mut(&mut self) -> Option<&mut Canvas> {
        self.canvases.get_mut(self.focused?)
    }

    /// Id of the focused canvas's main scene, the usual target of `create_*`.
    #[must_use]
    pub fn main_scene_id(&self) -> Option<EntityId> {
        let canvas = self.focused_canvas()?;
        self.manager.scene(canvas.main_scene()).map(|s| s.id())
    }

    // ========================================================================
    // Clock
    // ========================================================================

    /// Frame edits are keyed at, or `None` while the focused canvas plays.
    #[must_use]
    pub fn authoring_frame(&self) -> Option<u32> {
        self.is_paused().then(|| self.key_frame())
    }

    /// Advances the focused timeline by `dt` seconds and updates its canvas.
    ///
    /// Returns `true` if anything needs repainting.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(handle) = self.focused else {
            return false;
        };
        let Some(canvas) = self.canvases.get_mut(handle) else {
            return false;
        };
        canvas.timeline.advance(dt);
        canvas.on_update(&mut self.manager)
    }
}

/// Playback state of the focused canvas. Without focus the clock reads as
/// paused at frame 0.
impl AnimationClock for Editor {
    fn current_frame(&self) -> f32 {
        self.focused_canvas()
            .map_or(0.0, |c| c.timeline.current_frame())
    }

    fn is_paused(&self) -> bool {
        self.focused_canvas()
            .is_none_or(|c| c.timeline.is_paused())
    }
}
