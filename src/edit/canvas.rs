use glam::Vec2;

use crate::animation::{AnimationClock, Timeline};
use crate::scene::components::{DirtyFlags, NameComponent, SolidFillComponent};
use crate::scene::{Entity, SceneHandle, SceneManager};

/// One editable document.
///
/// The board scene holds the white board rectangle and, nested inside it, the
/// main scene the user draws into. Moving the board scene's proxy pans the
/// whole canvas. The control scene is a separate top-level scene for
/// selection quads, so they never mix with user content.
#[derive(Debug, Clone)]
pub struct Canvas {
    canvas_scene: SceneHandle,
    main_scene: SceneHandle,
    control_scene: SceneHandle,
    board: Entity,
    pub timeline: Timeline,
}

impl Canvas {
    pub fn new(manager: &mut SceneManager) -> Self {
        let canvas_scene = manager.create_scene(None);

        let settings = manager.settings();
        let (origin, size, color) = (settings.board_origin, settings.board_size, settings.board_color);
        let board = manager.create_rect_fill_layer(canvas_scene, origin, size);
        manager.get_component_mut::<NameComponent>(board).name = "Board".to_owned();
        manager.get_component_mut::<SolidFillComponent>(board).color = color;
        manager.set_dirty(board, DirtyFlags::FILL);
        manager.update_entity(board);

        let main_scene = manager.create_scene(Some(canvas_scene));
        let control_scene = manager.create_scene(None);

        log::debug!("Created canvas: board {canvas_scene:?}, main {main_scene:?}, control {control_scene:?}");

        Self {
            canvas_scene,
            main_scene,
            control_scene,
            board,
            timeline: Timeline::default(),
        }
    }

    /// Runs the update pipeline at the timeline's current frame, then
    /// reclaims destroyed entities. Returns `true` if a repaint is needed.
    pub fn on_update(&self, manager: &mut SceneManager) -> bool {
        let frame = self.timeline.current_frame();
        let mut changed = manager.update(self.canvas_scene, frame);
        changed |= manager.update(self.control_scene, frame);

        manager.sweep(self.canvas_scene);
        manager.sweep(self.control_scene);
        changed
    }

    /// Tears down every scene of the canvas.
    pub fn on_destroy(&self, manager: &mut SceneManager) {
        manager.remove_scene(self.canvas_scene);
        manager.remove_scene(self.control_scene);
    }

    /// Pans the whole canvas by `delta`.
    pub fn move_camera(&self, manager: &mut SceneManager, delta: Vec2) -> bool {
        let Some(proxy) = manager.scene(self.canvas_scene).and_then(|s| s.proxy()) else {
            return false;
        };
        manager.move_by_delta(proxy, delta)
    }

    #[inline]
    #[must_use]
    pub fn canvas_scene(&self) -> SceneHandle {
        self.canvas_scene
    }

    #[inline]
    #[must_use]
    pub fn main_scene(&self) -> SceneHandle {
        self.main_scene
    }

    #[inline]
    #[must_use]
    pub fn control_scene(&self) -> SceneHandle {
        self.control_scene
    }

    #[inline]
    #[must_use]
    pub fn board(&self) -> Entity {
        self.board
    }
}
