use crate::config::EngineConfig;
use crate::coords::{Rgb, Viewport};
use crate::error::Result;
use crate::input::{EventRouter, RawEvent};
use crate::stage::Stage;
use crate::vertex_buffer::QUAD_VERTICES;

use super::app::{AppControl, Game};

/// One entity's draw: six vertices starting at `slot * 6`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub first_vertex: u32,
    pub vertex_count: u32,
}

impl DrawCall {
    #[inline]
    pub fn for_slot(slot: u32) -> Self {
        Self {
            first_vertex: slot * QUAD_VERTICES,
            vertex_count: QUAD_VERTICES,
        }
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub viewport: Viewport,
    pub background: Rgb,
    /// Visible entities in draw-list order.
    pub draws: Vec<DrawCall>,
}

/// Owns the stage and the game and runs the per-frame sequence.
pub struct Engine<G: Game> {
    stage: Stage,
    game: G,
    router: EventRouter,
    frame_index: u64,
}

impl<G: Game> Engine<G> {
    /// Builds the stage and runs `game.create`.
    pub fn new(config: &EngineConfig, mut game: G) -> Result<Self> {
        let mut stage = Stage::new(config);
        game.create(&mut stage)?;
        log::info!(
            "engine ready: {} things, atlas {}x{}",
            stage.thing_count(),
            config.atlas_width,
            config.atlas_height
        );

        Ok(Self {
            stage,
            game,
            router: EventRouter::new(),
            frame_index: 0,
        })
    }

    #[inline]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[inline]
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    #[inline]
    pub fn game(&self) -> &G {
        &self.game
    }

    #[inline]
    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Feeds one window-system event through the router.
    /// Returns `false` if it was dropped (auto-repeat).
    pub fn handle_event(&mut self, event: impl Into<RawEvent>) -> bool {
        self.router.route(&mut self.stage, &mut self.game, event.into())
    }

    /// Runs one frame: game update, entity updates, draw-list compaction,
    /// render setup.
    ///
    /// Returns the game's control directive and the draw plan. The plan is
    /// built even when the game asks to exit.
    pub fn frame(&mut self) -> (AppControl, FramePlan) {
        let control = self.game.update(&mut self.stage);
        self.stage.dispatch(|behavior, thing, stage| behavior.update(thing, stage));
        self.stage.compact();
        self.game.render_setup(&mut self.stage);

        self.frame_index += 1;
        (control, self.plan())
    }

    /// Draw calls for the current draw list, hidden entities skipped.
    pub fn plan(&self) -> FramePlan {
        let draws = self
            .stage
            .draw_list()
            .iter()
            .filter(|&id| self.stage.thing(id).is_some_and(|t| t.visible))
            .map(|id| DrawCall::for_slot(id.slot()))
            .collect();

        FramePlan {
            viewport: self.stage.viewport(),
            background: self.stage.background(),
            draws,
        }
    }
}
