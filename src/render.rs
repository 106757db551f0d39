//! Render sink contract
//!
//! Once per tick the loop builds an ordered draw list (ascending layer,
//! then entity id) plus a HUD snapshot and hands both to a sink. Pixel
//! formats and text layout belong to the sink.

use crate::sim::{EntityId, FrameHandle, GameState, GroupTag, Rect, SessionPhase};

/// One sprite to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub id: EntityId,
    pub frame: FrameHandle,
    pub rect: Rect,
    pub layer: i32,
    pub flip_x: bool,
}

/// Overlay values shown during play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hud {
    pub level: usize,
    pub score: u64,
    pub high_score: u64,
    pub lives: u32,
    pub ammo: u32,
    pub kills: u32,
    pub vaccines: u32,
    pub platforms_left: u32,
    pub paused: bool,
}

/// Full-screen text pages outside gameplay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Intro { high_score: u64 },
    LevelIntro { level: usize, name: String },
    GameOver { score: u64, high_score: u64, new_best: bool },
}

pub trait RenderSink {
    /// One gameplay frame
    fn frame(&mut self, commands: &[DrawCommand], hud: &Hud);

    /// A text page; called once when it is shown
    fn screen(&mut self, screen: &Screen);
}

/// Draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRender;

impl RenderSink for NullRender {
    fn frame(&mut self, _commands: &[DrawCommand], _hud: &Hud) {}
    fn screen(&mut self, _screen: &Screen) {}
}

/// Keeps counts and the last HUD; used by the headless binary
#[derive(Debug, Default, Clone)]
pub struct FrameStats {
    pub frames: u64,
    pub commands: u64,
    pub last_hud: Hud,
    pub screens: Vec<Screen>,
}

impl RenderSink for FrameStats {
    fn frame(&mut self, commands: &[DrawCommand], hud: &Hud) {
        self.frames += 1;
        self.commands += commands.len() as u64;
        self.last_hud = *hud;
    }

    fn screen(&mut self, screen: &Screen) {
        log::info!("{screen:?}");
        self.screens.push(screen.clone());
    }
}

/// Every live entity in draw order
pub fn draw_list(state: &GameState) -> Vec<DrawCommand> {
    let mut commands: Vec<DrawCommand> = state
        .registry
        .iter(GroupTag::All)
        .map(|e| DrawCommand {
            id: e.id,
            frame: e.sprite.handle,
            rect: e.rect(),
            layer: e.layer,
            flip_x: e.sprite.flip_x,
        })
        .collect();
    commands.sort_by_key(|c| (c.layer, c.id));
    commands
}

pub fn hud(state: &GameState, high_score: u64) -> Hud {
    let counters = &state.session.counters;
    Hud {
        level: state.session.level,
        score: counters.score,
        high_score,
        lives: state.lives(),
        ammo: state.ammo(),
        kills: counters.kills,
        vaccines: counters.vaccines,
        platforms_left: state
            .level_spec()
            .platform_budget
            .saturating_sub(counters.platforms_crossed),
        paused: state.session.phase == SessionPhase::Paused,
    }
}
