//! Game state and the top-level state machine
//!
//! One mode of {Start, Playing, Paused, Grave, Victory} holds at any time,
//! with one modal of {None, Lore, Quiz} nested inside Playing. The tick loop
//! only advances in the (Playing, None) product state; everything else is
//! driven by the command methods the UI layer calls.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::camera::Camera;
use crate::consts::*;
use crate::effects::Effects;
use crate::identity::PlayerIdentity;
use crate::level::{EnemyDef, EnemyKind, Level};
use crate::Rect;

/// Top-level game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Menu, awaiting an explicit start action
    Start,
    /// Simulation runs
    Playing,
    /// Simulation frozen, resume/restart on offer
    Paused,
    /// Death penalty: a ritual question gates the respawn
    Grave,
    /// Terminal; only exit is restart-to-menu
    Victory,
}

/// Modal sub-state nested inside Playing. Any non-None modal suspends the
/// tick loop without changing the top-level mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    None,
    Lore(LoreSource),
    Quiz(QuizPrompt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoreSource {
    /// An orb's flavor text; acknowledging routes to its quiz or collection
    Orb(u32),
    /// Composed NPC text; acknowledging just closes the modal
    Gate(String),
}

/// A review question queued behind an orb, with its presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizPrompt {
    pub orb_id: u32,
    pub question_id: u32,
    /// Display order of answer indices (shuffle is presentation-only)
    pub order: Vec<u8>,
}

/// The randomly drawn death-penalty question.
#[derive(Debug, Clone, PartialEq)]
pub struct GravePrompt {
    pub question_id: u32,
    pub order: Vec<u8>,
}

/// Transient, auto-clearing HUD message.
#[derive(Debug, Clone)]
pub struct Warning {
    pub text: String,
    pub frames_left: u32,
}

/// The player character. Single instance, exclusively owned by the sim.
#[derive(Debug, Clone, Copy)]
pub struct Player {
    /// Top-left of the collision box
    pub pos: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
    /// +1 facing right, -1 facing left
    pub facing: i8,
    pub jump_count: u8,
    /// Frames of post-ground jump eligibility remaining
    pub coyote: u32,
    /// Frames a buffered jump request stays armed
    pub jump_buffer: u32,
}

impl Player {
    pub fn at_spawn(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            grounded: false,
            facing: 1,
            jump_count: 0,
            coyote: 0,
            jump_buffer: 0,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0)
    }
}

/// A live patrol enemy; ping-pongs between its bounds.
#[derive(Debug, Clone, Copy)]
pub struct Enemy {
    pub pos: Vec2,
    pub dir: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub speed: f32,
    pub kind: EnemyKind,
}

impl Enemy {
    pub const WIDTH: f32 = 38.0;
    pub const HEIGHT: f32 = 44.0;

    pub fn from_def(def: &EnemyDef) -> Self {
        Self {
            pos: def.pos,
            dir: 1.0,
            min_x: def.min_x,
            max_x: def.max_x,
            speed: def.speed,
            kind: def.kind,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, Self::WIDTH, Self::HEIGHT)
    }

    /// One frame of ping-pong patrol.
    pub fn advance(&mut self) {
        self.pos.x += self.speed * self.dir;
        if self.pos.x <= self.min_x {
            self.pos.x = self.min_x;
            self.dir = 1.0;
        } else if self.pos.x + Self::WIDTH >= self.max_x {
            self.pos.x = self.max_x - Self::WIDTH;
            self.dir = -1.0;
        }
    }
}

/// Complete per-run state, owned by the game-loop driver and passed by
/// reference into each subsystem.
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: GameMode,
    pub modal: ModalState,
    pub player: Player,
    pub camera: Camera,
    pub enemies: Vec<Enemy>,

    /// Collected orb IDs; grows monotonically within a run
    pub collected: BTreeSet<u32>,
    /// Orbs forfeited by a wrong quiz answer; never collectible again
    pub discarded: BTreeSet<u32>,
    /// Orbs whose lore has been acknowledged at least once
    pub seen_lore: BTreeSet<u32>,
    /// Only ever incremented (orb points, victory bonus)
    pub score: u64,

    /// Checkpoints already passed (index into level.checkpoints)
    pub checkpoints_passed: usize,
    /// Respawn point; monotonic in x within a life
    pub respawn: Vec2,

    /// One-shot story flags
    pub greeted: bool,
    pub gate_opened: bool,

    pub identity: Option<PlayerIdentity>,
    /// Raised by the identity gate; the driver opens the name input
    pub identity_requested: bool,

    pub warning: Option<Warning>,
    /// Present exactly while mode == Grave
    pub grave: Option<GravePrompt>,
    /// Set on victory; the driver submits it to the leaderboard
    pub final_score: Option<u64>,

    pub effects: Effects,
    pub rng: Pcg32,
    pub time_ticks: u64,
    seed: u64,
}

impl GameState {
    pub fn new(level: &Level, seed: u64, identity: Option<PlayerIdentity>) -> Self {
        let player = Player::at_spawn(level.spawn);
        let mut camera = Camera::at(player.center());
        camera.snap(player.center(), level);
        Self {
            mode: GameMode::Start,
            modal: ModalState::None,
            player,
            camera,
            enemies: level.enemies.iter().map(Enemy::from_def).collect(),
            collected: BTreeSet::new(),
            discarded: BTreeSet::new(),
            seen_lore: BTreeSet::new(),
            score: 0,
            checkpoints_passed: 0,
            respawn: level.spawn,
            greeted: false,
            gate_opened: false,
            identity,
            identity_requested: false,
            warning: None,
            grave: None,
            final_score: None,
            effects: Effects::new(),
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            seed,
        }
    }

    /// Full reset back to the menu. Idempotent: calling twice leaves the
    /// same state as calling once. Identity survives (it came from the
    /// access token, not from the run).
    pub fn reset(&mut self, level: &Level) {
        let identity = self.identity.take();
        let view = self.camera.view;
        *self = Self::new(level, self.seed, identity);
        // Keep the surface aspect the driver already configured
        self.camera.view = view;
        self.camera.snap(self.player.center(), level);
    }

    /// Start (or restart) a run from the menu.
    pub fn start_run(&mut self) {
        if self.mode == GameMode::Start {
            self.mode = GameMode::Playing;
        }
    }

    /// Escape / pause button. Only toggles when no modal is open.
    pub fn toggle_pause(&mut self) {
        if self.modal != ModalState::None {
            return;
        }
        match self.mode {
            GameMode::Playing => self.mode = GameMode::Paused,
            GameMode::Paused => self.mode = GameMode::Playing,
            _ => {}
        }
    }

    /// Identity arrived from the name-input overlay.
    pub fn set_identity(&mut self, identity: PlayerIdentity) {
        self.identity = Some(identity);
        self.identity_requested = false;
    }

    /// Open a lore modal, freezing the player in place.
    pub fn open_lore(&mut self, source: LoreSource) {
        self.player.vel = Vec2::ZERO;
        self.modal = ModalState::Lore(source);
    }

    /// Acknowledge the open lore modal. Orb lore routes on to the linked
    /// quiz, or straight to collection when there is none.
    pub fn acknowledge_lore(&mut self, level: &Level) {
        let source = match std::mem::replace(&mut self.modal, ModalState::None) {
            ModalState::Lore(s) => s,
            other => {
                self.modal = other;
                return;
            }
        };
        match source {
            LoreSource::Gate(_) => {}
            LoreSource::Orb(orb_id) => {
                self.seen_lore.insert(orb_id);
                self.route_orb(level, orb_id);
            }
        }
    }

    /// After lore (or with lore already seen): quiz if linked, else collect.
    pub fn route_orb(&mut self, level: &Level, orb_id: u32) {
        let question = level.orb(orb_id).and_then(|o| o.question);
        match question {
            Some(question_id) => {
                let order = level
                    .question(question_id)
                    .map(|q| q.shuffled_order(&mut self.rng))
                    .unwrap_or_default();
                self.modal = ModalState::Quiz(QuizPrompt {
                    orb_id,
                    question_id,
                    order,
                });
            }
            None => self.collect_orb(level, orb_id),
        }
    }

    /// Answer the open review quiz by displayed slot. Correct collects the
    /// orb; incorrect discards the pending orb with no rollback of anything
    /// already held.
    pub fn answer_quiz(&mut self, level: &Level, slot: usize) {
        let prompt = match std::mem::replace(&mut self.modal, ModalState::None) {
            ModalState::Quiz(p) => p,
            other => {
                self.modal = other;
                return;
            }
        };
        if self.is_correct(level, prompt.question_id, &prompt.order, slot) {
            self.collect_orb(level, prompt.orb_id);
        } else {
            self.discarded.insert(prompt.orb_id);
            let name = level.orb(prompt.orb_id).map(|o| o.name).unwrap_or("orb");
            self.show_warning(format!("Not so. The {name} is lost to you."));
        }
    }

    /// Death: draw a penalty question from the ritual pool and enter Grave.
    pub fn enter_grave(&mut self, level: &Level) {
        self.player.vel = Vec2::ZERO;
        let center = self.player.center();
        self.effects.set_shake(12.0);
        self.effects.spawn_burst(center, &mut self.rng);

        let idx = self.rng.random_range(0..level.ritual.len());
        let question = &level.ritual[idx];
        let order = question.shuffled_order(&mut self.rng);
        self.grave = Some(GravePrompt {
            question_id: question.id,
            order,
        });
        self.modal = ModalState::None;
        self.mode = GameMode::Grave;
    }

    /// Answer the grave question. Correct respawns at the last checkpoint;
    /// incorrect forces a full reset to the menu.
    pub fn answer_grave(&mut self, level: &Level, slot: usize) {
        let prompt = match self.grave.take() {
            Some(p) => p,
            None => return,
        };
        if self.is_correct(level, prompt.question_id, &prompt.order, slot) {
            self.respawn(level);
        } else {
            self.reset(level);
        }
    }

    /// Back to the last checkpoint; enemies return to their patrol origins.
    pub fn respawn(&mut self, level: &Level) {
        self.player = Player::at_spawn(self.respawn);
        self.enemies = level.enemies.iter().map(Enemy::from_def).collect();
        self.camera.snap(self.player.center(), level);
        self.grave = None;
        self.warning = None;
        self.effects.clear();
        self.mode = GameMode::Playing;
        self.modal = ModalState::None;
    }

    /// Award an orb: monotonic set insert plus its points.
    pub fn collect_orb(&mut self, level: &Level, orb_id: u32) {
        let Some(orb) = level.orb(orb_id) else { return };
        if self.collected.insert(orb_id) {
            self.score += orb.points;
            let pos = orb.pos;
            self.effects.spawn_sparkle(pos, &mut self.rng);
        }
        self.modal = ModalState::None;
    }

    /// Rate-limited transient banner: only set when nothing is showing.
    pub fn show_warning(&mut self, text: String) {
        if self.warning.is_none() {
            self.warning = Some(Warning {
                text,
                frames_left: WARNING_FRAMES,
            });
        }
    }

    /// All required working tools in hand?
    pub fn has_required_tools(&self, level: &Level) -> bool {
        level.required_tools.iter().all(|id| self.collected.contains(id))
    }

    fn is_correct(&self, level: &Level, question_id: u32, order: &[u8], slot: usize) -> bool {
        let Some(question) = level.question(question_id) else {
            return false;
        };
        order
            .get(slot)
            .map(|&idx| idx as usize == question.correct_index())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    fn story_state() -> (Level, GameState) {
        let level = Level::story();
        let state = GameState::new(&level, 42, None);
        (level, state)
    }

    fn slot_of(level: &Level, question_id: u32, order: &[u8], correct: bool) -> usize {
        let q = level.question(question_id).unwrap();
        order
            .iter()
            .position(|&i| (i as usize == q.correct_index()) == correct)
            .unwrap()
    }

    #[test]
    fn reset_is_idempotent() {
        let (level, mut state) = story_state();
        state.start_run();
        state.score = 350;
        state.collected.insert(1);
        state.seen_lore.insert(1);
        state.greeted = true;
        state.player.pos.x = 3000.0;

        state.reset(&level);
        let once = format!("{state:?}");
        state.reset(&level);
        let twice = format!("{state:?}");
        assert_eq!(once, twice);
        assert_eq!(state.mode, GameMode::Start);
        assert_eq!(state.score, 0);
        assert!(state.collected.is_empty());
    }

    #[test]
    fn pause_round_trip_preserves_progress() {
        let (level, mut state) = story_state();
        state.start_run();
        state.collect_orb(&level, 5);
        let score = state.score;

        state.toggle_pause();
        assert_eq!(state.mode, GameMode::Paused);
        state.toggle_pause();
        assert_eq!(state.mode, GameMode::Playing);
        assert_eq!(state.score, score);
        assert!(state.collected.contains(&5));
    }

    #[test]
    fn pause_ignored_while_modal_open() {
        let (_, mut state) = story_state();
        state.start_run();
        state.open_lore(LoreSource::Orb(1));
        state.toggle_pause();
        assert_eq!(state.mode, GameMode::Playing);
    }

    #[test]
    fn lore_routes_to_linked_quiz_then_collects() {
        // Scenario C: first Skirret encounter is LORE -> QUIZ(1) -> +150
        let (level, mut state) = story_state();
        state.start_run();
        state.open_lore(LoreSource::Orb(1));
        state.acknowledge_lore(&level);

        let order = match &state.modal {
            ModalState::Quiz(p) => {
                assert_eq!(p.question_id, 1);
                assert_eq!(p.orb_id, 1);
                p.order.clone()
            }
            other => panic!("expected quiz modal, got {other:?}"),
        };
        assert!(state.seen_lore.contains(&1));

        let slot = slot_of(&level, 1, &order, true);
        state.answer_quiz(&level, slot);
        assert!(state.collected.contains(&1));
        assert_eq!(state.score, 150);
        assert_eq!(state.modal, ModalState::None);
    }

    #[test]
    fn wrong_quiz_answer_keeps_progress() {
        let (level, mut state) = story_state();
        state.start_run();
        state.collect_orb(&level, 3);
        let score = state.score;

        state.open_lore(LoreSource::Orb(1));
        state.acknowledge_lore(&level);
        let order = match &state.modal {
            ModalState::Quiz(p) => p.order.clone(),
            other => panic!("expected quiz, got {other:?}"),
        };
        let slot = slot_of(&level, 1, &order, false);
        state.answer_quiz(&level, slot);

        assert!(!state.collected.contains(&1));
        assert!(state.discarded.contains(&1));
        assert!(state.collected.contains(&3));
        assert_eq!(state.score, score);
        assert!(state.warning.is_some());
        assert_eq!(state.modal, ModalState::None);
    }

    #[test]
    fn gate_lore_just_closes() {
        let (level, mut state) = story_state();
        state.start_run();
        state.open_lore(LoreSource::Gate("Welcome".into()));
        state.acknowledge_lore(&level);
        assert_eq!(state.modal, ModalState::None);
        assert!(state.seen_lore.is_empty());
    }

    #[test]
    fn grave_draws_from_ritual_pool() {
        // Scenario B companion: the penalty question comes from the 101+ pool
        let (level, mut state) = story_state();
        state.start_run();
        state.enter_grave(&level);
        assert_eq!(state.mode, GameMode::Grave);
        let prompt = state.grave.as_ref().unwrap();
        assert!(prompt.question_id >= 101);
    }

    #[test]
    fn correct_grave_answer_respawns_at_checkpoint() {
        let (level, mut state) = story_state();
        state.start_run();
        state.respawn = Vec2::new(1200.0, level.ground_y - PLAYER_HEIGHT);
        state.collect_orb(&level, 1);
        state.enter_grave(&level);

        let prompt = state.grave.clone().unwrap();
        let slot = slot_of(&level, prompt.question_id, &prompt.order, true);
        state.answer_grave(&level, slot);

        assert_eq!(state.mode, GameMode::Playing);
        assert_eq!(state.player.pos, Vec2::new(1200.0, level.ground_y - PLAYER_HEIGHT));
        // Progress survives a respawn
        assert!(state.collected.contains(&1));
    }

    #[test]
    fn wrong_grave_answer_is_full_reset() {
        // Scenario D
        let (level, mut state) = story_state();
        state.start_run();
        state.collect_orb(&level, 1);
        state.collect_orb(&level, 2);
        state.enter_grave(&level);

        let prompt = state.grave.clone().unwrap();
        let slot = slot_of(&level, prompt.question_id, &prompt.order, false);
        state.answer_grave(&level, slot);

        assert_eq!(state.mode, GameMode::Start);
        assert!(state.collected.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn score_never_decreases() {
        let (level, mut state) = story_state();
        state.start_run();
        let mut last = 0;
        for id in [1u32, 2, 3, 1, 2] {
            state.collect_orb(&level, id);
            assert!(state.score >= last);
            last = state.score;
        }
        // Double-collect awards nothing
        assert_eq!(state.score, 150 + 100 + 100);
    }

    #[test]
    fn warning_is_rate_limited() {
        let (_, mut state) = story_state();
        state.show_warning("first".into());
        state.show_warning("second".into());
        assert_eq!(state.warning.as_ref().unwrap().text, "first");
    }

    #[test]
    fn enemy_ping_pong_stays_in_bounds() {
        let level = Level::patrol();
        let mut enemy = Enemy::from_def(&level.enemies[0]);
        for _ in 0..2000 {
            enemy.advance();
            assert!(enemy.pos.x >= enemy.min_x);
            assert!(enemy.pos.x + Enemy::WIDTH <= enemy.max_x);
        }
    }
}
