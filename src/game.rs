use log::info;
use rand::{rngs::SmallRng, SeedableRng};

use crate::bird::Bird;
use crate::collision;
use crate::consts::WORLD_HEIGHT;
use crate::difficulty::{Difficulty, DifficultyProfile, Level};
use crate::error::DifficultyError;
use crate::event::GameEvent;
use crate::pipes::PipeStream;
use crate::scene::restart_button;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Over,
}

/// Player input, with pointer positions already in world coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Input {
    /// Keyboard jump trigger.
    Jump,
    Click { x: f32, y: f32 },
    /// Touch start: jump while running, restart once over.
    Touch,
}

/// Owns the whole round: bird, pipes, score and the game-over latch.
#[derive(Debug)]
pub struct Game {
    difficulty: Difficulty,
    phase: Phase,
    rng: SmallRng,
    bird: Bird,
    pipes: PipeStream,
    score: u32,
    best_score: u32,
    ticks: u64,
}

impl Game {
    pub fn new(level: Level) -> Self {
        Self::with_rng(level, SmallRng::from_entropy())
    }

    /// Reproducible pipe placement.
    pub fn with_seed(level: Level, seed: u64) -> Self {
        Self::with_rng(level, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(level: Level, rng: SmallRng) -> Self {
        let difficulty = Difficulty::new(level);
        let mut pipes = PipeStream::new();
        pipes.reseed(difficulty.profile().pipe_gap);
        info!("new game on {}", level.as_str());
        Self {
            difficulty,
            phase: Phase::Running,
            rng,
            bird: Bird::default(),
            pipes,
            score: 0,
            best_score: 0,
            ticks: 0,
        }
    }

    /// Advance one simulation step: pipes first, then the bird.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase == Phase::Over {
            return events;
        }
        self.ticks += 1;
        let profile = self.difficulty.profile();

        self.pipes.advance(profile.pipe_speed);
        let contacts = collision::evaluate(&self.bird, self.pipes.iter());
        if contacts.hit_pipe {
            self.end_round(&mut events);
        }
        for index in contacts.passed {
            if let Some(pipe) = self.pipes.get_mut(index) {
                pipe.scored = true;
                self.score += 1;
                events.push(GameEvent::Point);
            }
        }
        self.pipes.evict();
        self.pipes.spawn_if_needed(&mut self.rng, profile.pipe_gap);

        self.bird.integrate(&profile);
        if collision::out_of_bounds(&self.bird, WORLD_HEIGHT) {
            self.end_round(&mut events);
        }

        events
    }

    pub fn handle_input(&mut self, input: Input) -> Vec<GameEvent> {
        match (input, self.phase) {
            (Input::Jump | Input::Touch, Phase::Running) => self.flap().into_iter().collect(),
            (Input::Touch, Phase::Over) => vec![self.restart()],
            (Input::Click { x, y }, Phase::Over) if restart_button().contains(x, y) => {
                vec![self.restart()]
            }
            _ => Vec::new(),
        }
    }

    /// Jump impulse. Suppressed once the round is over.
    pub fn flap(&mut self) -> Option<GameEvent> {
        if self.phase == Phase::Over {
            return None;
        }
        let profile = self.difficulty.profile();
        self.bird.flap(&profile);
        Some(GameEvent::Jump)
    }

    /// Start a fresh round at the current level, whatever state we were in.
    pub fn restart(&mut self) -> GameEvent {
        self.bird.reset();
        self.pipes.reseed(self.difficulty.profile().pipe_gap);
        self.score = 0;
        self.ticks = 0;
        self.phase = Phase::Running;
        info!("restarted on {}", self.difficulty.level().as_str());
        GameEvent::Restarted
    }

    /// Change level; takes effect from the next tick. Pipes already on
    /// screen keep their gap.
    pub fn select_level(&mut self, level: Level) -> Result<GameEvent, DifficultyError> {
        if self.phase == Phase::Over {
            return Err(DifficultyError::SelectionLocked);
        }
        self.difficulty.set(level);
        info!("difficulty set to {}", level.as_str());
        Ok(GameEvent::LevelChanged(level))
    }

    pub fn select_level_by_name(&mut self, name: &str) -> Result<GameEvent, DifficultyError> {
        let level = name.parse::<Level>()?;
        self.select_level(level)
    }

    /// Whether a pointer at world `(x, y)` sits on the restart button.
    pub fn restart_hovered(&self, x: f32, y: f32) -> bool {
        self.phase == Phase::Over && restart_button().contains(x, y)
    }

    fn end_round(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase == Phase::Over {
            return;
        }
        self.phase = Phase::Over;
        self.best_score = self.best_score.max(self.score);
        info!("game over after {} ticks, score {}", self.ticks, self.score);
        events.push(GameEvent::Hit);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> &PipeStream {
        &self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn level(&self) -> Level {
        self.difficulty.level()
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.difficulty.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BIRD_START_Y, BIRD_X, PIPE_GAP_MARGIN, WORLD_WIDTH};
    use crate::pipes::Pipe;
    use proptest::prelude::*;

    /// Keep the bird level with the gap of the next pipe so the round runs on.
    fn pin_bird_to_gap(game: &mut Game) {
        let left = game.bird.left();
        let y = game
            .pipes
            .iter()
            .find(|p| p.right() > left)
            .map(|p| (p.top + p.bottom) * 0.5)
            .unwrap_or(BIRD_START_Y);
        game.bird.y = y;
        game.bird.vel = 0.0;
    }

    #[test]
    fn test_initial_state() {
        let game = Game::with_seed(Level::Easy, 1);
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.score(), 0);
        assert_eq!(game.pipes().len(), 1);
        let pipe = game.pipes().first().unwrap();
        assert_eq!((pipe.x, pipe.top, pipe.bottom), (WORLD_WIDTH, 150.0, 330.0));
        assert_eq!((game.bird().x, game.bird().y), (BIRD_X, BIRD_START_Y));
    }

    #[test]
    fn test_jump_then_tick_on_easy() {
        let mut game = Game::with_seed(Level::Easy, 1);
        assert_eq!(game.handle_input(Input::Jump), vec![GameEvent::Jump]);
        assert_eq!(game.bird().vel, -7.0);

        let events = game.tick();
        assert!(events.is_empty());
        assert!((game.bird().vel - -6.6).abs() < 1e-5);
        assert!((game.bird().y - 293.4).abs() < 1e-4);
    }

    #[test]
    fn test_score_once_per_pipe() {
        let mut game = Game::with_seed(Level::Easy, 3);
        let mut points = 0;
        for _ in 0..200 {
            game.bird.y = 240.0;
            game.bird.vel = 0.0;
            let events = game.tick();
            points += events.iter().filter(|e| **e == GameEvent::Point).count();
        }
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.score(), 1);
        assert_eq!(points, 1);
        assert!(game.pipes().first().unwrap().scored);
    }

    #[test]
    fn test_boundary_hit_latches_once() {
        let mut game = Game::with_seed(Level::Easy, 1);
        game.bird.y = 10.0;
        assert_eq!(game.tick(), vec![GameEvent::Hit]);
        assert!(game.is_over());

        let y = game.bird().y;
        assert!(game.tick().is_empty());
        assert_eq!(game.bird().y, y);
    }

    #[test]
    fn test_pipe_and_floor_in_same_tick_emit_one_hit() {
        let mut game = Game::with_seed(Level::Easy, 1);
        game.pipes.push(Pipe::new(BIRD_X, 100.0, 180.0));
        game.bird.y = 590.0;
        let events = game.tick();
        assert_eq!(events.iter().filter(|e| **e == GameEvent::Hit).count(), 1);
        assert!(game.is_over());
    }

    #[test]
    fn test_point_and_hit_in_same_tick() {
        let mut game = Game::with_seed(Level::Easy, 1);
        game.pipes = PipeStream::new();
        game.pipes.push(Pipe::new(20.0, 150.0, 180.0));
        game.pipes.push(Pipe::new(BIRD_X, 250.0, 180.0));
        game.bird.y = 200.0;

        let events = game.tick();
        assert!(events.contains(&GameEvent::Hit));
        assert!(events.contains(&GameEvent::Point));
        assert_eq!(game.score(), 1);
        assert!(game.is_over());
    }

    #[test]
    fn test_input_while_over() {
        let mut game = Game::with_seed(Level::Easy, 1);
        game.bird.y = 590.0;
        game.tick();
        assert!(game.is_over());

        let vel = game.bird().vel;
        assert!(game.handle_input(Input::Jump).is_empty());
        assert_eq!(game.bird().vel, vel);

        assert!(game.handle_input(Input::Click { x: 10.0, y: 10.0 }).is_empty());
        assert!(game.is_over());

        assert!(game.restart_hovered(200.0, 360.0));
        assert_eq!(
            game.handle_input(Input::Click { x: 200.0, y: 360.0 }),
            vec![GameEvent::Restarted]
        );
        assert_eq!(game.phase(), Phase::Running);
        assert!(!game.restart_hovered(200.0, 360.0));
    }

    #[test]
    fn test_touch_restarts_when_over() {
        let mut game = Game::with_seed(Level::Medium, 1);
        assert_eq!(game.handle_input(Input::Touch), vec![GameEvent::Jump]);
        assert_eq!(game.bird().vel, -8.0);

        game.bird.y = -20.0;
        game.tick();
        assert!(game.is_over());
        assert_eq!(game.handle_input(Input::Touch), vec![GameEvent::Restarted]);
        assert_eq!(game.bird().vel, 0.0);
    }

    #[test]
    fn test_click_ignored_while_running() {
        let mut game = Game::with_seed(Level::Easy, 1);
        assert!(game.handle_input(Input::Click { x: 200.0, y: 360.0 }).is_empty());
    }

    #[test]
    fn test_best_score_survives_restart() {
        let mut game = Game::with_seed(Level::Easy, 1);
        game.score = 4;
        game.bird.y = 590.0;
        game.tick();
        game.restart();
        assert_eq!(game.score(), 0);
        assert_eq!(game.best_score(), 4);
    }

    #[test]
    fn test_level_change_applies_next_tick() {
        let mut game = Game::with_seed(Level::Easy, 1);
        assert_eq!(
            game.select_level(Level::Hard),
            Ok(GameEvent::LevelChanged(Level::Hard))
        );
        assert_eq!(game.pipes().first().unwrap().gap(), 180.0);

        game.tick();
        assert_eq!(game.pipes().first().unwrap().x, WORLD_WIDTH - 4.0);
        assert!((game.bird().vel - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_level_selection_errors() {
        let mut game = Game::with_seed(Level::Medium, 1);
        assert!(matches!(
            game.select_level_by_name("impossible"),
            Err(DifficultyError::UnknownLevel { .. })
        ));
        assert_eq!(game.level(), Level::Medium);

        game.bird.y = 590.0;
        game.tick();
        assert_eq!(
            game.select_level_by_name("hard"),
            Err(DifficultyError::SelectionLocked)
        );
        assert_eq!(game.level(), Level::Medium);
    }

    #[test]
    fn test_restart_uses_current_gap() {
        let mut game = Game::with_seed(Level::Easy, 1);
        game.select_level(Level::Hard).unwrap();
        game.restart();
        let pipe = game.pipes().first().unwrap();
        assert_eq!((pipe.top, pipe.bottom), (150.0, 260.0));
    }

    fn level_strategy() -> impl Strategy<Value = Level> {
        prop_oneof![Just(Level::Easy), Just(Level::Medium), Just(Level::Hard)]
    }

    proptest! {
        #[test]
        fn prop_score_counts_points(seed in any::<u64>(), flaps in prop::collection::vec(any::<bool>(), 1..400)) {
            let mut game = Game::with_seed(Level::Easy, seed);
            let mut last = 0;
            let mut points = 0u32;
            for flap in flaps {
                if flap {
                    game.handle_input(Input::Jump);
                }
                let events = game.tick();
                points += events.iter().filter(|e| **e == GameEvent::Point).count() as u32;
                prop_assert!(game.score() >= last);
                last = game.score();
                if game.is_over() {
                    break;
                }
            }
            prop_assert_eq!(game.score(), points);
        }

        #[test]
        fn prop_gaps_match_level_at_creation(
            seed in any::<u64>(),
            switches in prop::collection::vec((0usize..120, level_strategy()), 0..6),
        ) {
            let mut game = Game::with_seed(Level::Easy, seed);
            for step in 0..900usize {
                for (at, level) in &switches {
                    if *at * 7 == step {
                        game.select_level(*level).unwrap();
                    }
                }
                pin_bird_to_gap(&mut game);
                game.tick();
                prop_assert!(!game.is_over());
                // Fresh pipes are the only ones still sitting on the right edge.
                if let Some(pipe) = game.pipes().last().filter(|p| p.x == WORLD_WIDTH) {
                    prop_assert!((pipe.gap() - game.profile().pipe_gap).abs() < 1e-3);
                }
                for pipe in game.pipes().iter() {
                    prop_assert!(pipe.top >= PIPE_GAP_MARGIN);
                    prop_assert!(pipe.bottom <= WORLD_HEIGHT - PIPE_GAP_MARGIN);
                }
            }
            prop_assert!(game.score() > 0);
        }

        #[test]
        fn prop_restart_postcondition(
            seed in any::<u64>(),
            level in level_strategy(),
            ticks in 0usize..600,
            flap_every in 1usize..40,
        ) {
            let mut game = Game::with_seed(level, seed);
            for i in 0..ticks {
                if i % flap_every == 0 {
                    game.handle_input(Input::Jump);
                }
                game.tick();
            }
            game.restart();
            prop_assert_eq!(game.score(), 0);
            prop_assert_eq!(game.phase(), Phase::Running);
            prop_assert_eq!(game.pipes().len(), 1);
            let pipe = game.pipes().first().unwrap();
            prop_assert_eq!((pipe.x, pipe.top), (WORLD_WIDTH, 150.0));
            prop_assert_eq!(pipe.gap(), level.profile().pipe_gap);
            prop_assert!(!pipe.scored);
            prop_assert_eq!(*game.bird(), Bird::default());
        }

        #[test]
        fn prop_pipe_collision_classification(offset in -200.0f32..200.0, dx in -30.0f32..30.0) {
            let mut game = Game::with_seed(Level::Easy, 9);
            let speed = game.profile().pipe_speed;
            // After the advance the pipe sits at BIRD_X - 25 + dx: always overlapping.
            let pipe = Pipe::new(BIRD_X - 25.0 + dx + speed, 200.0, 180.0);
            game.pipes.reseed(180.0);
            game.pipes.push(pipe);
            let y = 290.0 + offset;
            game.bird.y = y;
            game.bird.vel = 0.0;
            let events = game.tick();
            let inside = y > 200.0 && y < 380.0;
            let hits = events.iter().filter(|e| **e == GameEvent::Hit).count();
            if inside {
                prop_assert_eq!(hits, 0);
                prop_assert!(!game.is_over());
            } else {
                prop_assert_eq!(hits, 1);
                prop_assert!(game.is_over());
            }
        }

        #[test]
        fn prop_eviction_keeps_order(seed in any::<u64>(), ticks in 200usize..800) {
            let mut game = Game::with_seed(Level::Hard, seed);
            for _ in 0..ticks {
                pin_bird_to_gap(&mut game);
                game.tick();
                let xs: Vec<f32> = game.pipes().iter().map(|p| p.x).collect();
                prop_assert!(xs.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(game.pipes().iter().all(|p| p.right() >= 0.0));
            }
        }
    }
}
