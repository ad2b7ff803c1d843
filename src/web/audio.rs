//! Fire-and-forget sound effects backed by `<audio>` elements.
//!
//! A missing or blocked sound never affects the game: failures are logged
//! and the effect is skipped.

use log::warn;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlAudioElement;

use crate::event::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    Hit,
    Point,
}

impl SoundEffect {
    fn path(&self) -> &'static str {
        match self {
            SoundEffect::Jump => "sounds/jump.mp3",
            SoundEffect::Hit => "sounds/hit.mp3",
            SoundEffect::Point => "sounds/point.mp3",
        }
    }

    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jump => Some(SoundEffect::Jump),
            GameEvent::Hit => Some(SoundEffect::Hit),
            GameEvent::Point => Some(SoundEffect::Point),
            GameEvent::Restarted | GameEvent::LevelChanged(_) => None,
        }
    }
}

pub struct AudioManager {
    jump: Option<HtmlAudioElement>,
    hit: Option<HtmlAudioElement>,
    point: Option<HtmlAudioElement>,
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            jump: load(SoundEffect::Jump),
            hit: load(SoundEffect::Hit),
            point: load(SoundEffect::Point),
        }
    }

    /// Rewind and play. Returns immediately; playback is not awaited.
    pub fn play(&self, effect: SoundEffect) {
        let element = match effect {
            SoundEffect::Jump => &self.jump,
            SoundEffect::Hit => &self.hit,
            SoundEffect::Point => &self.point,
        };
        let Some(element) = element else { return };

        element.set_current_time(0.0);
        match element.play() {
            Ok(promise) => spawn_local(async move {
                if let Err(err) = JsFuture::from(promise).await {
                    warn!("{:?} playback rejected: {:?}", effect, err);
                }
            }),
            Err(err) => warn!("{:?} playback failed: {:?}", effect, err),
        }
    }

    pub fn handle(&self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }
}

fn load(effect: SoundEffect) -> Option<HtmlAudioElement> {
    match HtmlAudioElement::new_with_src(effect.path()) {
        Ok(element) => Some(element),
        Err(err) => {
            warn!("could not load {}: {:?} - sound disabled", effect.path(), err);
            None
        }
    }
}
