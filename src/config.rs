//! Page configuration read from the URL query string, e.g.
//! `?level=hard&tick=frame&bg=202040&uncapped=1`.

use log::warn;

use crate::difficulty::Level;

/// How displayed frames map onto simulation ticks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TickMode {
    /// Ticks at a fixed 60 Hz of wall-clock time, independent of refresh rate.
    #[default]
    Fixed,
    /// One tick per displayed frame.
    PerFrame,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub level: Level,
    pub tick_mode: TickMode,
    pub background: Option<[f32; 3]>,
    pub uncapped: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: Level::Easy,
            tick_mode: TickMode::Fixed,
            background: None,
            uncapped: false,
        }
    }
}

impl Config {
    /// Parse a query string with or without the leading `?`. Unknown keys are
    /// ignored; bad values are logged and fall back to defaults.
    pub fn from_query(query: &str) -> Self {
        let mut config = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "level" => match value.parse::<Level>() {
                    Ok(level) => config.level = level,
                    Err(err) => warn!("ignoring level from query: {err}"),
                },
                "tick" => match value {
                    "frame" => config.tick_mode = TickMode::PerFrame,
                    "fixed" => config.tick_mode = TickMode::Fixed,
                    other => warn!("unknown tick mode {other:?}, using fixed"),
                },
                "bg" => match parse_hex_color(value) {
                    Some(color) => config.background = Some(color),
                    None => warn!("invalid bg colour {value:?}"),
                },
                "uncapped" => config.uncapped = value == "1",
                _ => {}
            }
        }
        config
    }
}

fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
    Some([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
}
