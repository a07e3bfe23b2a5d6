//! Game tunables and target-count input parsing.

use log::LevelFilter;

use crate::error::Error;

/// How the session decides that a removal cleared the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WinCheck {
    /// Cleared when exactly one target was left at the moment of the click.
    /// Targets still fading out count, so rapid clicking never wins.
    #[default]
    AtClick,
    /// Cleared when the target set is empty once the delayed removal lands.
    AfterRemoval,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Timer period; elapsed time grows by this much per tick.
    pub tick_ms: u32,
    /// Delay between a correct click and the target leaving the board.
    pub removal_delay_ms: u32,
    /// How long the click marker stays visible.
    pub marker_ms: u32,
    /// Upper bound (percent) for both target coordinates.
    pub spread_pct: f64,
    /// Optional cap on the target count; larger requests are clamped to it.
    pub max_targets: Option<u32>,
    pub win_check: WinCheck,
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            removal_delay_ms: 500,
            marker_ms: 200,
            spread_pct: 90.0,
            max_targets: None,
            win_check: WinCheck::AtClick,
            log_level: "info".to_string(),
        }
    }
}

impl GameConfig {
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|err| Error::Config(err.to_string()))
    }

    pub fn level_filter(&self) -> Result<LevelFilter, Error> {
        self.log_level
            .parse()
            .map_err(|_| Error::LogLevel(self.log_level.clone()))
    }
}

/// Parse the text of the target-count field.
///
/// Blank or unparsable input yields 0, which makes Play a no-op. Decimals are
/// truncated toward zero.
pub fn parse_target_count(text: &str) -> i64 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }
    if let Ok(n) = text.parse::<i64>() {
        return n;
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => f.trunc() as i64,
        _ => 0,
    }
}
