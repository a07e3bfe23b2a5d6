//! Session status banner.
//!
//! The variant carries no presentation data; titles and colours live in the
//! lookup functions below so the view can restyle without touching game state.

/// Where the current session stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// Nothing started yet.
    #[default]
    Idle,
    Playing,
    /// Mis-click. Terminal until the next start.
    GameOver,
    /// Every target removed. Terminal until the next start.
    Cleared,
}

impl Status {
    pub fn title(self) -> &'static str {
        match self {
            Status::Idle | Status::Playing => "Let's Play",
            Status::GameOver => "GAME OVER",
            Status::Cleared => "ALL CLEARED",
        }
    }

    /// True for the two outcomes that end a session.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::GameOver | Status::Cleared)
    }
}

// CSS colours for the banner, indexed by status.
const NEUTRAL: &str = "#000000";
const ERROR: &str = "#ef4444";
const SUCCESS: &str = "#22c55e";

/// Banner colour for a status.
pub fn status_color(status: Status) -> &'static str {
    match status {
        Status::Idle | Status::Playing => NEUTRAL,
        Status::GameOver => ERROR,
        Status::Cleared => SUCCESS,
    }
}
