//! Point Rush core crate.
//!
//! A reaction / memory game for the browser: pick a number of points, then
//! click them in ascending order before the clock runs away. A wrong click ends
//! the session. Game rules live in [`session`] and run natively, which keeps
//! them testable off the browser; [`web`] wires them to the DOM.

use wasm_bindgen::prelude::*;

pub mod clock;
pub mod config;
pub mod error;
mod logging;
pub mod session;
pub mod status;
pub mod web;

pub use clock::format_time;
pub use config::{GameConfig, WinCheck, parse_target_count};
pub use error::Error;
pub use session::{ClickOutcome, PendingRemoval, Session, Target, TargetId};
pub use status::{Status, status_color};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Mount the game with default settings.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    launch(GameConfig::default())
}

/// Mount the game with a JSON [`GameConfig`]; omitted fields keep their defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    launch(GameConfig::from_json(json)?)
}

fn launch(config: GameConfig) -> Result<(), JsValue> {
    logging::init(config.level_filter()?);
    web::mount(config)?;
    Ok(())
}
