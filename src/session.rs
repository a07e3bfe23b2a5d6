//! Game session state machine.
//!
//! A [`Session`] owns the target set, the progress cursor, the elapsed-time
//! counter and the status. It knows nothing about the DOM: the caller feeds it
//! clicks, timer ticks and completed removals, and hands it a timer handle
//! whenever a session starts. The handle type `T` is opaque here; the session
//! only stores it while play is active and drops it on every exit path, so a
//! handle whose `Drop` cancels the underlying timer gives the
//! "at most one live timer" guarantee for free.

use rand::Rng;

use crate::config::{GameConfig, WinCheck};
use crate::status::Status;

/// Identity of a target, also its required click position (0-based).
pub type TargetId = u32;

/// One clickable point on the board.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub id: TargetId,
    /// Horizontal offset in percent of the play field width.
    pub x_pct: f64,
    /// Vertical offset in percent of the play field height.
    pub y_pct: f64,
    /// Clicked correctly and waiting for its delayed removal.
    pub removing: bool,
}

impl Target {
    /// Stacking order inside a board of `count` targets: lower ids sit on top.
    pub fn depth(&self, count: u32) -> i64 {
        i64::from(count) - i64::from(self.id)
    }

    /// Number printed on the target (1-based).
    pub fn label(&self) -> u32 {
        self.id + 1
    }
}

/// A removal scheduled by a correct click. Hand it back to
/// [`Session::complete_removal`] once the removal delay has elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRemoval {
    pub generation: u64,
    pub id: TargetId,
    /// Exactly one target (this one) was on the board when it was clicked.
    pub was_last: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// No session in play; nothing changed.
    Ignored,
    /// Wrong target. The session is over.
    Missed { expected: TargetId, got: TargetId },
    /// Right target; schedule the removal.
    Advanced(PendingRemoval),
}

pub struct Session<T> {
    targets: Vec<Target>,
    target_count: u32,
    cursor: TargetId,
    elapsed_ms: u64,
    status: Status,
    ticker: Option<T>,
    generation: u64,
    started: bool,
    tick_ms: u64,
    spread_pct: f64,
    max_targets: Option<u32>,
    win_check: WinCheck,
}

impl<T> Session<T> {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            targets: Vec::new(),
            target_count: 0,
            cursor: 0,
            elapsed_ms: 0,
            status: Status::Idle,
            ticker: None,
            generation: 0,
            started: false,
            tick_ms: u64::from(config.tick_ms),
            spread_pct: config.spread_pct,
            max_targets: config.max_targets,
            win_check: config.win_check,
        }
    }

    /// Start (or restart) a session with `count` targets.
    ///
    /// Returns `Ok(false)` without touching anything when `count <= 0`. Otherwise
    /// the previous timer handle is dropped before `start_ticker` is asked for
    /// a new one, so two timers never overlap. If `start_ticker` fails the old
    /// session is still ended: the board is emptied and the status goes back to
    /// `Idle`.
    pub fn start<R, E, F>(&mut self, count: i64, rng: &mut R, start_ticker: F) -> Result<bool, E>
    where
        R: Rng + ?Sized,
        F: FnOnce() -> Result<T, E>,
    {
        if count <= 0 {
            return Ok(false);
        }
        let limit = self.max_targets.unwrap_or(u32::MAX);
        let count = match u32::try_from(count) {
            Ok(n) if n <= limit => n,
            _ => {
                log::warn!("target count {} exceeds limit, clamping to {}", count, limit);
                limit
            }
        };

        self.stop();
        self.generation += 1;
        let ticker = match start_ticker() {
            Ok(ticker) => ticker,
            Err(err) => {
                // The old session is gone either way; leave nothing clickable behind.
                self.status = Status::Idle;
                self.targets.clear();
                self.target_count = 0;
                self.elapsed_ms = 0;
                return Err(err);
            }
        };
        self.status = Status::Playing;
        self.started = true;
        self.target_count = count;
        self.targets = (0..count)
            .map(|id| Target {
                id,
                x_pct: random_pct(&mut *rng, self.spread_pct),
                y_pct: random_pct(&mut *rng, self.spread_pct),
                removing: false,
            })
            .collect();
        self.elapsed_ms = 0;
        self.ticker = Some(ticker);

        log::info!(
            "session {} started with {} targets",
            self.generation,
            count
        );
        Ok(true)
    }

    /// One timer tick. Ignored when no timer is held.
    pub fn tick(&mut self) {
        if self.ticker.is_some() {
            self.elapsed_ms += self.tick_ms;
        }
    }

    pub fn click(&mut self, id: TargetId) -> ClickOutcome {
        if self.status != Status::Playing {
            return ClickOutcome::Ignored;
        }
        if id != self.cursor {
            let expected = self.cursor;
            log::info!(
                "session {}: clicked {} but expected {}, game over at {}ms",
                self.generation,
                id,
                expected,
                self.elapsed_ms
            );
            self.status = Status::GameOver;
            self.stop();
            return ClickOutcome::Missed { expected, got: id };
        }

        // Sampled before the removal lands; fading targets still count.
        let was_last = self.targets.len() == 1;
        self.cursor += 1;
        if let Some(target) = self.targets.iter_mut().find(|t| t.id == id) {
            target.removing = true;
        }
        log::debug!("session {}: target {} cleared", self.generation, id);
        ClickOutcome::Advanced(PendingRemoval {
            generation: self.generation,
            id,
            was_last,
        })
    }

    /// Finish a removal scheduled by [`Session::click`]. Returns true when this
    /// removal cleared the board.
    ///
    /// Removals from a superseded session are dropped. After a game over the
    /// target still leaves the board but the status stays put.
    pub fn complete_removal(&mut self, removal: PendingRemoval) -> bool {
        if removal.generation != self.generation {
            log::debug!(
                "dropping removal of {} from stale session {}",
                removal.id,
                removal.generation
            );
            return false;
        }
        self.targets.retain(|t| t.id != removal.id);

        let cleared = match self.win_check {
            WinCheck::AtClick => removal.was_last,
            WinCheck::AfterRemoval => self.targets.is_empty(),
        };
        if !cleared || self.status.is_terminal() {
            return false;
        }
        log::info!(
            "session {}: all cleared in {}ms",
            self.generation,
            self.elapsed_ms
        );
        self.status = Status::Cleared;
        self.stop();
        true
    }

    // Drop the timer and rewind the cursor.
    fn stop(&mut self) {
        self.ticker = None;
        self.cursor = 0;
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Target count of the current session (after any configured cap).
    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    pub fn cursor(&self) -> TargetId {
        self.cursor
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Caption for the start button; it never goes back to "Play".
    pub fn button_label(&self) -> &'static str {
        if self.started { "Reset" } else { "Play" }
    }
}

// Uniform in [0, spread], rounded to hundredths of a percent.
fn random_pct<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    (rng.r#gen::<f64>() * spread * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::convert::Infallible;

    fn session() -> Session<()> {
        Session::new(&GameConfig::default())
    }

    fn start(s: &mut Session<()>, n: i64) -> bool {
        let mut rng = StdRng::seed_from_u64(7);
        s.start(n, &mut rng, || Ok::<_, Infallible>(())).unwrap()
    }

    #[test]
    fn test_new_session_is_idle() {
        let s = session();
        assert_eq!(s.status(), Status::Idle);
        assert!(s.targets().is_empty());
        assert!(!s.is_ticking());
        assert_eq!(s.button_label(), "Play");
    }

    #[test]
    fn test_start_generates_targets_in_range() {
        let mut s = session();
        assert!(start(&mut s, 25));
        assert_eq!(s.targets().len(), 25);
        for (i, t) in s.targets().iter().enumerate() {
            assert_eq!(t.id, i as u32);
            assert!((0.0..=90.0).contains(&t.x_pct));
            assert!((0.0..=90.0).contains(&t.y_pct));
            assert!(!t.removing);
        }
        assert_eq!(s.status(), Status::Playing);
        assert!(s.is_ticking());
        assert_eq!(s.button_label(), "Reset");
    }

    #[test]
    fn test_start_ignores_non_positive_counts() {
        let mut s = session();
        assert!(!start(&mut s, 0));
        assert!(!start(&mut s, -4));
        assert_eq!(s.status(), Status::Idle);
        assert!(!s.is_ticking());
        assert_eq!(s.generation(), 0);
    }

    #[test]
    fn test_start_is_uncapped_by_default() {
        let mut s = session();
        assert!(start(&mut s, 10_001));
        assert_eq!(s.targets().len(), 10_001);
        assert_eq!(s.target_count(), 10_001);
    }

    #[test]
    fn test_start_clamps_to_configured_cap() {
        let mut s: Session<()> = Session::new(&GameConfig {
            max_targets: Some(8),
            ..GameConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(1);
        s.start(i64::MAX, &mut rng, || Ok::<_, Infallible>(()))
            .unwrap();
        assert_eq!(s.targets().len(), 8);
        assert_eq!(s.target_count(), 8);
    }

    #[test]
    fn test_failed_ticker_propagates() {
        let mut s: Session<()> = session();
        let mut rng = StdRng::seed_from_u64(1);
        let res = s.start(3, &mut rng, || Err("no timer"));
        assert_eq!(res, Err("no timer"));
        assert!(!s.is_ticking());
        assert_eq!(s.status(), Status::Idle);
        assert!(s.targets().is_empty());
    }

    #[test]
    fn test_failed_restart_ends_the_old_session() {
        let mut s = session();
        start(&mut s, 3);
        let ClickOutcome::Advanced(old) = s.click(0) else {
            panic!("expected advance");
        };
        let mut rng = StdRng::seed_from_u64(2);
        let res = s.start(5, &mut rng, || Err("no timer"));
        assert_eq!(res, Err("no timer"));
        assert_eq!(s.status(), Status::Idle);
        assert!(!s.is_ticking());
        assert!(s.targets().is_empty());
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.click(0), ClickOutcome::Ignored);
        assert!(!s.complete_removal(old));
        s.tick();
        assert_eq!(s.elapsed_ms(), 0);

        // A later successful start plays normally.
        assert!(start(&mut s, 2));
        assert_eq!(s.status(), Status::Playing);
        assert_matches::assert_matches!(s.click(0), ClickOutcome::Advanced(_));
    }

    #[test]
    fn test_tick_accumulates_only_while_playing() {
        let mut s = session();
        s.tick();
        assert_eq!(s.elapsed_ms(), 0);
        start(&mut s, 2);
        for _ in 0..125 {
            s.tick();
        }
        assert_eq!(s.elapsed_ms(), 1250);
        s.click(1);
        s.tick();
        assert_eq!(s.elapsed_ms(), 1250);
    }

    #[test]
    fn test_correct_click_marks_removal() {
        let mut s = session();
        start(&mut s, 3);
        let outcome = s.click(0);
        assert_eq!(
            outcome,
            ClickOutcome::Advanced(PendingRemoval {
                generation: 1,
                id: 0,
                was_last: false
            })
        );
        assert_eq!(s.cursor(), 1);
        assert!(s.targets()[0].removing);
        assert_eq!(s.targets().len(), 3);
    }

    #[test]
    fn test_wrong_click_is_game_over() {
        let mut s = session();
        start(&mut s, 3);
        s.click(0);
        assert_eq!(s.click(2), ClickOutcome::Missed { expected: 1, got: 2 });
        assert_eq!(s.status(), Status::GameOver);
        assert_eq!(s.cursor(), 0);
        assert!(!s.is_ticking());
        assert_eq!(s.targets().len(), 3);
        assert_eq!(s.click(0), ClickOutcome::Ignored);
    }

    #[test]
    fn test_clicking_a_fading_target_again_misses() {
        let mut s = session();
        start(&mut s, 2);
        s.click(0);
        assert_eq!(s.click(0), ClickOutcome::Missed { expected: 1, got: 0 });
    }

    #[test]
    fn test_last_target_clears() {
        let mut s = session();
        start(&mut s, 2);
        for id in 0..2 {
            match s.click(id) {
                ClickOutcome::Advanced(r) => {
                    let cleared = s.complete_removal(r);
                    assert_eq!(cleared, id == 1);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(s.status(), Status::Cleared);
        assert!(s.targets().is_empty());
        assert_eq!(s.cursor(), 0);
        assert!(!s.is_ticking());
    }

    #[test]
    fn test_fast_clicks_never_clear_with_click_time_check() {
        let mut s = session();
        start(&mut s, 2);
        let removals: Vec<_> = (0..2)
            .filter_map(|id| match s.click(id) {
                ClickOutcome::Advanced(r) => Some(r),
                _ => None,
            })
            .collect();
        assert!(removals.iter().all(|r| !r.was_last));
        for r in removals {
            assert!(!s.complete_removal(r));
        }
        assert!(s.targets().is_empty());
        assert_eq!(s.status(), Status::Playing);
        assert!(s.is_ticking());
    }

    #[test]
    fn test_fast_clicks_clear_with_after_removal_check() {
        let mut s: Session<()> = Session::new(&GameConfig {
            win_check: WinCheck::AfterRemoval,
            ..GameConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(3);
        s.start(2, &mut rng, || Ok::<_, Infallible>(())).unwrap();
        let a = s.click(0);
        let b = s.click(1);
        let (ClickOutcome::Advanced(a), ClickOutcome::Advanced(b)) = (a, b) else {
            panic!("expected two advances");
        };
        assert!(!s.complete_removal(a));
        assert!(s.complete_removal(b));
        assert_eq!(s.status(), Status::Cleared);
    }

    #[test]
    fn test_stale_removal_is_ignored() {
        let mut s = session();
        start(&mut s, 1);
        let ClickOutcome::Advanced(old) = s.click(0) else {
            panic!("expected advance");
        };
        start(&mut s, 1);
        assert!(!s.complete_removal(old));
        assert_eq!(s.targets().len(), 1);
        assert_eq!(s.status(), Status::Playing);
    }

    #[test]
    fn test_removal_after_game_over_keeps_status() {
        let mut s = session();
        start(&mut s, 1);
        let ClickOutcome::Advanced(r) = s.click(0) else {
            panic!("expected advance");
        };
        s.click(0);
        assert_eq!(s.status(), Status::GameOver);
        assert!(!s.complete_removal(r));
        assert!(s.targets().is_empty());
        assert_eq!(s.status(), Status::GameOver);
    }

    #[test]
    fn test_depth_and_label() {
        let t = Target {
            id: 0,
            x_pct: 1.0,
            y_pct: 2.0,
            removing: false,
        };
        assert_eq!(t.depth(5), 5);
        assert_eq!(t.label(), 1);
        let t = Target { id: 4, ..t };
        assert_eq!(t.depth(5), 1);
    }
}
