//! Browser front end: mounts the widget and routes DOM events into the session.
//!
//! All state lives in one thread-local [`App`]. Every callback (DOM events,
//! the tick interval, removal and marker timeouts) borrows it for the duration
//! of one event and never re-enters, so a `RefCell` is enough.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, MouseEvent, window};

use crate::config::{GameConfig, parse_target_count};
use crate::error::Error;
use crate::session::{ClickOutcome, Session, TargetId};

mod timer;
mod view;

pub use timer::{Interval, Timeout};
use view::{TARGET_ATTR, View};

struct App {
    config: GameConfig,
    doc: Document,
    view: View,
    session: Session<Interval>,
    /// Last value typed into the target-count field.
    count: i64,
    // Replaced on every click; dropping the old handle cancels its hide.
    marker_hide: Option<Timeout>,
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

/// Mount the game into the current page. A second call is a no-op.
pub fn mount(config: GameConfig) -> Result<(), Error> {
    let win = window().ok_or(Error::NoWindow)?;
    let doc = win.document().ok_or(Error::NoDocument)?;
    if APP.with(|cell| cell.borrow().is_some()) {
        log::warn!("point rush is already mounted");
        return Ok(());
    }

    let view = View::build(&doc)?;
    listen(&view.input, "input", |app, _: Event| {
        app.count = parse_target_count(&app.view.input.value());
        Ok(())
    })?;
    listen(&view.play, "click", |app, _: Event| app.play())?;
    listen(&view.field, "click", |app, evt: Event| match clicked_target(&evt) {
        Some(id) => app.click_target(id),
        None => Ok(()),
    })?;
    listen(&win, "click", |app, evt: MouseEvent| {
        app.mark_click(evt.client_x(), evt.client_y())
    })?;

    let app = App {
        session: Session::new(&config),
        count: parse_target_count(&view.input.value()),
        config,
        doc,
        view,
        marker_hide: None,
    };
    app.render()?;
    APP.with(|cell| *cell.borrow_mut() = Some(app));
    log::info!("point rush mounted");
    Ok(())
}

impl App {
    fn play(&mut self) -> Result<(), Error> {
        let tick_ms = self.config.tick_ms;
        let started = self
            .session
            .start(self.count, &mut rand::thread_rng(), || {
                Interval::new(tick_ms, on_tick)
            })?;
        if started {
            self.render()?;
        } else {
            log::debug!("ignoring play with target count {}", self.count);
        }
        Ok(())
    }

    fn click_target(&mut self, id: TargetId) -> Result<(), Error> {
        match self.session.click(id) {
            ClickOutcome::Ignored => return Ok(()),
            ClickOutcome::Missed { .. } => {}
            ClickOutcome::Advanced(removal) => {
                timer::defer(self.config.removal_delay_ms, move || {
                    with_app(|app| {
                        app.session.complete_removal(removal);
                        app.render()
                    })
                })?;
            }
        }
        self.render()
    }

    fn mark_click(&mut self, x: i32, y: i32) -> Result<(), Error> {
        self.view.show_marker(x, y)?;
        self.marker_hide = Some(Timeout::new(self.config.marker_ms, || {
            with_app(|app| app.view.hide_marker())
        })?);
        Ok(())
    }

    fn render(&self) -> Result<(), Error> {
        self.view.show_status(self.session.status())?;
        self.view.show_time(self.session.elapsed_ms());
        self.view.show_button(self.session.button_label());
        self.view.sync_targets(
            &self.doc,
            self.session.targets(),
            self.session.target_count(),
            self.config.removal_delay_ms,
        )
    }
}

fn on_tick() {
    with_app(|app| {
        app.session.tick();
        app.view.show_time(app.session.elapsed_ms());
        Ok(())
    });
}

/// Run `f` against the mounted app, logging any error it returns.
fn with_app(f: impl FnOnce(&mut App) -> Result<(), Error>) {
    APP.with(|cell| {
        let Ok(mut guard) = cell.try_borrow_mut() else {
            log::warn!("event dropped: app is busy");
            return;
        };
        if let Some(app) = guard.as_mut() {
            if let Err(err) = f(app) {
                log::error!("{err}");
            }
        }
    });
}

/// Attach a handler for `event` on `target` for the lifetime of the page.
fn listen<E, F>(target: &EventTarget, event: &str, mut handler: F) -> Result<(), Error>
where
    E: JsCast + 'static,
    F: FnMut(&mut App, E) -> Result<(), Error> + 'static,
{
    let closure = Closure::wrap(Box::new(move |evt: Event| {
        let Ok(evt) = evt.dyn_into::<E>() else {
            return;
        };
        with_app(|app| handler(app, evt));
    }) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

// Identity of the target button an event landed on, if any.
fn clicked_target(evt: &Event) -> Option<TargetId> {
    let el: Element = evt.target()?.dyn_into().ok()?;
    el.closest(&format!("[{TARGET_ATTR}]"))
        .ok()??
        .get_attribute(TARGET_ATTR)?
        .parse()
        .ok()
}
