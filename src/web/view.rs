//! DOM construction and rendering.
//!
//! Elements are created once (or reused when the page already has them) and
//! updated in place afterwards. Styling is inline so the crate works on a bare
//! page without a stylesheet.

use std::collections::HashSet;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, Node};

use crate::clock::format_time;
use crate::error::Error;
use crate::session::{Target, TargetId};
use crate::status::{Status, status_color};

const ROOT_ID: &str = "pr-root";
const STATUS_ID: &str = "pr-status";
const COUNT_ID: &str = "pr-count";
const TIME_ID: &str = "pr-time";
const PLAY_ID: &str = "pr-play";
const FIELD_ID: &str = "pr-field";
const MARKER_ID: &str = "pr-marker";

/// Attribute carrying a target's identity on its button.
pub const TARGET_ATTR: &str = "data-target";

const ROOT_STYLE: &str = "display:flex; flex-direction:column; gap:16px; max-width:1024px; margin:0 auto; padding:24px 0; font-family:sans-serif;";
const ROW_STYLE: &str = "display:flex; flex-direction:row; gap:16px; align-items:center;";
const STATUS_STYLE: &str = "margin:0; font-size:24px; font-weight:bold;";
const INPUT_STYLE: &str = "border:1px solid #000; border-radius:6px; padding:0 8px;";
const BUTTON_STYLE: &str = "width:160px; background:#f3f4f6; border:1px solid #000; border-radius:2px; cursor:pointer;";
const FIELD_STYLE: &str = "position:relative; width:100%; height:70vh; border:1px solid #000; overflow:hidden;";

pub struct View {
    pub input: HtmlInputElement,
    pub play: Element,
    pub field: Element,
    status: Element,
    time: Element,
    marker: Element,
}

impl View {
    /// Build the widget under `<body>`, reusing any elements left by an earlier mount.
    pub fn build(doc: &Document) -> Result<Self, Error> {
        let body = doc.body().ok_or(Error::NoBody)?;
        let root = ensure(doc, &body, "div", ROOT_ID, ROOT_STYLE)?;
        let status = ensure(doc, &root, "h1", STATUS_ID, STATUS_STYLE)?;

        let count_row = ensure(doc, &root, "div", "pr-count-row", ROW_STYLE)?;
        let count_label = ensure(doc, &count_row, "h3", "pr-count-label", "margin:0;")?;
        count_label.set_text_content(Some("Points:"));
        let input: HtmlInputElement = ensure(doc, &count_row, "input", COUNT_ID, INPUT_STYLE)?
            .dyn_into()
            .map_err(|_| Error::ElementType(COUNT_ID))?;
        input.set_type("number");
        if input.value().is_empty() {
            input.set_value("0");
        }

        let time_row = ensure(doc, &root, "div", "pr-time-row", ROW_STYLE)?;
        let time_label = ensure(doc, &time_row, "h3", "pr-time-label", "margin:0;")?;
        time_label.set_text_content(Some("Time:"));
        let time = ensure(doc, &time_row, "p", TIME_ID, "margin:0;")?;

        let play = ensure(doc, &root, "button", PLAY_ID, BUTTON_STYLE)?;
        play.set_attribute("type", "button")?;
        let field = ensure(doc, &root, "div", FIELD_ID, FIELD_STYLE)?;
        let marker = ensure(doc, &body, "div", MARKER_ID, &marker_style(0, 0, false))?;

        Ok(Self {
            input,
            play,
            field,
            status,
            time,
            marker,
        })
    }

    pub fn show_status(&self, status: Status) -> Result<(), Error> {
        self.status.set_text_content(Some(status.title()));
        self.status.set_attribute(
            "style",
            &format!("{STATUS_STYLE} color:{};", status_color(status)),
        )?;
        Ok(())
    }

    pub fn show_time(&self, elapsed_ms: u64) {
        self.time
            .set_text_content(Some(&format!("{}s", format_time(elapsed_ms))));
    }

    pub fn show_button(&self, label: &str) {
        self.play.set_text_content(Some(label));
    }

    /// Bring the field's target buttons in line with `targets`.
    ///
    /// Buttons are keyed by identity so a target that is fading out keeps its
    /// node and the CSS transition can play.
    pub fn sync_targets(
        &self,
        doc: &Document,
        targets: &[Target],
        count: u32,
        transition_ms: u32,
    ) -> Result<(), Error> {
        let live: HashSet<TargetId> = targets.iter().map(|t| t.id).collect();
        let children = self.field.children();
        let mut stale = Vec::new();
        for i in 0..children.length() {
            let Some(el) = children.item(i) else { continue };
            if !keeps_node(el.get_attribute(TARGET_ATTR).as_deref(), &live) {
                stale.push(el);
            }
        }
        // Collected first: the live collection shifts under removal.
        for el in stale {
            el.remove();
        }

        for target in targets {
            let dom_id = target_dom_id(target.id);
            let el = match doc.get_element_by_id(&dom_id) {
                Some(el) => el,
                None => {
                    let el = doc.create_element("button")?;
                    el.set_id(&dom_id);
                    el.set_attribute("type", "button")?;
                    el.set_attribute(TARGET_ATTR, &target.id.to_string())?;
                    el.set_text_content(Some(&target.label().to_string()));
                    self.field.append_child(&el)?;
                    el
                }
            };
            el.set_attribute("style", &target_style(target, count, transition_ms))?;
        }
        Ok(())
    }

    pub fn show_marker(&self, x: i32, y: i32) -> Result<(), Error> {
        self.marker
            .set_attribute("style", &marker_style(x, y, true))?;
        Ok(())
    }

    pub fn hide_marker(&self) -> Result<(), Error> {
        self.marker
            .set_attribute("style", &marker_style(0, 0, false))?;
        Ok(())
    }
}

fn ensure(
    doc: &Document,
    parent: &Node,
    tag: &str,
    id: &str,
    style: &str,
) -> Result<Element, Error> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let el = doc.create_element(tag)?;
    el.set_id(id);
    el.set_attribute("style", style)?;
    parent.append_child(&el)?;
    Ok(el)
}

// A field child survives a sync only if it is a target button still in play.
fn keeps_node(target_attr: Option<&str>, live: &HashSet<TargetId>) -> bool {
    target_attr
        .and_then(|v| v.parse::<TargetId>().ok())
        .is_some_and(|id| live.contains(&id))
}

pub fn target_dom_id(id: TargetId) -> String {
    format!("pr-target-{id}")
}

/// Inline style for one target button.
pub fn target_style(target: &Target, count: u32, transition_ms: u32) -> String {
    let background = if target.removing { "#f87171" } else { "#ffffff" };
    format!(
        "position:absolute; left:{:.2}%; top:{:.2}%; width:40px; height:40px; border:1px solid #000; border-radius:50%; background:{background}; font-size:18px; font-weight:bold; cursor:pointer; transition:all {transition_ms}ms ease-in-out; z-index:{};",
        target.x_pct,
        target.y_pct,
        target.depth(count)
    )
}

/// Inline style for the click marker, centred on the viewport point `(x, y)`.
pub fn marker_style(x: i32, y: i32, visible: bool) -> String {
    let display = if visible { "block" } else { "none" };
    format!(
        "display:{display}; position:fixed; left:{x}px; top:{y}px; width:48px; height:48px; border:1px solid #000; border-radius:50%; transform:translate(-50%,-50%); background:transparent; pointer-events:none; z-index:9999;"
    )
}
