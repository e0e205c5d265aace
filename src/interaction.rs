//! Pointer handling for the graph canvas.
//!
//! [`Interaction`] is a small state machine over pointer input that has already been hit
//! tested against the layout. It reports what happened as [`PointerEvent`]s and leaves the
//! consequences (moving a node, selecting it, invoking callbacks) to the engine.

use eframe::egui::Pos2;

/// Pointer travel, in simulation units, that turns a press into a drag.
pub const DRAG_THRESHOLD: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    HoverChanged(Option<usize>),
    Clicked(Option<usize>),
    DragStarted { node: usize, at: Pos2 },
    DragMoved { node: usize, at: Pos2 },
    DragEnded { node: usize },
}

#[derive(Clone, Copy, Debug)]
struct Press {
    node: Option<usize>,
    origin: Pos2,
    dragging: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Interaction {
    hovered: Option<usize>,
    selected: Option<usize>,
    press: Option<Press>,
}

impl Interaction {
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn dragging(&self) -> Option<usize> {
        self.press
            .filter(|press| press.dragging)
            .and_then(|press| press.node)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn select(&mut self, node: Option<usize>) {
        self.selected = node;
    }

    /// `hit` is the node under the pointer, if any.
    pub fn pointer_moved(&mut self, hit: Option<usize>) -> Option<PointerEvent> {
        // Hover is frozen while a node is being dragged.
        if self.dragging().is_some() || self.hovered == hit {
            return None;
        }

        self.hovered = hit;
        Some(PointerEvent::HoverChanged(hit))
    }

    pub fn pointer_pressed(&mut self, at: Pos2, hit: Option<usize>) {
        self.press = Some(Press {
            node: hit,
            origin: at,
            dragging: false,
        });
    }

    pub fn pointer_dragged(&mut self, at: Pos2) -> Option<PointerEvent> {
        let press = self.press.as_mut()?;

        if press.dragging {
            return press.node.map(|node| PointerEvent::DragMoved { node, at });
        }

        if (at - press.origin).length() < DRAG_THRESHOLD {
            return None;
        }

        // Background drags still count as drags so their release is not a click.
        press.dragging = true;
        press.node.map(|node| PointerEvent::DragStarted { node, at })
    }

    /// A release without a drag is a click; a click on empty canvas deselects.
    pub fn pointer_released(&mut self) -> Option<PointerEvent> {
        let press = self.press.take()?;

        if press.dragging {
            return press.node.map(|node| PointerEvent::DragEnded { node });
        }

        self.selected = press.node;
        Some(PointerEvent::Clicked(press.node))
    }
}

/// Handle for one outstanding path query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryToken(u64);

/// Issues query tokens; only the most recently issued token is accepted.
#[derive(Clone, Debug, Default)]
pub struct PathQueries {
    latest: u64,
}

impl PathQueries {
    pub fn begin(&mut self) -> QueryToken {
        self.latest += 1;
        QueryToken(self.latest)
    }

    pub fn is_current(&self, token: QueryToken) -> bool {
        token.0 == self.latest
    }

    /// Invalidates every token issued so far.
    pub fn cancel_all(&mut self) {
        self.latest += 1;
    }
}
