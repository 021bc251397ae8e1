// Platform-neutral input events and scoped listener registration.
//
// Hosts translate their own window events into `InputEvent`s and hand them
// to the painter. Events are only processed while a `ListenerGuard` is alive.

use std::cell::Cell;
use std::rc::Rc;

/// Which pointer buttons are held right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerButtons {
    pub primary: bool,
    pub secondary: bool,
    pub middle: bool,
}

impl PointerButtons {
    pub const NONE: PointerButtons = PointerButtons { primary: false, secondary: false, middle: false };
    pub const PRIMARY: PointerButtons = PointerButtons { primary: true, secondary: false, middle: false };
    pub const SECONDARY: PointerButtons = PointerButtons { primary: false, secondary: true, middle: false };

    #[inline]
    pub fn any(self) -> bool {
        self.primary || self.secondary || self.middle
    }
}

/// Pointer position (layer pixel coordinates) plus the state that picks the paint color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pointer {
    pub x: i32,
    pub y: i32,
    pub buttons: PointerButtons,
    pub shift: bool,
}

impl Pointer {
    pub fn at(x: i32, y: i32) -> Self {
        Self { x, y, ..Self::default() }
    }

    pub fn with_buttons(mut self, buttons: PointerButtons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    /// Momentary erase: secondary button or shift held.
    #[inline]
    pub fn erasing(&self) -> bool {
        self.buttons.secondary || self.shift
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove(Pointer),
    /// A button went down; `Pointer::buttons` is the state after the press.
    PointerDown(Pointer),
    /// A button went up; `Pointer::buttons` is the state after the release.
    PointerUp(Pointer),
    PointerLeave,
    /// Positive grows the brush, anything else shrinks it.
    Wheel { delta: f32 },
}

/// What the host should do with an event after the painter saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    /// The painter used the event; suppress the host's default handling (e.g. scrolling).
    pub consumed: bool,
    /// Layers changed and the host should re-composite.
    pub repaint: bool,
}

impl EventResponse {
    pub const IGNORED: EventResponse = EventResponse { consumed: false, repaint: false };

    pub fn repaint() -> Self {
        Self { consumed: false, repaint: true }
    }

    pub fn consumed() -> Self {
        Self { consumed: true, repaint: true }
    }
}

/// Shared on/off switch between a painter and the guard it handed out.
#[derive(Debug, Clone, Default)]
pub(crate) struct Attachment(Rc<Cell<u32>>);

impl Attachment {
    pub(crate) fn is_attached(&self) -> bool {
        self.0.get() > 0
    }

    pub(crate) fn guard(&self) -> ListenerGuard {
        self.0.set(self.0.get() + 1);
        ListenerGuard { slot: Rc::clone(&self.0) }
    }
}

/// Keeps the painter's input handlers registered. Dropping it deregisters them.
#[must_use = "input handlers are detached as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ListenerGuard {
    slot: Rc<Cell<u32>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.slot.set(self.slot.get().saturating_sub(1));
        log::debug!("input listeners detached ({} left)", self.slot.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erase_override_from_button_or_shift() {
        assert!(!Pointer::at(0, 0).with_buttons(PointerButtons::PRIMARY).erasing());
        assert!(Pointer::at(0, 0).with_buttons(PointerButtons::SECONDARY).erasing());
        assert!(Pointer::at(0, 0).with_buttons(PointerButtons::PRIMARY).with_shift(true).erasing());
    }

    #[test]
    fn guards_nest_and_detach_on_drop() {
        let a = Attachment::default();
        assert!(!a.is_attached());
        let g1 = a.guard();
        let g2 = a.guard();
        drop(g1);
        assert!(a.is_attached());
        drop(g2);
        assert!(!a.is_attached());
    }
}
