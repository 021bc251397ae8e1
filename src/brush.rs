// Brush size: one step per wheel tick, never below 1.
//
// The radius can be controlled from outside. When an owner pins it with
// `set_external_radius`, wheel updates only notify the observer; what the
// engine draws with is whatever the owner pins next.

/// Observer called with the proposed radius after every wheel step.
pub type SizeObserver = Box<dyn FnMut(u32)>;

/// Pure wheel rule: grow by one for a positive delta, shrink by one otherwise, floor at 1.
pub fn next_radius(delta: f32, current: u32) -> u32 {
    if delta > 0.0 {
        current.saturating_add(1)
    } else {
        current.saturating_sub(1).max(1)
    }
}

/// Outcome of offering a wheel event to the brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// Nobody observes size changes: the host should scroll as usual.
    PassThrough,
    /// Wheel was used for sizing; the host should suppress its default scroll.
    Resized(u32),
}

pub struct BrushController {
    radius: u32,
    external: Option<u32>,
    observer: Option<SizeObserver>,
}

impl std::fmt::Debug for BrushController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrushController")
            .field("radius", &self.radius)
            .field("external", &self.external)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl BrushController {
    pub fn new(initial_radius: u32, observer: Option<SizeObserver>) -> Self {
        if initial_radius == 0 {
            log::debug!("brush radius 0 clamped to 1");
        }
        Self { radius: initial_radius.max(1), external: None, observer }
    }

    /// The radius to draw with: the pinned one if present, else the internal one.
    #[inline]
    pub fn radius(&self) -> u32 {
        self.external.unwrap_or(self.radius)
    }

    /// Sizing by wheel is only active while someone listens for size changes.
    pub fn wheel_enabled(&self) -> bool {
        self.observer.is_some()
    }

    pub fn set_observer(&mut self, observer: Option<SizeObserver>) {
        self.observer = observer;
    }

    /// Pin (Some) or release (None) the radius from outside. Clamped to ≥ 1.
    pub fn set_external_radius(&mut self, radius: Option<u32>) {
        self.external = radius.map(|r| r.max(1));
        if let Some(r) = self.external {
            self.radius = r;
        }
    }

    pub fn is_controlled(&self) -> bool {
        self.external.is_some()
    }

    /// Apply one wheel event. Without an observer nothing changes.
    pub fn on_scroll(&mut self, delta: f32) -> WheelOutcome {
        let Some(observer) = self.observer.as_mut() else {
            return WheelOutcome::PassThrough;
        };
        let next = next_radius(delta, self.external.unwrap_or(self.radius));
        self.radius = next;
        observer(next);
        log::trace!("brush radius -> {next} (controlled={})", self.external.is_some());
        WheelOutcome::Resized(next)
    }
}
