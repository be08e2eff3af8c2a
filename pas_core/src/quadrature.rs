//! Quadrature decoding of the two pedal-sensor channels.
//!
//! The sensor yields a Gray-code sequence of 2-bit states `S = B*2 + A`.
//! Each `(previous, next)` pair maps to one `Step`.

/// A 2-bit quadrature state, always in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuadState(u8);

impl QuadState {
    /// Both channels high. Used as the single timing reference because the
    /// two sensors are not placed a clean quarter-cycle apart.
    pub const REFERENCE: QuadState = QuadState(3);

    #[inline]
    pub fn from_levels(a: bool, b: bool) -> Self {
        Self(u8::from(b) * 2 + u8::from(a))
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        (bits <= 3).then_some(Self(bits))
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Reverse,
    Still,
    Forward,
    /// Two-step jump: bounce or a missed sample. Not actionable.
    Invalid,
}

impl Step {
    /// Numeric code of the classic encoder matrix: -1, 0, 1 or 2.
    pub const fn code(self) -> i8 {
        match self {
            Step::Reverse => -1,
            Step::Still => 0,
            Step::Forward => 1,
            Step::Invalid => 2,
        }
    }

    /// Direction of a valid single step.
    #[inline]
    pub const fn direction(self) -> Option<f32> {
        match self {
            Step::Reverse => Some(-1.0),
            Step::Forward => Some(1.0),
            Step::Still | Step::Invalid => None,
        }
    }
}

/// Transition table keyed by the ordered pair `(prev, next)`.
pub fn transition(prev: QuadState, next: QuadState) -> Step {
    use Step::*;
    match (prev.0, next.0) {
        (0, 0) | (1, 1) | (2, 2) | (3, 3) => Still,
        (0, 1) | (1, 3) | (2, 0) | (3, 2) => Reverse,
        (0, 2) | (1, 0) | (2, 3) | (3, 1) => Forward,
        _ => Invalid,
    }
}

/// Remembers the previous state between sampling events.
#[derive(Debug, Default)]
pub struct QuadratureDecoder {
    prev: QuadState,
}

impl QuadratureDecoder {
    /// Classify the move to `next` and make it the new previous state.
    #[inline]
    pub fn update(&mut self, next: QuadState) -> Step {
        let step = transition(self.prev, next);
        self.prev = next;
        step
    }

    pub fn state(&self) -> QuadState {
        self.prev
    }
}
