//! Rotary encoder and push switch input
//!
//! Two producers feed one consumer:
//! - [`QuadratureDecoder`] turns encoder samples into [`KeyEvent::Up`] / [`KeyEvent::Down`]
//! - [`SwitchDebouncer`] turns a settled switch press into [`KeyEvent::Enter`]
//!
//! Both publish into an [`EventQueue`] that the menu loop polls, typically
//! through a [`MenuCursor`].

pub mod debounce;
pub mod event_queue;
pub mod menu;
pub mod quadrature;

pub use debounce::{DebounceState, DebounceTimer, SwitchDebouncer, SwitchInput};
pub use event_queue::{EventQueue, QUEUE_CAPACITY};
pub use menu::MenuCursor;
pub use quadrature::{classify, EncoderSample, QuadratureDecoder, QuadratureSampler, Step};

/// Operator input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// Encoder turned one detent clockwise
    Up,
    /// Encoder turned one detent anticlockwise
    Down,
    /// Push switch pressed
    Enter,
}
