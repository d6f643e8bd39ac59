//! Game-detail screen core
//!
//! A Redux-style loop: the rendering layer and the data effects dispatch
//! `Action`s, a pure reducer produces the next `ScreenState` plus an `Effect`,
//! and the `Runtime` executes effects and feeds their results back in.

pub mod action;
pub mod effects;
pub mod reducer;
pub mod reducers;
pub mod runtime;
pub mod state;

#[cfg(test)]
pub mod testing;


pub use action::Action;
pub use effects::{DataEffects, Effect};
pub use reducer::reduce;
pub use runtime::Runtime;
pub use state::{Availability, MarkerState, ScreenSnapshot, ScreenState, SliceStatus};
