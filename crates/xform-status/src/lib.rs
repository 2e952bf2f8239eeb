//! Transformation Status
//!
//! Finite lifecycle states shared by sub-tasks and their parent
//! transformation, the rule that folds many child states into one, the
//! failure reason codes, and the clocks entities stamp their times with.
//!
//! ```rust
//! use xform_status::State;
//!
//! let parent = State::fold([State::Successful, State::Failed]);
//! assert_eq!(parent, State::Failed);
//! assert!(parent.is_completed());
//! ```

#![warn(unreachable_pub)]

mod clock;
mod state;
mod wire;

pub use clock::{elapsed, latest_completion, Clock, ManualClock, SystemClock};
pub use state::State;
pub use wire::{ErrorCode, WireName};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
