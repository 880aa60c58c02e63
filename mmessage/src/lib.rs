//! Canonical conversation turn and streamed fragment model.
//!
//! ```rust
//! use mmessage::{Role, Turn, TurnStatus};
//!
//! let turn = Turn::user("What is the weather in Pune?");
//! assert_eq!(turn.role, Role::User);
//! assert_eq!(turn.status, TurnStatus::Complete);
//!
//! let fragments = turn.into_fragments(4);
//! let rebuilt = Turn::from_fragments(&fragments).expect("fragments should merge");
//! assert_eq!(rebuilt, turn);
//! ```

mod error;
mod fragment;
mod turn;

pub use error::{MessageError, MessageErrorKind};
pub use fragment::Fragment;
pub use turn::{ArgumentMap, Role, TokenUsage, Turn, TurnStatus};
