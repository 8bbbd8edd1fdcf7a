//! Core calculator logic for voxcalc.
//!
//! Everything here is synchronous and free of IO:
//!
//! - [`normalize`]: spoken/typed text to a canonical arithmetic string
//! - [`evaluate`]: canonical string to a number or a typed failure
//! - [`sequence`]: next-term inference for arithmetic/geometric progressions
//! - [`narrate`]: results to spoken English
//! - [`session`]: the display buffer and its keypad semantics
//!
//! Callers (the engine) own side effects; the session reports them as
//! [`SessionEffects`] instead of performing them.

pub mod actions;
pub mod evaluate;
pub mod narrate;
pub mod normalize;
pub mod sequence;
pub mod session;

pub use actions::ScientificAction;
pub use evaluate::{FastPath, evaluate, prepare_expression};
pub use narrate::{APOLOGY, narrate, number_to_words, to_spoken_words};
pub use normalize::{CanonicalExpression, normalize, words_to_digits};
pub use sequence::{Progression, ProgressionKind, extract_numbers, infer_next, is_series_query};
pub use session::{Session, SessionEffects};
