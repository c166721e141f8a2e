//! Value Objects
//!
//! Immutable data carried through building and resolution: caller
//! arguments, the arguments a body receives, type hints and the flat
//! option items validators are built from.

/// Caller and body argument containers
pub mod arguments;
/// Flat option descriptions
pub mod option_item;
/// Declared parameter and return types
pub mod type_hint;

pub use arguments::{Arguments, CallArgs, KwArgs};
pub use option_item::{OptionItem, OptionSource};
pub use type_hint::TypeHint;
