//! JSON casting validator
//!
//! Checks argument maps and results against their [`TypeHint`]s and
//! coerces compatible values the way a lax request parser would: numeric
//! strings become numbers, numbers become strings, and `"yes"`/`"no"`
//! style strings become booleans.
//!
//! [`TypeHint`]: solvent_domain::TypeHint

mod caster;
mod coerce;

pub use caster::{JsonCaster, JsonValidator};
pub use coerce::coerce;
