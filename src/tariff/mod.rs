//! Fee computation engine.
//!
//! Responsibilities:
//!
//! - map an asset value to its value bracket
//! - look up the base rate for a service category in that bracket
//! - apply the complexity or service-count surcharge
//! - compose the regulated cost stack (fee, allowance, guild contribution, tax)
//!
//! Everything here is pure: no I/O, no shared mutable state, no logging.
//! Callers that want to report default-category fallbacks inspect
//! `Quotation::defaulted_services()`.

pub mod bracket;
pub mod engine;
pub mod rates;
pub mod stack;
pub mod surcharge;

pub use bracket::*;
pub use engine::*;
pub use rates::*;
pub use stack::*;
pub use surcharge::*;
