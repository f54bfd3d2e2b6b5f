//! Compute-budget augmentation pipeline
//!
//! Takes an already-assembled, not-yet-priced instruction sequence and
//! prepares it for signing:
//! - **fees**: recommend a priority-fee price from recent per-slot samples
//! - **lookup**: resolve the network's published address lookup table
//! - **simulate**: measure real compute-unit cost by dry run
//! - **augment**: prepend the price/limit directives and attach the table
//!
//! [`augment::augment`] is the orchestrating entry point; the
//! sub-operations are exposed for independent use and testing. Every
//! failure propagates immediately; nothing here retries.

pub mod augment;
pub mod errors;
pub mod fees;
pub mod lookup;
pub mod sequence;
pub mod simulate;

pub use augment::augment;
pub use errors::BudgetError;
pub use fees::{estimate, PriorityFeeSample};
pub use lookup::LookupTableResolver;
pub use sequence::{ComputeBudget, InstructionSequence, ScaleFactors, MAX_COMPUTE_UNIT_LIMIT};
pub use simulate::simulated_units;
