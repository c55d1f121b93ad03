//! SchemaForge engine - schema resolution passes
//!
//! This crate turns a constructed schema into a resolved one:
//! - Table finalization (behaviors, heavy indexing, id method)
//! - Constraint naming
//! - Referrer resolution
//! - Index synthesis for engines that require indexed foreign keys

pub mod constraint_naming;
pub mod finalize;
pub mod index_synthesis;
pub mod referrers;
pub mod resolver;

pub use constraint_naming::{name_constraints, AssignedName};
pub use finalize::{finalize_table, FinalizeOutcome};
pub use index_synthesis::{synthesize_indices, CoverageMap, SynthesisReason, SynthesizedIndex};
pub use referrers::{setup_referrers, ReferenceCheck, ReferrerOutcome};
pub use resolver::SchemaResolver;
