//! Reference field-diff generator.
//!
//! Upstreams that store full snapshots but have no diff primitive of their
//! own (the in-memory and SQLite upstreams) delegate
//! [`SnapshotSource::generate_field_diff`](crate::upstream::SnapshotSource::generate_field_diff)
//! here.
//!
//! ## Guarantees
//!
//! - **Determinism**: fields are compared in name order (standard fields,
//!   then custom fields, then relationships), so identical inputs produce
//!   identical output.
//! - **Shape fidelity**: list-valued fields always produce collection diffs
//!   with disjoint added/removed sets; every other field produces a scalar
//!   diff with the raw before/after values.
//! - **Relationships**: outgoing links are reported as a collection diff on
//!   `linkedWorkItems`, one relationship element per added or removed link.

pub mod engine;

pub use engine::generate_field_diff;
