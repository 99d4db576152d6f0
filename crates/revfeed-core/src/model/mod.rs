//! Feed data model
//!
//! Snapshot-side types ([`Snapshot`], [`FieldValue`], [`Element`],
//! [`FieldDiff`]) describe what the upstream hands in. Response-side types
//! ([`FieldChange`], [`ChangeRecord`], [`ItemChangeSet`],
//! [`ResponseEnvelope`]) describe what the feed hands out.

pub mod change;
pub mod link;
pub mod response;
pub mod revision;
pub mod snapshot;
pub mod value;

pub use change::{ChangeRecord, FieldChange, ItemChangeSet, ItemState, StateValue, UpdateType};
pub use link::{LinkDirection, LinkedItem, PendingReverseLink, RoleTable};
pub use response::{ResponseEnvelope, ResponseType};
pub use revision::{Revision, Revisioned};
pub use snapshot::{FieldDiff, Snapshot, SnapshotLink, LINKED_ITEMS_FIELD};
pub use value::{Element, FieldValue, LinkRole};
