//! grouped-metadata: a thread-safe, two-level `group -> key -> value`
//! store with change notification, plus the small host helpers its
//! embedding application uses at startup.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep every structural invariant in one unsynchronized layer
//!   and put all concurrency concerns in a thin wrapper above it.
//! - Layers:
//!   - GroupMap<V, S>: two-level hash map. Creates a group together with
//!     its first key and drops it with its last key.
//!   - GroupedMetadataStore<V, S>: public API. One mutex per instance
//!     around GroupMap; a separate ChangeSignal registry for listeners.
//!
//! Constraints
//! - Uniqueness: a `(group, key)` pair holds at most one value; `add` on
//!   an existing pair fails with `DuplicateKey` and changes nothing.
//! - No empty groups: `contains_group(g)` implies `count_keys(g) >= 1`.
//! - `len()` is always the sum of the group sizes.
//! - Group and key names are non-empty and compared case-sensitively.
//!
//! Locking
//! - Every call that reads or writes the structure takes the instance
//!   mutex, including `len`, `count_keys` and `contains_value`.
//! - No call returns with the lock held. Enumeration (`group`,
//!   `snapshot`, `&store` iteration) copies entries under the lock and
//!   returns an owned `Snapshot`.
//! - `Clone` locks only the source; the copy starts with no listeners.
//!
//! Change notification
//! - Listeners are registered with `subscribe` and removed with the
//!   returned `Subscription`.
//! - A mutation that changes the contents fires once, after the lock is
//!   released, on the mutating thread. Failed adds, removal of absent
//!   pairs, and clearing an empty store do not fire.
//! - Listeners may re-enter the store.
//!
//! Notes and non-goals
//! - No persistence or serialization; listeners are expected to re-read
//!   the store and persist it themselves.
//! - Values are cloned out of the store. Use `Arc<T>` for shared values.
//!
//! Host helpers
//! - `net`: IPv4 classification and CIDR arithmetic.
//! - `paths`: lexical path handling and guarded filesystem checks that
//!   log known failures and report them as `Ok(false)`.
//! - `platform`: process-wide host facts, detected once.

mod entry;
mod error;
mod group_map;
pub mod net;
pub mod paths;
pub mod platform;
mod signal;
mod store;

// Public surface
pub use entry::{Entry, Snapshot};
pub use error::StoreError;
pub use signal::Subscription;
pub use store::GroupedMetadataStore;
