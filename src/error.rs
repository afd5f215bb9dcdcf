//! Error taxonomy for the grouped store.

/// Failures reported by `GroupedMetadataStore` operations.
///
/// None of these are transient: the store performs no I/O, so every error
/// describes the caller's request and the store is left unchanged.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A group or key name was empty.
    #[error("invalid argument: {what} must not be empty")]
    InvalidArgument {
        /// Which argument was rejected.
        what: &'static str,
    },

    /// `add` on a `(group, key)` pair that already holds a value.
    #[error("duplicate key {key:?} in group {group:?}")]
    DuplicateKey { group: String, key: String },

    /// The group, or the key inside an existing group, is absent.
    #[error("{}", not_found_message(.group, .key))]
    KeyNotFound { group: String, key: Option<String> },

    /// A bulk copy would run past the end of the destination.
    #[error("cannot copy {needed} entries at index {start} into a buffer of {capacity}")]
    IndexOutOfRange {
        start: usize,
        needed: usize,
        capacity: usize,
    },
}

fn not_found_message(group: &str, key: &Option<String>) -> String {
    match key {
        Some(k) => format!("key {k:?} not found in group {group:?}"),
        None => format!("group {group:?} not found"),
    }
}

impl StoreError {
    pub(crate) fn group_not_found(group: &str) -> Self {
        StoreError::KeyNotFound {
            group: group.to_owned(),
            key: None,
        }
    }

    pub(crate) fn key_not_found(group: &str, key: &str) -> Self {
        StoreError::KeyNotFound {
            group: group.to_owned(),
            key: Some(key.to_owned()),
        }
    }
}

/// Reject empty group/key names before touching the structure.
pub(crate) fn check_names(group: &str, key: &str) -> Result<(), StoreError> {
    check_group(group)?;
    if key.is_empty() {
        return Err(StoreError::InvalidArgument { what: "key" });
    }
    Ok(())
}

pub(crate) fn check_group(group: &str) -> Result<(), StoreError> {
    if group.is_empty() {
        return Err(StoreError::InvalidArgument { what: "group" });
    }
    Ok(())
}
