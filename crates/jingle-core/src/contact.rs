//! Contact lookup used for display names

/// Resolves protocol addresses to contacts known to the account
pub trait ContactDirectory: Send + Sync {
    /// Display name of the contact registered for `address`, if any
    fn display_name(&self, address: &str) -> Option<String>;
}
