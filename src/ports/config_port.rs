//! Configuration access port trait.

/// Keyed lookups into `[section] key = value` settings.
pub trait ConfigPort {
    /// `None` when the key is absent or blank.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
}
