use super::ConfigResult;

/// Durable per-user key/value storage for UI preferences.
///
/// Writes are synchronous so a preference is on disk before the operation
/// that changed it continues.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> ConfigResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ConfigResult<()>;
}
