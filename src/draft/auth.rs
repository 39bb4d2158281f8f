//! Completion API key storage in the system keyring

use keyring::Entry;

use super::error::DraftError;

/// Service name for keyring storage
const SERVICE_NAME: &str = "coursegate";
/// Entry name for the API key
const API_KEY_ENTRY: &str = "anthropic-api-key";

/// Manages the drafting API key
pub struct ApiKeyManager;

impl ApiKeyManager {
    fn entry() -> Result<Entry, DraftError> {
        Entry::new(SERVICE_NAME, API_KEY_ENTRY).map_err(|e| DraftError::KeyringError(e.to_string()))
    }

    /// Read the stored key
    pub fn get_api_key() -> Result<String, DraftError> {
        Self::entry()?.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => DraftError::ApiKeyNotFound,
            _ => DraftError::KeyringError(e.to_string()),
        })
    }

    /// Store a key after checking its format
    pub fn set_api_key(key: &str) -> Result<(), DraftError> {
        let key = key.trim();
        if !Self::validate_key_format(key) {
            return Err(DraftError::InvalidApiKey);
        }

        Self::entry()?.set_password(key).map_err(|e| DraftError::KeyringError(e.to_string()))?;
        tracing::info!(key = %Self::mask_key(key), "API key stored");
        Ok(())
    }

    /// Whether a key is stored
    pub fn has_api_key() -> bool {
        Self::get_api_key().is_ok()
    }

    /// Delete the stored key
    pub fn delete_api_key() -> Result<(), DraftError> {
        Self::entry()?.delete_credential().map_err(|e| match e {
            keyring::Error::NoEntry => DraftError::ApiKeyNotFound,
            _ => DraftError::KeyringError(e.to_string()),
        })
    }

    fn validate_key_format(key: &str) -> bool {
        key.starts_with("sk-ant-") && key.len() > 20
    }

    /// First 8 and last 4 characters, for logs and confirmations
    pub fn mask_key(key: &str) -> String {
        if key.len() <= 12 || !key.is_ascii() {
            return "*".repeat(key.chars().count());
        }
        format!("{}...{}", &key[..8], &key[key.len() - 4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_key_format() {
        assert!(ApiKeyManager::validate_key_format("sk-ant-REDACTED"));
        assert!(!ApiKeyManager::validate_key_format("invalid-key"));
        assert!(!ApiKeyManager::validate_key_format("sk-ant-short"));
    }

    #[test]
    fn mask_key() {
        let masked = ApiKeyManager::mask_key("sk-ant-REDACTED");
        assert_eq!(masked, "sk-ant-a...wxyz");
        assert_eq!(ApiKeyManager::mask_key("short"), "*****");
    }

    #[test]
    fn malformed_key_rejected_before_keyring() {
        assert!(matches!(ApiKeyManager::set_api_key("nope"), Err(DraftError::InvalidApiKey)));
    }
}
