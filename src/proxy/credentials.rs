// VMS credential store
// The APP_KEY / APP_SECRET pair is read once at start and never reloaded.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// File written by the service manager, next to the executable
pub const VMS_KEYS_FILE: &str = "vms_keys.json";

/// Artemis API key/secret pair.
///
/// The zero value (both fields empty) stands for "not provisioned"; signing
/// with it fails before any request leaves the process.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UpstreamCredential {
    key: String,
    secret: String,
}

impl UpstreamCredential {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }

    pub fn is_configured(&self) -> bool {
        !self.key.is_empty() && !self.secret.is_empty()
    }
}

// Never print the secret, not even in debug logs
impl fmt::Debug for UpstreamCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamCredential")
            .field("key", &self.key)
            .field("secret", &if self.secret.is_empty() { "" } else { "***" })
            .finish()
    }
}

#[derive(Deserialize)]
struct VmsKeysFile {
    #[serde(rename = "APP_KEY", default)]
    app_key: String,
    #[serde(rename = "APP_SECRET", default)]
    app_secret: String,
}

/// Load the VMS credential pair.
///
/// Never fails: a missing, unreadable or incomplete file yields the zero
/// value and the error surfaces on first use as `CredentialMissing`.
pub fn load_vms_credentials(path: &Path) -> UpstreamCredential {
    if !path.exists() {
        tracing::warn!("VMS keys file not found at {:?}, upstream calls will be refused", path);
        return UpstreamCredential::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read VMS keys file {:?}: {}", path, e);
            return UpstreamCredential::default();
        }
    };

    let keys: VmsKeysFile = match serde_json::from_str(&content) {
        Ok(k) => k,
        Err(e) => {
            tracing::warn!("Failed to parse VMS keys file {:?}: {}", path, e);
            return UpstreamCredential::default();
        }
    };

    if keys.app_key.is_empty() || keys.app_secret.is_empty() {
        tracing::warn!("VMS keys file {:?} is missing APP_KEY or APP_SECRET", path);
        return UpstreamCredential::default();
    }

    tracing::info!("Loaded VMS credentials (key: {})", keys.app_key);
    UpstreamCredential::new(keys.app_key, keys.app_secret)
}
