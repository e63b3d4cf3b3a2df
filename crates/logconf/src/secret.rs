//! Secret references and the loaders that resolve them.
//!
//! A [`Secret`] never carries a resolved value into the compiled output on its
//! own; the compiler asks a [`SecretLoader`] for it and only the returned
//! [`SecretString`] is written into the parameter list.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret has no source (need one of: value, valueFrom, mountFrom)")]
    NoSource,

    #[error("secret '{name}' has no key '{key}'")]
    NotFound { name: String, key: String },

    #[error("secret backend failure: {0}")]
    Backend(String),
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<ValueFrom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_from: Option<ValueFrom>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFrom {
    pub secret_key_ref: SecretKeyRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecretKeyRef {
    pub name: String,
    pub key: String,
}

impl Secret {
    pub fn inline(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn from_key(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            value_from: Some(ValueFrom::key(name, key)),
            ..Default::default()
        }
    }

    pub fn mounted(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            mount_from: Some(ValueFrom::key(name, key)),
            ..Default::default()
        }
    }

    /// True when no source is configured at all.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.value_from.is_none() && self.mount_from.is_none()
    }
}

impl ValueFrom {
    pub fn key(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            secret_key_ref: SecretKeyRef {
                name: name.into(),
                key: key.into(),
            },
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("value", &self.value.as_ref().map(|_| "[REDACTED]"))
            .field("value_from", &self.value_from)
            .field("mount_from", &self.mount_from)
            .finish()
    }
}

/// Resolves a [`Secret`] to its cleartext value.
///
/// Implementations must return the same value for the same reference for the
/// duration of one compile and must not log what they return. Timeouts and
/// retries, if any, belong here and not in the compiler.
pub trait SecretLoader {
    fn load(&self, secret: &Secret) -> Result<SecretString, SecretError>;
}

impl<F> SecretLoader for F
where
    F: Fn(&Secret) -> Result<SecretString, SecretError>,
{
    fn load(&self, secret: &Secret) -> Result<SecretString, SecretError> {
        self(secret)
    }
}

/// In-memory loader keyed by secret name and key.
///
/// Inline values are returned as-is; `mountFrom` references are resolved the
/// same way as `valueFrom` ones.
#[derive(Default)]
pub struct StaticSecretLoader {
    secrets: BTreeMap<SecretKeyRef, SecretString>,
}

impl StaticSecretLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, key: &str, value: impl Into<String>) -> Self {
        self.insert(name, key, value);
        self
    }

    pub fn insert(&mut self, name: &str, key: &str, value: impl Into<String>) {
        self.secrets.insert(
            SecretKeyRef {
                name: name.to_string(),
                key: key.to_string(),
            },
            SecretString::from(value.into()),
        );
    }

    fn lookup(&self, reference: &SecretKeyRef) -> Result<SecretString, SecretError> {
        self.secrets
            .get(reference)
            .map(|value| SecretString::from(value.expose_secret().to_string()))
            .ok_or_else(|| SecretError::NotFound {
                name: reference.name.clone(),
                key: reference.key.clone(),
            })
    }
}

impl SecretLoader for StaticSecretLoader {
    fn load(&self, secret: &Secret) -> Result<SecretString, SecretError> {
        if let Some(value) = &secret.value {
            return Ok(SecretString::from(value.clone()));
        }
        let reference = secret
            .value_from
            .as_ref()
            .or(secret.mount_from.as_ref())
            .ok_or(SecretError::NoSource)?;
        self.lookup(&reference.secret_key_ref)
    }
}

/// A secret the agent must find on disk, as recorded by [`MountSecretLoader`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MountedSecret {
    pub reference: SecretKeyRef,
    pub path: PathBuf,
}

/// Loader that renders `mountFrom` secrets as file paths.
///
/// The agent reads such secrets from a mounted volume, so the compiled output
/// contains only the path; every mount handed out is recorded so the caller can
/// provision the volume. `valueFrom` and inline secrets go to the inner loader.
pub struct MountSecretLoader<L> {
    inner: L,
    mount_dir: PathBuf,
    mounts: Mutex<Vec<MountedSecret>>,
}

impl<L: SecretLoader> MountSecretLoader<L> {
    pub fn new(inner: L, mount_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            mount_dir: mount_dir.into(),
            mounts: Mutex::new(Vec::new()),
        }
    }

    pub fn mount_dir(&self) -> &Path {
        &self.mount_dir
    }

    /// Mounts handed out so far, sorted and deduplicated.
    pub fn mounts(&self) -> Vec<MountedSecret> {
        let mut mounts = self
            .mounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        mounts.sort();
        mounts.dedup();
        mounts
    }
}

impl<L: SecretLoader> SecretLoader for MountSecretLoader<L> {
    fn load(&self, secret: &Secret) -> Result<SecretString, SecretError> {
        let Some(mount) = &secret.mount_from else {
            return self.inner.load(secret);
        };
        let reference = &mount.secret_key_ref;
        let path = self
            .mount_dir
            .join(format!("{}-{}", reference.name, reference.key));
        let rendered = path
            .to_str()
            .ok_or_else(|| SecretError::Backend(format!("non UTF-8 mount path {path:?}")))?
            .to_string();
        tracing::trace!(secret = %reference.name, key = %reference.key, "secret mounted");
        self.mounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MountedSecret {
                reference: reference.clone(),
                path,
            });
        Ok(SecretString::from(rendered))
    }
}
