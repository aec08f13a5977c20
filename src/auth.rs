//! Bearer credentials handed to storage. The crate never looks inside a credential; it only
//! passes it along unmodified.

use std::{fmt::Debug, sync::Arc};

/// Opaque bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Arc<str>);

impl Credential {
    /// Blank tokens are treated as no credential at all.
    pub fn new_opt(token: impl AsRef<str>) -> Option<Self> {
        let token = token.as_ref();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token.into()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(***)")
    }
}

/// Supplies the credential of the current user, if there is one.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialProvider {
    fn credential(&self) -> Option<Credential>;
}

/// Credential fixed at construction, usually taken from the command line or environment.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<Credential>);

impl StaticCredential {
    pub fn new(token: Option<String>) -> Self {
        Self(token.and_then(Credential::new_opt))
    }
}

impl CredentialProvider for StaticCredential {
    fn credential(&self) -> Option<Credential> {
        self.0.clone()
    }
}
