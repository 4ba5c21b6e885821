//! Upload identities.
//!
//! An [`Identity`] names one accepted upload and is the filename stem of all
//! three of its derivatives. It is a UUIDv7: 48 bits of millisecond
//! timestamp followed by 74 random bits, so identities sort roughly by upload
//! time and collide only with negligible probability. No collision check is
//! made against existing files; the create-new write in
//! [`storage`](crate::storage) would surface one as an error instead of an
//! overwrite.
//!
//! Rendered as `img_` followed by 32 lowercase hex digits, e.g.
//! `img_0192f3a4c1d07e5b9a3f6c2d8e1b4a70`.

use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

const PREFIX: &str = "img_";

/// Opaque, globally-unique token for one accepted upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(Uuid);

impl Identity {
    /// Allocate a fresh identity from the current time and the thread RNG.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse the `img_<hex>` form produced by [`Display`](fmt::Display).
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix(PREFIX)?;
        if hex.len() != 32 {
            return None;
        }
        Uuid::try_parse(hex).ok().map(Self)
    }

    /// The filename stem used for every derivative of this upload.
    pub fn stem(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0.simple())
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
