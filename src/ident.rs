use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable, unique key for a parameter or section.
///
/// Identifiers address parameters behind the scenes — in persisted settings
/// files, in dynamic-property rules, and in the get/set API — so they must
/// stay stable across schema versions. Renaming one breaks migration of any
/// settings file written under the old name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(id: impl Into<String>) -> Self {
        Identifier(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Identifier(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Identifier(id)
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
