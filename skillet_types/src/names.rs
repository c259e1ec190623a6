use derive_more::{Deref, Display, From};
use std::borrow::Borrow;

/// Name of a structured (record) type. Also the runtime type used by subtype dispatch.
#[derive(From, Deref, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct TypeName(String);
impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self(String::from(s))
    }
}
impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Name of a closed set of subtypes, e.g. the payload types of a message envelope.
#[derive(From, Deref, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct GroupName(String);
impl From<&str> for GroupName {
    fn from(s: &str) -> Self {
        Self(String::from(s))
    }
}

/// A schema version. Fields are only ever added at increasing versions.
#[derive(From, Deref, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Default)]
pub struct Version(u32);
impl Version {
    pub const ZERO: Version = Version(0);

    pub const fn new(v: u32) -> Self {
        Self(v)
    }
}
