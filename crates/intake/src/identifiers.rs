//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive, so a [`ClientKey`] can never be confused with some other
//! string flowing through the intake pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies the requester a rate-limit bucket belongs to.
    ///
    /// Usually the textual form of the client's IP address. Requests whose
    /// origin cannot be determined all share the [`ClientKey::unknown`] bucket.
    ClientKey
}

impl ClientKey {
    /// Literal used when the network origin of a request is unavailable.
    pub const UNKNOWN: &'static str = "unknown";

    /// Returns the shared bucket for requests without a known origin.
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_owned())
    }

    /// Builds a key from an IP address.
    pub fn from_ip(ip: std::net::IpAddr) -> Self {
        Self(ip.to_string())
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single contact submission as it moves through the pipeline.
///
/// Generated fresh for every request; recorded on spans and log events so all
/// activity for one submission can be correlated. Never returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Generates a new random submission identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use super::*;

    #[test]
    fn client_key_rejects_empty_values() {
        assert!(ClientKey::new("").is_none());
        assert_eq!(ClientKey::new("10.0.0.1").unwrap().as_str(), "10.0.0.1");
    }

    #[test]
    fn client_key_from_ip_uses_canonical_text() {
        let v4 = ClientKey::from_ip(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 7)));
        let v6 = ClientKey::from_ip(IpAddr::V6(Ipv6Addr::LOCALHOST));

        assert_eq!(v4.as_str(), "192.168.1.7");
        assert_eq!(v6.as_str(), "::1");
        assert_eq!(ClientKey::unknown().to_string(), "unknown");
    }

    #[test]
    fn submission_ids_are_unique() {
        assert_ne!(SubmissionId::new_random(), SubmissionId::new_random());
    }
}
