//! Opaque random-byte identifiers, minted without a UUID wire dependency.
//!
//! Follows the same functional-core/imperative-shell split for each id:
//! `from_bytes` is pure restoration (from storage or the wire), `generate`
//! is the one impure entry point that touches the OS CSPRNG.

use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

/// Length in bytes of every id minted by this module.
pub const ID_LENGTH: usize = 16;

macro_rules! random_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name([u8; ID_LENGTH]);

        impl $name {
            /// Pure restoration from stored or wire bytes.
            pub fn from_bytes(bytes: [u8; ID_LENGTH]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
                &self.0
            }

            /// Mints a new id from the OS CSPRNG.
            ///
            /// # Panics
            ///
            /// Panics if the CSPRNG fails, which is treated as a
            /// catastrophic system error.
            pub fn generate() -> Self {
                let mut bytes = [0u8; ID_LENGTH];
                getrandom::fill(&mut bytes).expect("CSPRNG failure is catastrophic");
                Self(bytes)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "("))?;
                for byte in &self.0 {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, ")")
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for byte in &self.0 {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }

        impl From<[u8; ID_LENGTH]> for $name {
            fn from(bytes: [u8; ID_LENGTH]) -> Self {
                Self::from_bytes(bytes)
            }
        }
    };
}

random_id!(
    CdcGenerationId,
    "Identifies a change-data-capture generation, minted when ring ownership changes."
);
random_id!(
    RequestId,
    "Identifies a pending per-node or global topology request (for the `topology_requests` table)."
);
random_id!(
    SessionId,
    "Used to mint fencing tokens for streaming operations; rotated whenever the coordinator restarts a streaming plan."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_not_all_zero() {
        let id = RequestId::generate();
        assert!(id.as_bytes().iter().any(|&b| b != 0));
    }

    #[test]
    fn roundtrips_through_bytes() {
        let bytes = [7u8; ID_LENGTH];
        let id = SessionId::from_bytes(bytes);
        assert_eq!(id.as_bytes(), &bytes);
    }
}
