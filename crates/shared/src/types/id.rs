//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `ProposalId` where a
//! `BankTransactionId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(TenantId, "Unique identifier for a tenant (accounting office client).");
typed_id!(UserId, "Unique identifier for a user or reviewer.");
typed_id!(AccountId, "Unique identifier for a chart of accounts entry.");
typed_id!(BankTransactionId, "Unique identifier for an imported bank transaction.");
typed_id!(ProposalId, "Unique identifier for a classification proposal.");
typed_id!(SplitLineId, "Unique identifier for a split line.");
typed_id!(DecisionId, "Unique identifier for an approval decision.");
typed_id!(RuleId, "Unique identifier for a classification rule.");
typed_id!(LedgerEntryId, "Unique identifier for a ledger entry.");
typed_id!(CounterpartId, "Unique identifier for a reconciliation counterpart record.");
typed_id!(AccountRequestId, "Unique identifier for a new-account request.");
