//! The three steps of a refresh, in call order:
//! identity agent -> STS token exchange -> IAM service account impersonation.

pub mod federation;
pub mod identity;
pub mod impersonation;

pub use federation::{FederatedToken, FederationExchanger};
pub use identity::{FetchIdentityDocument, IdentityAssertion, IdentityDocumentFetcher, SpiffeWorkloadClient};
pub use impersonation::{ImpersonatedToken, ImpersonationClient};
