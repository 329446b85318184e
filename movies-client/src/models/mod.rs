pub mod claims;
pub mod discovery;
pub mod movie;

pub use claims::{Claim, ClaimSet};
pub use discovery::ProviderMetadata;
pub use movie::Movie;
