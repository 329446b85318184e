pub mod catalog_client;
pub mod channel_credentials;
pub mod discovery;
pub mod identity_client;
pub mod metrics;
pub mod movie_service;
pub mod token;
mod upstream;

pub use catalog_client::CatalogClient;
pub use channel_credentials::ChannelAuthorizer;
pub use discovery::DiscoveryResolver;
pub use identity_client::IdentityClient;
pub use metrics::{get_metrics, init_metrics};
pub use movie_service::{MovieApiService, MovieService};
pub use token::{AccessTokenProvider, BearerToken, StaticTokenProvider};
