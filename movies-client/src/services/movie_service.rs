use crate::error::ClientError;
use crate::models::{ClaimSet, Movie};
use crate::services::catalog_client::CatalogClient;
use crate::services::identity_client::IdentityClient;
use crate::services::token::AccessTokenProvider;
use async_trait::async_trait;
use std::sync::Arc;

/// Operations a signed-in user can perform.
///
/// Only `get_user_info` and `get_movies` have behavior; the remaining
/// catalog operations always fail with [`ClientError::NotImplemented`].
#[async_trait]
pub trait MovieApiService: Send + Sync {
    async fn get_user_info(&self) -> Result<ClaimSet, ClientError>;
    async fn get_movies(&self) -> Result<Vec<Movie>, ClientError>;
    async fn get_movie_by_id(&self, id: i32) -> Result<Movie, ClientError>;
    async fn create_movie(&self, movie: Movie) -> Result<Movie, ClientError>;
    async fn update_movie(&self, movie: Movie) -> Result<Movie, ClientError>;
    async fn delete_movie(&self, id: i32) -> Result<(), ClientError>;
}

/// Per-caller composition of the shared clients and the caller's token.
pub struct MovieService<T> {
    identity_client: Arc<IdentityClient>,
    catalog_client: Arc<CatalogClient>,
    tokens: T,
}

impl<T: AccessTokenProvider> MovieService<T> {
    pub fn new(
        identity_client: Arc<IdentityClient>,
        catalog_client: Arc<CatalogClient>,
        tokens: T,
    ) -> Self {
        Self {
            identity_client,
            catalog_client,
            tokens,
        }
    }
}

#[async_trait]
impl<T: AccessTokenProvider> MovieApiService for MovieService<T> {
    async fn get_user_info(&self) -> Result<ClaimSet, ClientError> {
        self.identity_client.get_user_info(&self.tokens).await
    }

    async fn get_movies(&self) -> Result<Vec<Movie>, ClientError> {
        self.catalog_client.list_movies().await
    }

    async fn get_movie_by_id(&self, id: i32) -> Result<Movie, ClientError> {
        self.catalog_client.get_movie(id).await
    }

    async fn create_movie(&self, movie: Movie) -> Result<Movie, ClientError> {
        self.catalog_client.create_movie(movie).await
    }

    async fn update_movie(&self, movie: Movie) -> Result<Movie, ClientError> {
        self.catalog_client.update_movie(movie).await
    }

    async fn delete_movie(&self, id: i32) -> Result<(), ClientError> {
        self.catalog_client.delete_movie(id).await
    }
}
