//! # Platform Façade
//!
//! Wires every domain service over one shared connection pool. Hosts call
//! [`LabelCore::connect`] once at startup and reach the catalog, commerce,
//! and social services through the accessors.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_catalog::repositories::{
    LookupRepository, SqliteAlbumRepository, SqliteArtistRepository, SqliteEventRepository,
    SqliteLookupRepository, SqliteManagerRepository, SqliteSongRepository,
};
use core_catalog::{AlbumService, ArtistService, EventService, ManagerService, SongService};
use core_commerce::repositories::{
    SqliteCartRepository, SqlitePaymentMethodRepository, SqlitePromotionRepository,
    SqliteSaleRepository, SqliteTransactionRepository,
};
use core_commerce::{
    CartService, PaymentMethodService, PromotionService, SaleService, TransactionService,
};
use core_social::repositories::{
    SqliteCommentRepository, SqliteFavoriteRepository, SqliteReviewRepository,
};
use core_social::{CommentService, FavoriteService, ReviewService};
use core_store::{create_pool, DatabaseConfig, SqliteDocumentStore};
use tracing::info;

/// Aggregated handle to every domain service, sharing one pool.
pub struct LabelCore {
    lookups: Arc<dyn LookupRepository>,
    artists: ArtistService,
    events: EventService,
    managers: ManagerService,
    albums: AlbumService,
    songs: SongService,
    promotions: PromotionService,
    payment_methods: PaymentMethodService,
    carts: CartService,
    sales: SaleService,
    transactions: TransactionService,
    comments: CommentService,
    reviews: ReviewService,
    favorites: FavoriteService,
}

impl LabelCore {
    /// Build the pool, run migrations, and wire up all services.
    ///
    /// # Errors
    ///
    /// Returns an error when the pool cannot be created or migrations fail.
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        let pool = create_pool(config).await?;

        let documents = Arc::new(SqliteDocumentStore::new(pool.clone()));

        let sale_repo = Arc::new(SqliteSaleRepository::new(pool.clone()));

        let core = Self {
            lookups: Arc::new(SqliteLookupRepository::new(pool.clone())),
            artists: ArtistService::new(
                Arc::new(SqliteArtistRepository::new(pool.clone())),
                documents.clone(),
            ),
            events: EventService::new(
                Arc::new(SqliteEventRepository::new(pool.clone())),
                documents.clone(),
            ),
            managers: ManagerService::new(
                Arc::new(SqliteManagerRepository::new(pool.clone())),
                documents,
            ),
            albums: AlbumService::new(Arc::new(SqliteAlbumRepository::new(pool.clone()))),
            songs: SongService::new(Arc::new(SqliteSongRepository::new(pool.clone()))),
            promotions: PromotionService::new(Arc::new(SqlitePromotionRepository::new(
                pool.clone(),
            ))),
            payment_methods: PaymentMethodService::new(Arc::new(
                SqlitePaymentMethodRepository::new(pool.clone()),
            )),
            carts: CartService::new(Arc::new(SqliteCartRepository::new(pool.clone()))),
            sales: SaleService::new(sale_repo.clone()),
            transactions: TransactionService::new(
                Arc::new(SqliteTransactionRepository::new(pool.clone())),
                sale_repo,
            ),
            comments: CommentService::new(Arc::new(SqliteCommentRepository::new(pool.clone()))),
            reviews: ReviewService::new(Arc::new(SqliteReviewRepository::new(pool.clone()))),
            favorites: FavoriteService::new(Arc::new(SqliteFavoriteRepository::new(pool))),
        };

        info!("Platform core connected");
        Ok(core)
    }

    /// The id+label lookup tables (genres, countries, statuses, genders)
    pub fn lookups(&self) -> &Arc<dyn LookupRepository> {
        &self.lookups
    }

    pub fn artists(&self) -> &ArtistService {
        &self.artists
    }

    pub fn events(&self) -> &EventService {
        &self.events
    }

    pub fn managers(&self) -> &ManagerService {
        &self.managers
    }

    pub fn albums(&self) -> &AlbumService {
        &self.albums
    }

    pub fn songs(&self) -> &SongService {
        &self.songs
    }

    pub fn promotions(&self) -> &PromotionService {
        &self.promotions
    }

    pub fn payment_methods(&self) -> &PaymentMethodService {
        &self.payment_methods
    }

    pub fn carts(&self) -> &CartService {
        &self.carts
    }

    pub fn sales(&self) -> &SaleService {
        &self.sales
    }

    pub fn transactions(&self) -> &TransactionService {
        &self.transactions
    }

    pub fn comments(&self) -> &CommentService {
        &self.comments
    }

    pub fn reviews(&self) -> &ReviewService {
        &self.reviews
    }

    pub fn favorites(&self) -> &FavoriteService {
        &self.favorites
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_catalog::models::{ArtistMetadataPatch, NewArtist};
    use core_catalog::repositories::LookupKind;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    async fn connect() -> LabelCore {
        init_tracing();
        LabelCore::connect(DatabaseConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_connect_wires_all_services() {
        let core = connect().await;

        let genre_id = core.lookups().insert(LookupKind::Genre, "Rock").await.unwrap();

        let artist = core
            .artists()
            .create(NewArtist {
                name: "Los Visitantes".to_string(),
                biography: "Banda de rock".to_string(),
                photo_url: None,
                genre_id: Some(genre_id),
                country_id: None,
                status_id: None,
                metadata: ArtistMetadataPatch::default(),
            })
            .await
            .unwrap();

        assert_eq!(artist.record.genre.as_ref().map(|g| g.label.as_str()), Some("Rock"));
    }

    #[tokio::test]
    async fn test_errors_chain_into_core_error() {
        let core = connect().await;

        let err: CoreError = core.albums().get(404).await.unwrap_err().into();
        assert!(matches!(
            err,
            CoreError::Catalog(core_catalog::CatalogError::NotFound { .. })
        ));
    }
}
