use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Store error: {0}")]
    Store(#[from] core_store::StoreError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] core_catalog::CatalogError),

    #[error("Commerce error: {0}")]
    Commerce(#[from] core_commerce::CommerceError),

    #[error("Social error: {0}")]
    Social(#[from] core_social::SocialError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
