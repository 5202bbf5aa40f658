use crate::domain::error::DomainError;
use crate::domain::repository::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// update_statusの対象が存在しなかった（回復可能）
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Domain(DomainError::NotFound(_)))
    }

    pub fn is_corrupt_library(&self) -> bool {
        matches!(self, AppError::Store(StoreError::CorruptLibrary { .. }))
    }
}
