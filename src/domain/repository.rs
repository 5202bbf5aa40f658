use std::path::PathBuf;

use super::model::library::Library;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// ファイルは存在するがデコードできない、またはレコード検証に失敗した。
    #[error("corrupt library {}: {source}", .path.display())]
    CorruptLibrary {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

/// 永続化の抽象。Infra層が実装する。
/// 保存先が存在しない場合、loadは空のLibraryを返す。
pub trait LibraryRepository {
    fn load(&self) -> Result<Library, StoreError>;
    fn save(&self, library: &Library) -> Result<(), StoreError>;
}
