use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::domain::error::DomainError;
use crate::domain::model::book::Book;
use crate::domain::model::library::Library;
use crate::domain::repository::{LibraryRepository, StoreError};

/// 破損ファイル内で検証に失敗したレコードの位置
#[derive(Debug, thiserror::Error)]
#[error("record #{index}: {source}")]
pub struct RecordError {
    pub index: usize,
    #[source]
    pub source: DomainError,
}

#[derive(Debug, thiserror::Error)]
#[error("top-level value must be an array of records")]
pub struct NotAnArray;

/// JSONファイルによるLibraryRepository実装。
/// 保存のたびにファイル全体を書き換える。
pub struct JsonLibraryRepository {
    path: PathBuf,
}

impl JsonLibraryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存時の一時ファイル（`library.json` → `library.json.tmp`）
    pub fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// 4スペースインデント・非ASCIIはそのまま。各レコードはBook::to_serializable経由。
    pub fn encode(library: &Library) -> Result<String, StoreError> {
        let records: Vec<Value> = library.books().iter().map(Book::to_serializable).collect();
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut ser).map_err(StoreError::Encode)?;
        // serde_jsonの出力は常にUTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// ファイル内容をLibraryに変換する。部分的な結果は返さない。
    /// 不正なUTF-8もCorruptLibraryとして扱う。
    pub fn decode(&self, content: &[u8]) -> Result<Library, StoreError> {
        let value: Value = serde_json::from_slice(content).map_err(|e| self.corrupt(e))?;
        let records = value.as_array().ok_or_else(|| self.corrupt(NotAnArray))?;
        let books = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                Book::from_serializable(record).map_err(|source| RecordError { index, source })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.corrupt(e))?;
        Ok(Library::from_books(books))
    }

    fn corrupt(&self, source: impl std::error::Error + Send + Sync + 'static) -> StoreError {
        StoreError::CorruptLibrary {
            path: self.path.clone(),
            source: Box::new(source),
        }
    }
}

impl LibraryRepository for JsonLibraryRepository {
    fn load(&self) -> Result<Library, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "library file absent, starting empty");
            return Ok(Library::new());
        }
        let content = std::fs::read(&self.path)?;
        let library = self.decode(&content)?;
        tracing::debug!(path = %self.path.display(), books = library.len(), "library loaded");
        Ok(library)
    }

    fn save(&self, library: &Library) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = Self::encode(library)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, &content)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), books = library.len(), "library saved");
        Ok(())
    }
}
