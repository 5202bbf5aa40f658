use crate::domain::model::book::{Book, Status};
use crate::domain::model::id::BookId;
use crate::domain::model::library::{Library, SearchField};
use crate::domain::repository::LibraryRepository;

use super::error::AppError;

/// 蔵書カタログに対するユースケース。
/// 各操作は load → mutate → save を1回の呼び出しで完結させる。
pub struct LibraryService<R: LibraryRepository> {
    repo: R,
}

impl<R: LibraryRepository> LibraryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 蔵書を追加し、割り当てたIDを返す。
    pub fn add_book(&self, title: &str, author: &str, year: i32) -> Result<BookId, AppError> {
        let mut library = self.repo.load()?;
        let id = library.add_book(title, author, year)?;
        self.repo.save(&library)?;
        tracing::info!(%id, title, author, year, "book added");
        Ok(id)
    }

    /// IDで削除する。該当なしでも成功扱い。
    pub fn delete_book(&self, id: BookId) -> Result<(), AppError> {
        let mut library = self.repo.load()?;
        let removed = library.remove_book(id);
        self.repo.save(&library)?;
        tracing::info!(%id, removed, "book deleted");
        Ok(())
    }

    /// フィールド名を検証してから検索する。
    pub fn find_books(&self, query: &str, by: &str) -> Result<Vec<Book>, AppError> {
        let field = by.parse::<SearchField>()?;
        self.find_books_by(query, field)
    }

    pub fn find_books_by(&self, query: &str, field: SearchField) -> Result<Vec<Book>, AppError> {
        let library = self.repo.load()?;
        let found: Vec<Book> = library
            .find_books(query, field)
            .into_iter()
            .cloned()
            .collect();
        tracing::debug!(query, %field, hits = found.len(), "search");
        Ok(found)
    }

    /// 全件を保存順で返す。
    pub fn list_books(&self) -> Result<Vec<Book>, AppError> {
        Ok(self.repo.load()?.into_books())
    }

    /// statusを変更する。該当なしはNotFoundで、保存は行わない。
    pub fn update_status(&self, id: BookId, status: Status) -> Result<(), AppError> {
        let mut library = self.repo.load()?;
        if let Err(e) = library.update_status(id, status) {
            tracing::warn!(%id, "status update skipped: book not found");
            return Err(e.into());
        }
        self.repo.save(&library)?;
        tracing::info!(%id, %status, "status updated");
        Ok(())
    }

    /// 現在のコレクションから次に払い出されるID
    pub fn next_id(&self) -> Result<BookId, AppError> {
        Ok(self.repo.load()?.next_id()?)
    }

    /// 現在のコレクション全体
    pub fn library(&self) -> Result<Library, AppError> {
        Ok(self.repo.load()?)
    }
}
