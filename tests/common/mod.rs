//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

use book_catalog_mcp::application::service::LibraryService;
use book_catalog_mcp::domain::model::book::{Book, Status};
use book_catalog_mcp::domain::model::id::BookId;
use book_catalog_mcp::domain::model::library::Library;
use book_catalog_mcp::domain::repository::{LibraryRepository, StoreError};

// =============================================================================
// InMemoryRepo — テスト用リポジトリ
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[error("simulated corruption")]
pub struct SimulatedCorruption;

/// ファイルI/O不要のインメモリリポジトリ。save回数を数える。
pub struct InMemoryRepo {
    store: RefCell<Library>,
    saves: Cell<usize>,
    corrupt: Cell<bool>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::with_library(Library::new())
    }

    pub fn with_library(library: Library) -> Self {
        Self {
            store: RefCell::new(library),
            saves: Cell::new(0),
            corrupt: Cell::new(false),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// 以降のloadをCorruptLibraryで失敗させる。
    pub fn corrupt(&self) {
        self.corrupt.set(true);
    }
}

impl LibraryRepository for InMemoryRepo {
    fn load(&self) -> Result<Library, StoreError> {
        if self.corrupt.get() {
            return Err(StoreError::CorruptLibrary {
                path: PathBuf::from("memory"),
                source: Box::new(SimulatedCorruption),
            });
        }
        Ok(self.store.borrow().clone())
    }

    fn save(&self, library: &Library) -> Result<(), StoreError> {
        *self.store.borrow_mut() = library.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn id(n: u64) -> BookId {
    BookId::new(n).unwrap()
}

/// 標準的なテスト用ライブラリ:
/// ```text
/// 1. Alpha   / Ann Archer   / 1999 / в наличии
/// 2. Beta    / Bob Brown    / 2005 / выдана
/// 3. gamma   / Cid Carter   / 1999 / в наличии
/// ```
pub fn standard_library() -> Library {
    Library::from_books(vec![
        Book::new(id(1), "Alpha", "Ann Archer", 1999),
        Book::new(id(2), "Beta", "Bob Brown", 2005).with_status(Status::Lent),
        Book::new(id(3), "gamma", "Cid Carter", 1999),
    ])
}

pub fn service_with(library: Library) -> LibraryService<InMemoryRepo> {
    LibraryService::new(InMemoryRepo::with_library(library))
}

pub fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.title()).collect()
}

// =============================================================================
// Assertion helpers
// =============================================================================

/// 結果がErrで、メッセージに指定文字列を含むことをassert。
pub fn assert_error_contains<T: std::fmt::Debug>(
    result: Result<T, impl std::fmt::Display>,
    expected: &str,
) {
    match result {
        Err(e) => {
            let msg = e.to_string();
            assert!(
                msg.contains(expected),
                "Expected error containing '{expected}', got: '{msg}'"
            );
        }
        Ok(v) => panic!("Expected error containing '{expected}', got Ok({v:?})"),
    }
}
