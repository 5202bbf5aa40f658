use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use super::book::{Book, Status};
use super::id::BookId;
use crate::domain::error::DomainError;

/// 検索対象フィールド。名前による動的参照の代わりに閉じた列挙で表す。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchField {
    #[default]
    Title,
    Author,
    Year,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [SearchField::Title, SearchField::Author, SearchField::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Author => "author",
            SearchField::Year => "year",
        }
    }

    /// 比較用のテキスト表現。数値は10進表記。
    fn text_of<'a>(&self, book: &'a Book) -> Cow<'a, str> {
        match self {
            SearchField::Title => Cow::Borrowed(book.title()),
            SearchField::Author => Cow::Borrowed(book.author()),
            SearchField::Year => Cow::Owned(book.year().to_string()),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| DomainError::InvalidField(s.to_string()))
    }
}

/// 蔵書コレクション — 集約ルート。挿入順を保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    books: Vec<Book>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// 読み込んだレコード列から構築する。重複IDの検証はしない。
    pub fn from_books(books: Vec<Book>) -> Self {
        Self { books }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn into_books(self) -> Vec<Book> {
        self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// 先頭から走査して最初に一致した1件
    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id() == id)
    }

    /// 空なら1、それ以外は max(id) + 1。maxがu64::MAXならIdExhausted。
    pub fn next_id(&self) -> Result<BookId, DomainError> {
        match self.books.iter().map(Book::id).max() {
            None => Ok(BookId::FIRST),
            Some(max) => max.next().ok_or(DomainError::IdExhausted(max)),
        }
    }

    /// 新しい蔵書を末尾に追加し、割り当てたIDを返す。
    pub fn add_book(
        &mut self,
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
    ) -> Result<BookId, DomainError> {
        let id = self.next_id()?;
        self.books.push(Book::new(id, title, author, year));
        Ok(id)
    }

    /// 一致する全件を削除し、削除件数を返す。該当なしは0（エラーではない）。
    pub fn remove_book(&mut self, id: BookId) -> usize {
        let before = self.books.len();
        self.books.retain(|b| b.id() != id);
        before - self.books.len()
    }

    /// 指定フィールドの部分一致検索（大文字小文字を区別しない）。
    pub fn find_books(&self, query: &str, by: SearchField) -> Vec<&Book> {
        let needle = query.to_lowercase();
        self.books
            .iter()
            .filter(|b| by.text_of(b).to_lowercase().contains(&needle))
            .collect()
    }

    /// 最初に一致した1件のみstatusを変更する。
    pub fn update_status(&mut self, id: BookId, status: Status) -> Result<(), DomainError> {
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id() == id)
            .ok_or(DomainError::NotFound(id))?;
        book.set_status(status);
        Ok(())
    }
}
