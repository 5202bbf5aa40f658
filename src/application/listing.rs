use crate::domain::model::book::Book;

pub const EMPTY_LIBRARY: &str = "Library is empty.";
pub const NO_MATCHES: &str = "No books found.";

/// 蔵書1件を1行で表す。
pub fn render_book(book: &Book) -> String {
    format!(
        "id: {} Title: '{}' Author: {}, Year: {}, {}",
        book.id(),
        book.title(),
        book.author(),
        book.year(),
        book.status()
    )
}

/// 蔵書一覧をテキスト化する。空なら `empty_message` を返す。
pub fn render_books(books: &[Book], empty_message: &str) -> String {
    if books.is_empty() {
        return empty_message.to_string();
    }
    let mut buf = String::new();
    for book in books {
        buf.push_str(&render_book(book));
        buf.push('\n');
    }
    buf
}
