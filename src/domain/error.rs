use super::model::id::BookId;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("invalid search field: '{0}' (expected title, author or year)")]
    InvalidField(String),

    #[error("invalid status: '{0}' (expected 'в наличии' or 'выдана')")]
    InvalidStatus(String),

    #[error("book not found: {0}")]
    NotFound(BookId),

    #[error("no id left after {0}")]
    IdExhausted(BookId),
}
