use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use super::id::BookId;
use crate::domain::error::DomainError;

/// 貸出状態。ファイル上はロシア語ラベルで保存する。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Available,
    Lent,
}

impl Status {
    /// バックファイルに書かれるラベル
    pub fn label(&self) -> &'static str {
        match self {
            Status::Available => "в наличии",
            Status::Lent => "выдана",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = DomainError;

    /// ネイティブラベルと英語トークンの両方を受け付ける。前後の空白は許さない。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "в наличии" | "available" => Ok(Status::Available),
            "выдана" | "lent" => Ok(Status::Lent),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// 蔵書1件。statusのみLibrary経由で変更される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    year: i32,
    status: Status,
}

impl Book {
    pub fn new(id: BookId, title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            year,
            status: Status::default(),
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// フィールドマップ表現（id, title, author, year, status の順）
    pub fn to_serializable(&self) -> Value {
        json!({
            "id": self.id.get(),
            "title": self.title,
            "author": self.author,
            "year": self.year,
            "status": self.status.label(),
        })
    }

    /// フィールドマップから復元する。キー欠落・型不一致はMalformedRecord。
    /// 未知のキーは無視する。
    pub fn from_serializable(data: &Value) -> Result<Self, DomainError> {
        let map = data
            .as_object()
            .ok_or_else(|| DomainError::MalformedRecord("record is not an object".into()))?;

        let id = required(map, "id")?
            .as_u64()
            .and_then(BookId::new)
            .ok_or_else(|| wrong_type("id", "a positive integer"))?;
        let title = text(map, "title")?;
        let author = text(map, "author")?;
        let year = required(map, "year")?
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| wrong_type("year", "an integer"))?;
        let status = text(map, "status")?
            .parse::<Status>()
            .map_err(|e| DomainError::MalformedRecord(e.to_string()))?;

        Ok(Self {
            id,
            title,
            author,
            year,
            status,
        })
    }
}

fn required<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a Value, DomainError> {
    map.get(key)
        .ok_or_else(|| DomainError::MalformedRecord(format!("missing key `{key}`")))
}

fn text(map: &Map<String, Value>, key: &str) -> Result<String, DomainError> {
    required(map, key)?
        .as_str()
        .map(String::from)
        .ok_or_else(|| wrong_type(key, "text"))
}

fn wrong_type(key: &str, expected: &str) -> DomainError {
    DomainError::MalformedRecord(format!("`{key}` must be {expected}"))
}
