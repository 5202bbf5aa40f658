use std::fmt;

/// 蔵書ID。ライブラリ内で一意な正の整数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookId(u64);

impl BookId {
    /// 最初に払い出されるID
    pub const FIRST: BookId = BookId(1);

    /// 0は無効なIDなのでNoneを返す。
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// 次のID（max + 1 の計算用）。u64::MAXの次は存在しない。
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
