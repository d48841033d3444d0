use serde::{Deserialize, Serialize};

use super::BookId;

/// 蔵書 - 1行が1冊の現物に対応する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub genre: String,
    /// 未返却の貸出が存在しない場合のみtrue
    pub available: bool,
}

/// 書籍の派生状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookState {
    /// 貸出可能
    Available,
    /// 貸出中
    CheckedOut,
}

impl Book {
    pub fn state(&self) -> BookState {
        if self.available {
            BookState::Available
        } else {
            BookState::CheckedOut
        }
    }
}

/// 書籍の登録・更新で利用者が指定できる項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub genre: String,
}

impl BookDraft {
    /// 新規登録時の書籍を構築する（登録直後は貸出可能）
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            publication_year: self.publication_year,
            genre: self.genre,
            available: true,
        }
    }

    /// 既存の書籍に上書きする
    ///
    /// availableは貸出ライフサイクルだけが変更するため保持する。
    pub fn apply_to(self, book: &Book) -> Book {
        Book {
            available: book.available,
            ..self.into_book(book.id)
        }
    }
}
