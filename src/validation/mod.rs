//! 入力ペイロードの形式検証
//!
//! ストレージには依存しない。APIの各リクエスト型が[`Validate`]を実装し、
//! 抽出時に検証される。

pub mod error;
pub mod rules;

pub use error::{ValidationError, ValidationErrors, ValidationResult};

/// ペイロードの形式を検証する
pub trait Validate {
    /// すべてのフィールドを検証し、失敗したフィールドをまとめて返す
    fn validate(&self) -> ValidationResult<()>;
}
