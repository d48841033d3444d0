//! 組み込みの検証ルール
//!
//! 各関数は失敗時に`errors`へ追記する。1フィールドにつき最初の失敗のみ記録する。

use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

use super::{ValidationError, ValidationErrors};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern is a valid regex")
});

/// 空白のみの文字列を拒否する
pub fn required(errors: &mut ValidationErrors, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(ValidationError::with_code(
            field,
            "must not be blank",
            "required",
        ));
        return false;
    }
    true
}

/// 文字数（バイト数ではない）の上限
pub fn max_length(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) -> bool {
    if value.chars().count() > max {
        errors.add(ValidationError::with_code(
            field,
            format!("must be at most {} characters", max),
            "max_length",
        ));
        return false;
    }
    true
}

/// 必須かつ上限付きの文字列
pub fn text(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) -> bool {
    required(errors, field, value) && max_length(errors, field, value, max)
}

/// メールアドレス形式（local@domain.tld）
pub fn email(errors: &mut ValidationErrors, field: &str, value: &str) -> bool {
    if !EMAIL_PATTERN.is_match(value) {
        errors.add(ValidationError::with_code(
            field,
            "must be a valid email address",
            "email",
        ));
        return false;
    }
    true
}

/// 閉区間 [min, max]
pub fn range<T>(errors: &mut ValidationErrors, field: &str, value: T, min: T, max: T) -> bool
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        errors.add(ValidationError::with_code(
            field,
            format!("must be between {} and {}", min, max),
            "range",
        ));
        return false;
    }
    true
}

/// 正の整数（ID参照など）
pub fn positive(errors: &mut ValidationErrors, field: &str, value: i64) -> bool {
    if value <= 0 {
        errors.add(ValidationError::with_code(
            field,
            "must be a positive integer",
            "positive",
        ));
        return false;
    }
    true
}
