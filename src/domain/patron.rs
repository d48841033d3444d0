use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PatronId;

/// 利用者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patron {
    pub id: PatronId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub registered_date: NaiveDate,
}

/// 利用者の登録・更新で指定できる項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatronDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl PatronDraft {
    pub fn into_patron(self, id: PatronId, registered_date: NaiveDate) -> Patron {
        Patron {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            registered_date,
        }
    }

    /// 既存の利用者に上書きする（登録日は変更しない）
    pub fn apply_to(self, patron: &Patron) -> Patron {
        self.into_patron(patron.id, patron.registered_date)
    }
}
