//! Payout destinations of a vendor.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A bank account a vendor can withdraw to.
///
/// At most one bank account per vendor is flagged as default; withdrawals
/// always go to the default one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    pub is_default: bool,
}

impl BankAccount {
    /// Account number with everything but the last four characters hidden.
    pub fn masked_number(&self) -> String {
        let chars: Vec<char> = self.account_number.chars().collect();
        let visible = chars.len().min(4);
        let hidden = chars.len() - visible;
        let tail: String = chars[hidden..].iter().collect();
        format!("{}{tail}", "*".repeat(hidden))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub vendor_id: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    pub is_default: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Vendors,
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankAccount> for ActiveModel {
    fn from(value: &BankAccount) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            vendor_id: ActiveValue::Set(value.vendor_id.to_string()),
            bank_name: ActiveValue::Set(value.bank_name.clone()),
            account_number: ActiveValue::Set(value.account_number.clone()),
            account_name: ActiveValue::Set(value.account_name.clone()),
            is_default: ActiveValue::Set(value.is_default),
        }
    }
}

impl TryFrom<Model> for BankAccount {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "bank account")?,
            vendor_id: parse_uuid(&model.vendor_id, "vendor")?,
            bank_name: model.bank_name,
            account_number: model.account_number,
            account_name: model.account_name,
            is_default: model.is_default,
        })
    }
}
