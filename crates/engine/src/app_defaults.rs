//! Platform-wide settings read by the ledger.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// The single row id of the `app_defaults` table.
pub(crate) const DEFAULTS_ROW_ID: i32 = 1;

/// Settings shared by every vendor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDefaults {
    /// Withdrawals are blocked while the owed service charge is at or above
    /// this value.
    pub max_debt_minor: i64,
    /// Platform fee charged on settled sales, in basis points.
    pub service_charge_bps: i64,
}

impl AppDefaults {
    pub fn validate(&self) -> ResultEngine<()> {
        if self.max_debt_minor < 0 {
            return Err(EngineError::Validation(
                "max_debt_minor must be >= 0".to_string(),
            ));
        }
        if !(0..=10_000).contains(&self.service_charge_bps) {
            return Err(EngineError::Validation(
                "service_charge_bps must be between 0 and 10000".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "app_defaults")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub max_debt_minor: i64,
    pub service_charge_bps: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&AppDefaults> for ActiveModel {
    fn from(value: &AppDefaults) -> Self {
        Self {
            id: ActiveValue::Set(DEFAULTS_ROW_ID),
            max_debt_minor: ActiveValue::Set(value.max_debt_minor),
            service_charge_bps: ActiveValue::Set(value.service_charge_bps),
        }
    }
}

impl From<Model> for AppDefaults {
    fn from(model: Model) -> Self {
        Self {
            max_debt_minor: model.max_debt_minor,
            service_charge_bps: model.service_charge_bps,
        }
    }
}
