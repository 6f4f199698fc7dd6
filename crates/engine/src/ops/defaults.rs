use sea_orm::{DatabaseTransaction, TransactionTrait, prelude::*};

use crate::{
    AppDefaults, EngineError, ResultEngine,
    app_defaults::{self, DEFAULTS_ROW_ID},
};

use super::{Engine, with_tx};

impl Engine {
    pub(super) async fn require_app_defaults(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<AppDefaults> {
        app_defaults::Entity::find_by_id(DEFAULTS_ROW_ID)
            .one(db)
            .await?
            .map(AppDefaults::from)
            .ok_or_else(|| EngineError::KeyNotFound("app defaults not exists".to_string()))
    }

    pub async fn app_defaults(&self) -> ResultEngine<AppDefaults> {
        with_tx!(self, |db_tx| self.require_app_defaults(&db_tx).await)
    }

    /// Seed the defaults row if it is missing and return what is stored.
    ///
    /// An existing row is left untouched, so values changed at runtime survive
    /// restarts.
    pub async fn ensure_app_defaults(&self, seed: AppDefaults) -> ResultEngine<AppDefaults> {
        seed.validate()?;
        with_tx!(self, |db_tx| {
            match app_defaults::Entity::find_by_id(DEFAULTS_ROW_ID)
                .one(&db_tx)
                .await?
            {
                Some(model) => Ok(AppDefaults::from(model)),
                None => {
                    app_defaults::ActiveModel::from(&seed).insert(&db_tx).await?;
                    tracing::info!(
                        max_debt_minor = seed.max_debt_minor,
                        service_charge_bps = seed.service_charge_bps,
                        "seeded app defaults"
                    );
                    Ok(seed)
                }
            }
        })
    }

    pub async fn update_app_defaults(&self, defaults: AppDefaults) -> ResultEngine<AppDefaults> {
        defaults.validate()?;
        with_tx!(self, |db_tx| {
            self.require_app_defaults(&db_tx).await?;
            app_defaults::ActiveModel::from(&defaults)
                .update(&db_tx)
                .await?;
            tracing::info!(
                max_debt_minor = defaults.max_debt_minor,
                service_charge_bps = defaults.service_charge_bps,
                "app defaults updated"
            );
            Ok(defaults)
        })
    }
}
