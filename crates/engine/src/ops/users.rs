use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Role, User, users,
    util::{hash_password, normalize_required_text, verify_password},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a login. Vendor users must point at an existing vendor; admins
    /// must not point at any.
    pub async fn new_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        vendor_id: Option<Uuid>,
    ) -> ResultEngine<User> {
        let username = normalize_required_text(username, "username")?;
        if password.is_empty() {
            return Err(EngineError::Validation(
                "password must not be empty".to_string(),
            ));
        }
        match (role, vendor_id) {
            (Role::Vendor, None) => {
                return Err(EngineError::Validation(
                    "vendor users require a vendor_id".to_string(),
                ));
            }
            (Role::Admin, Some(_)) => {
                return Err(EngineError::Validation(
                    "admin users cannot belong to a vendor".to_string(),
                ));
            }
            _ => {}
        }
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }
            if let Some(vendor_id) = vendor_id {
                self.require_vendor(&db_tx, vendor_id).await?;
            }

            let model = users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(password_hash),
                role: ActiveValue::Set(role.as_str().to_string()),
                vendor_id: ActiveValue::Set(vendor_id.map(|id| id.to_string())),
            };
            model.insert(&db_tx).await?;

            Ok(User {
                username,
                role,
                vendor_id,
            })
        })
    }

    /// Check credentials. Returns `None` for an unknown user or a wrong
    /// password; the two cases are not distinguished.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<User>> {
        let model = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?;
        let Some(model) = model else {
            return Ok(None);
        };
        let password = password.to_string();
        let hash = model.password.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|err| {
                tracing::error!("password check task failed: {err}");
                EngineError::Persistence("password check failed".to_string())
            })?;
        if !valid {
            return Ok(None);
        }
        User::try_from(model).map(Some)
    }
}
