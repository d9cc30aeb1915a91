//! Key/value platform settings.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::system_settings;

/// Setting that puts the platform in maintenance mode when `"true"`.
pub const MAINTENANCE_MODE_KEY: &str = "maintenance_mode";

/// System setting repository.
#[derive(Debug, Clone)]
pub struct SystemSettingRepository {
    db: DatabaseConnection,
}

impl SystemSettingRepository {
    /// Creates a new system setting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads a setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, key: &str) -> Result<Option<system_settings::Model>, DbErr> {
        system_settings::Entity::find()
            .filter(system_settings::Column::Key.eq(key))
            .one(&self.db)
            .await
    }

    /// Inserts or overwrites a setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set(
        &self,
        key: &str,
        value: String,
        description: Option<String>,
    ) -> Result<system_settings::Model, DbErr> {
        let now = Utc::now().into();
        match self.get(key).await? {
            Some(existing) => {
                let mut active = existing.into_active_model();
                active.value = Set(value);
                if description.is_some() {
                    active.description = Set(description);
                }
                active.updated_at = Set(now);
                active.update(&self.db).await
            }
            None => {
                system_settings::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    key: Set(key.to_string()),
                    value: Set(value),
                    description: Set(description),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await
            }
        }
    }

    /// Whether maintenance mode is on.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn maintenance_enabled(&self) -> Result<bool, DbErr> {
        Ok(self
            .get(MAINTENANCE_MODE_KEY)
            .await?
            .is_some_and(|setting| setting.value == "true"))
    }

    /// Turns maintenance mode on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set_maintenance(&self, enabled: bool) -> Result<bool, DbErr> {
        self.set(
            MAINTENANCE_MODE_KEY,
            enabled.to_string(),
            Some("Rejects partner traffic while enabled".to_string()),
        )
        .await?;

        info!(enabled, "Maintenance mode changed");
        Ok(enabled)
    }
}
