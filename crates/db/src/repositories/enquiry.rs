//! Enquiry repository.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    ModelTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{enquiries, sea_orm_active_enums::EnquiryStatus};

/// Enquiry fields; on update `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct EnquiryFields {
    /// Prospect name.
    pub name: Option<String>,
    /// Prospect phone.
    pub phone: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Lead temperature.
    pub status: Option<EnquiryStatus>,
    /// Next follow-up.
    pub follow_up_date: Option<NaiveDate>,
}

/// Enquiry repository.
#[derive(Debug, Clone)]
pub struct EnquiryRepository {
    db: DatabaseConnection,
}

impl EnquiryRepository {
    /// Creates a new enquiry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an enquiry; status defaults to warm.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn create(
        &self,
        partner_id: Uuid,
        name: String,
        fields: EnquiryFields,
    ) -> Result<enquiries::Model, DbErr> {
        let now = Utc::now().into();
        enquiries::ActiveModel {
            id: Set(Uuid::new_v4()),
            partner_id: Set(partner_id),
            name: Set(name),
            phone: Set(fields.phone),
            notes: Set(fields.notes),
            status: Set(fields.status.unwrap_or(EnquiryStatus::Warm)),
            follow_up_date: Set(fields.follow_up_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Enquiries of a partner, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, partner_id: Uuid) -> Result<Vec<enquiries::Model>, DbErr> {
        enquiries::Entity::find()
            .filter(enquiries::Column::PartnerId.eq(partner_id))
            .order_by_desc(enquiries::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Finds an enquiry of the partner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, partner_id: Uuid, id: Uuid) -> Result<Option<enquiries::Model>, DbErr> {
        enquiries::Entity::find_by_id(id)
            .filter(enquiries::Column::PartnerId.eq(partner_id))
            .one(&self.db)
            .await
    }

    /// Updates the given fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update(
        &self,
        partner_id: Uuid,
        id: Uuid,
        fields: EnquiryFields,
    ) -> Result<Option<enquiries::Model>, DbErr> {
        let Some(enquiry) = self.find(partner_id, id).await? else {
            return Ok(None);
        };

        let mut active = enquiry.into_active_model();
        if let Some(name) = fields.name {
            active.name = Set(name);
        }
        if let Some(phone) = fields.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(notes) = fields.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(status) = fields.status {
            active.status = Set(status);
        }
        if let Some(date) = fields.follow_up_date {
            active.follow_up_date = Set(Some(date));
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Deletes an enquiry. Returns `false` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, partner_id: Uuid, id: Uuid) -> Result<bool, DbErr> {
        let Some(enquiry) = self.find(partner_id, id).await? else {
            return Ok(false);
        };
        enquiry.delete(&self.db).await?;
        Ok(true)
    }
}
