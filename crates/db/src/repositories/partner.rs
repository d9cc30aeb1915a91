//! Partner repository for accounts, verification codes and reset tokens.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{
    partners,
    sea_orm_active_enums::{PartnerStatus, PlanType},
};

/// Fields of a new, unverified partner.
#[derive(Debug, Clone)]
pub struct NewPartner {
    /// Display name.
    pub name: String,
    /// Login email; stored lowercase.
    pub email: String,
    /// Argon2 hash of the password.
    pub password_hash: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Verification code.
    pub otp: String,
    /// When the code stops being accepted.
    pub otp_expires_at: DateTime<Utc>,
}

/// Partner repository.
#[derive(Debug, Clone)]
pub struct PartnerRepository {
    db: DatabaseConnection,
}

impl PartnerRepository {
    /// Creates a new partner repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a partner by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<partners::Model>, DbErr> {
        partners::Entity::find()
            .filter(partners::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await
    }

    /// Finds a partner by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<partners::Model>, DbErr> {
        partners::Entity::find_by_id(id).one(&self.db).await
    }

    /// Inserts an unverified partner, replacing an earlier unverified
    /// registration under the same email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails. A verified account with
    /// the same email surfaces as a unique violation.
    pub async fn register(&self, input: NewPartner) -> Result<partners::Model, DbErr> {
        let email = normalize_email(&input.email);
        let txn = self.db.begin().await?;

        let replaced = partners::Entity::delete_many()
            .filter(partners::Column::Email.eq(email.as_str()))
            .filter(partners::Column::IsVerified.eq(false))
            .exec(&txn)
            .await?
            .rows_affected;

        let now = Utc::now().into();
        let partner = partners::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(email),
            password_hash: Set(input.password_hash),
            phone: Set(input.phone),
            otp: Set(Some(input.otp)),
            otp_expires_at: Set(Some(input.otp_expires_at.into())),
            is_verified: Set(false),
            reset_password_token: Set(None),
            reset_password_expires_at: Set(None),
            status: Set(PartnerStatus::Active),
            plan: Set(PlanType::Free),
            subscription_expires_at: Set(None),
            is_whatsapp_enabled: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(partner_id = %partner.id, replaced, "Partner registered");
        Ok(partner)
    }

    /// Stores a new verification code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set_otp(
        &self,
        partner: partners::Model,
        otp: String,
        expires_at: DateTime<Utc>,
    ) -> Result<partners::Model, DbErr> {
        let mut active = partner.into_active_model();
        active.otp = Set(Some(otp));
        active.otp_expires_at = Set(Some(expires_at.into()));
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await
    }

    /// Marks the partner verified and clears the code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn mark_verified(&self, partner: partners::Model) -> Result<partners::Model, DbErr> {
        let mut active = partner.into_active_model();
        active.is_verified = Set(true);
        active.otp = Set(None);
        active.otp_expires_at = Set(None);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await
    }

    /// Stores the digest of a password reset token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set_reset_token(
        &self,
        partner: partners::Model,
        digest: String,
        expires_at: DateTime<Utc>,
    ) -> Result<partners::Model, DbErr> {
        let mut active = partner.into_active_model();
        active.reset_password_token = Set(Some(digest));
        active.reset_password_expires_at = Set(Some(expires_at.into()));
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await
    }

    /// Drops a pending reset token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn clear_reset_token(&self, partner: partners::Model) -> Result<partners::Model, DbErr> {
        let mut active = partner.into_active_model();
        active.reset_password_token = Set(None);
        active.reset_password_expires_at = Set(None);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await
    }

    /// Finds the partner holding an unexpired reset token digest.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_reset_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<partners::Model>, DbErr> {
        partners::Entity::find()
            .filter(partners::Column::ResetPasswordToken.eq(digest))
            .filter(partners::Column::ResetPasswordExpiresAt.gt(now))
            .one(&self.db)
            .await
    }

    /// Replaces the password hash and clears any reset token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update_password(
        &self,
        partner: partners::Model,
        password_hash: String,
    ) -> Result<partners::Model, DbErr> {
        let mut active = partner.into_active_model();
        active.password_hash = Set(password_hash);
        active.reset_password_token = Set(None);
        active.reset_password_expires_at = Set(None);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await
    }

    /// Sets the account status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: PartnerStatus,
    ) -> Result<Option<partners::Model>, DbErr> {
        let Some(partner) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active = partner.into_active_model();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().into());
        let partner = active.update(&self.db).await?;

        info!(partner_id = %id, ?status, "Partner status updated");
        Ok(Some(partner))
    }
}

/// Emails are compared and stored lowercase.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Owner@Agency.IN "), "owner@agency.in");
    }
}
