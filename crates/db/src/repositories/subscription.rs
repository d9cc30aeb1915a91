//! Subscription orders and purchases.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use tripdesk_core::subscription::renewed_expiry;
use uuid::Uuid;

use crate::entities::{
    partners,
    sea_orm_active_enums::{PaymentStatus, PlanType},
    subscription_histories,
};

/// A gateway order awaiting payment.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Buyer.
    pub partner_id: Uuid,
    /// Gateway order id.
    pub order_id: String,
    /// Price in major units.
    pub amount: Decimal,
    /// ISO currency.
    pub currency: String,
}

/// A verified checkout.
#[derive(Debug, Clone)]
pub struct CompletedCheckout {
    /// Gateway order id.
    pub order_id: String,
    /// Gateway payment id.
    pub payment_id: String,
    /// Signature returned by the checkout.
    pub signature: String,
}

/// Subscription repository.
#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
    db: DatabaseConnection,
}

impl SubscriptionRepository {
    /// Creates a new subscription repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a pending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn record_order(&self, order: NewOrder) -> Result<subscription_histories::Model, DbErr> {
        let now = Utc::now().into();
        subscription_histories::ActiveModel {
            id: Set(Uuid::new_v4()),
            partner_id: Set(order.partner_id),
            plan: Set(PlanType::Pro),
            amount: Set(order.amount),
            currency: Set(order.currency),
            order_id: Set(order.order_id),
            payment_id: Set(None),
            signature: Set(None),
            status: Set(PaymentStatus::Pending),
            expiry_date: Set(None),
            metadata: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Upgrades the partner to pro for one more month, enables WhatsApp and
    /// completes the order's history row, all in one transaction. An order
    /// never recorded gets a new completed row at `fallback_amount`.
    ///
    /// # Errors
    ///
    /// Returns an error if the partner is missing or a query fails.
    pub async fn complete_purchase(
        &self,
        partner_id: Uuid,
        checkout: CompletedCheckout,
        fallback_amount: Decimal,
        currency: &str,
        trial_ends_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(partners::Model, subscription_histories::Model), DbErr> {
        let txn = self.db.begin().await?;

        let partner = partners::Entity::find_by_id(partner_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("partner {partner_id}")))?;

        let current = partner.subscription_expires_at.map(|at| at.to_utc());
        let expiry = renewed_expiry(current, trial_ends_at, now);

        let mut active = partner.into_active_model();
        active.plan = Set(PlanType::Pro);
        active.subscription_expires_at = Set(Some(expiry.into()));
        active.is_whatsapp_enabled = Set(true);
        active.updated_at = Set(now.into());
        let partner = active.update(&txn).await?;

        let pending = subscription_histories::Entity::find()
            .filter(subscription_histories::Column::PartnerId.eq(partner_id))
            .filter(subscription_histories::Column::OrderId.eq(checkout.order_id.as_str()))
            .one(&txn)
            .await?;

        let history = match pending {
            Some(row) => {
                let mut active = row.into_active_model();
                active.payment_id = Set(Some(checkout.payment_id));
                active.signature = Set(Some(checkout.signature));
                active.status = Set(PaymentStatus::Completed);
                active.expiry_date = Set(Some(expiry.into()));
                active.updated_at = Set(now.into());
                active.update(&txn).await?
            }
            None => {
                subscription_histories::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    partner_id: Set(partner_id),
                    plan: Set(PlanType::Pro),
                    amount: Set(fallback_amount),
                    currency: Set(currency.to_string()),
                    order_id: Set(checkout.order_id),
                    payment_id: Set(Some(checkout.payment_id)),
                    signature: Set(Some(checkout.signature)),
                    status: Set(PaymentStatus::Completed),
                    expiry_date: Set(Some(expiry.into())),
                    metadata: Set(None),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                }
                .insert(&txn)
                .await?
            }
        };

        txn.commit().await?;

        info!(%partner_id, %expiry, order_id = %history.order_id, "Subscription purchased");
        Ok((partner, history))
    }

    /// Marks an order failed after a bad signature.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn mark_failed(&self, partner_id: Uuid, order_id: &str) -> Result<(), DbErr> {
        let Some(row) = subscription_histories::Entity::find()
            .filter(subscription_histories::Column::PartnerId.eq(partner_id))
            .filter(subscription_histories::Column::OrderId.eq(order_id))
            .filter(subscription_histories::Column::Status.eq(PaymentStatus::Pending))
            .one(&self.db)
            .await?
        else {
            return Ok(());
        };

        let mut active = row.into_active_model();
        active.status = Set(PaymentStatus::Failed);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        warn!(%partner_id, order_id, "Subscription checkout failed verification");
        Ok(())
    }

    /// Purchase history of a partner, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn history(&self, partner_id: Uuid) -> Result<Vec<subscription_histories::Model>, DbErr> {
        subscription_histories::Entity::find()
            .filter(subscription_histories::Column::PartnerId.eq(partner_id))
            .order_by_desc(subscription_histories::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
