//! Expense repository. Every query is scoped through the owning trip.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use sea_orm::sea_query::JoinType;
use tracing::info;
use uuid::Uuid;

use crate::entities::{expenses, sea_orm_active_enums::ExpenseCategory, trips};

/// Fields of a new expense.
#[derive(Debug, Clone)]
pub struct ExpenseFields {
    /// Trip the expense belongs to.
    pub trip_id: Uuid,
    /// Category.
    pub category: ExpenseCategory,
    /// Description.
    pub description: Option<String>,
    /// Amount spent.
    pub amount: Decimal,
    /// Day of the expense.
    pub date: NaiveDate,
    /// Who paid.
    pub paid_by: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Uploaded receipt.
    pub receipt_url: Option<String>,
}

/// Partial expense update.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    /// Category.
    pub category: Option<ExpenseCategory>,
    /// Description.
    pub description: Option<String>,
    /// Amount spent.
    pub amount: Option<Decimal>,
    /// Day of the expense.
    pub date: Option<NaiveDate>,
    /// Who paid.
    pub paid_by: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Replacement receipt.
    pub receipt_url: Option<String>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an expense on a trip of the partner. `None` when the trip is
    /// not the partner's.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn create(
        &self,
        partner_id: Uuid,
        fields: ExpenseFields,
    ) -> Result<Option<expenses::Model>, DbErr> {
        if !self.owns_trip(partner_id, fields.trip_id).await? {
            return Ok(None);
        }

        let now = Utc::now().into();
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            trip_id: Set(fields.trip_id),
            category: Set(fields.category),
            description: Set(fields.description),
            amount: Set(fields.amount),
            date: Set(fields.date),
            paid_by: Set(fields.paid_by),
            notes: Set(fields.notes),
            receipt_url: Set(fields.receipt_url),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(expense_id = %expense.id, trip_id = %expense.trip_id, amount = %expense.amount, "Expense recorded");
        Ok(Some(expense))
    }

    /// Finds an expense on a trip of the partner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, partner_id: Uuid, id: Uuid) -> Result<Option<expenses::Model>, DbErr> {
        expenses::Entity::find_by_id(id)
            .join(JoinType::InnerJoin, expenses::Relation::Trips.def())
            .filter(trips::Column::PartnerId.eq(partner_id))
            .one(&self.db)
            .await
    }

    /// Expenses of a trip, latest date first. `None` when the trip is not the
    /// partner's.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_trip(
        &self,
        partner_id: Uuid,
        trip_id: Uuid,
    ) -> Result<Option<Vec<expenses::Model>>, DbErr> {
        if !self.owns_trip(partner_id, trip_id).await? {
            return Ok(None);
        }

        expenses::Entity::find()
            .filter(expenses::Column::TripId.eq(trip_id))
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map(Some)
    }

    /// Applies a patch. Returns the updated row and the receipt URL it
    /// replaced, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update(
        &self,
        partner_id: Uuid,
        id: Uuid,
        patch: ExpensePatch,
    ) -> Result<Option<(expenses::Model, Option<String>)>, DbErr> {
        let Some(expense) = self.find(partner_id, id).await? else {
            return Ok(None);
        };
        let previous_receipt = expense.receipt_url.clone();

        let mut active = expense.into_active_model();
        if let Some(category) = patch.category {
            active.category = Set(category);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(amount) = patch.amount {
            active.amount = Set(amount);
        }
        if let Some(date) = patch.date {
            active.date = Set(date);
        }
        if let Some(paid_by) = patch.paid_by {
            active.paid_by = Set(Some(paid_by));
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }
        let replaced = match patch.receipt_url {
            Some(url) => {
                active.receipt_url = Set(Some(url));
                previous_receipt
            }
            None => None,
        };
        active.updated_at = Set(Utc::now().into());

        let expense = active.update(&self.db).await?;
        Ok(Some((expense, replaced)))
    }

    /// Deletes an expense and returns the removed row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, partner_id: Uuid, id: Uuid) -> Result<Option<expenses::Model>, DbErr> {
        let Some(expense) = self.find(partner_id, id).await? else {
            return Ok(None);
        };
        expense.clone().delete(&self.db).await?;

        info!(expense_id = %id, "Expense deleted");
        Ok(Some(expense))
    }

    async fn owns_trip(&self, partner_id: Uuid, trip_id: Uuid) -> Result<bool, DbErr> {
        let count = trips::Entity::find_by_id(trip_id)
            .filter(trips::Column::PartnerId.eq(partner_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}
