//! Estimate business logic - Owner-scoped management of estimate headers.
//!
//! Every operation takes the caller's owner id as resolved by the identity
//! layer (`None` when nobody is signed in). Estimates that belong to someone
//! else are reported as not found.

use crate::{
    core::{
        breakdown::{self, BreakdownItem, CostInput},
        expense::{self, NewExpense},
    },
    entities::{Estimate, Expense, estimate, expense as expense_entity},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument};

/// Returns the owner id, or `Unauthenticated` if there is none.
///
/// # Errors
/// Returns `Error::Unauthenticated` for `None` or a blank id.
pub fn require_owner(owner: Option<&str>) -> Result<&str> {
    owner
        .filter(|id| !id.trim().is_empty())
        .ok_or(Error::Unauthenticated)
}

/// Fetches an estimate owned by `owner_id`.
pub(crate) async fn find_owned<C>(db: &C, owner_id: &str, estimate_id: i64) -> Result<estimate::Model>
where
    C: ConnectionTrait,
{
    Estimate::find_by_id(estimate_id)
        .filter(estimate::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or(Error::EstimateNotFound { id: estimate_id })
}

/// Refreshes `updated_at` of an estimate.
///
/// # Errors
/// Returns `EstimateNotFound` if the header no longer exists.
pub async fn touch_estimate<C>(db: &C, estimate_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Estimate::update_many()
        .col_expr(
            estimate::Column::UpdatedAt,
            Expr::value(chrono::Utc::now()),
        )
        .filter(estimate::Column::Id.eq(estimate_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::EstimateNotFound { id: estimate_id });
    }
    Ok(())
}

/// Creates a new, empty estimate.
///
/// # Errors
/// Returns an error if:
/// - No owner is signed in
/// - The name is empty or whitespace-only
/// - The database insert fails
pub async fn create_estimate<C>(db: &C, owner: Option<&str>, name: &str) -> Result<estimate::Model>
where
    C: ConnectionTrait,
{
    let owner_id = require_owner(owner)?;
    let name = validate_name(name)?;

    let now = chrono::Utc::now();
    let created = estimate::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        name: Set(name),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(estimate_id = created.id, owner_id, "Created estimate '{}'", created.name);
    Ok(created)
}

/// Retrieves one of the owner's estimates.
pub async fn get_estimate(
    db: &DatabaseConnection,
    owner: Option<&str>,
    estimate_id: i64,
) -> Result<estimate::Model> {
    let owner_id = require_owner(owner)?;
    find_owned(db, owner_id, estimate_id).await
}

/// Lists the owner's estimates, most recently touched first.
pub async fn list_estimates(
    db: &DatabaseConnection,
    owner: Option<&str>,
) -> Result<Vec<estimate::Model>> {
    let owner_id = require_owner(owner)?;
    Estimate::find()
        .filter(estimate::Column::OwnerId.eq(owner_id))
        .order_by_desc(estimate::Column::UpdatedAt)
        .order_by_desc(estimate::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes an estimate together with all of its expenses.
///
/// The expenses go first and both deletes share one transaction, so no
/// orphaned lines can be left behind. Deleting an estimate that has no
/// expenses left is fine.
///
/// # Errors
/// Returns an error if nobody is signed in, the estimate is not the owner's,
/// or a delete fails (in which case nothing is removed).
#[instrument(skip(db))]
pub async fn delete_estimate(
    db: &DatabaseConnection,
    owner: Option<&str>,
    estimate_id: i64,
) -> Result<()> {
    let owner_id = require_owner(owner)?;
    let txn = db.begin().await?;

    let header = find_owned(&txn, owner_id, estimate_id).await?;
    let removed = Expense::delete_many()
        .filter(expense_entity::Column::EstimateId.eq(estimate_id))
        .exec(&txn)
        .await?
        .rows_affected;
    header.delete(&txn).await?;

    txn.commit().await?;
    info!(estimate_id, removed, "Deleted estimate and its expenses");
    Ok(())
}

/// Saves a computed breakdown as a new estimate named after the answers
/// (e.g. "Female Indoor Kitten with Insurance").
///
/// The header and all of its lines are created in one transaction.
#[instrument(skip(db, items), fields(lines = items.len()))]
pub async fn save_breakdown(
    db: &DatabaseConnection,
    owner: Option<&str>,
    input: &CostInput,
    items: &[BreakdownItem],
) -> Result<estimate::Model> {
    let txn = db.begin().await?;

    let header = create_estimate(&txn, owner, &breakdown::estimate_name(input)).await?;
    let lines = items
        .iter()
        .map(|item| NewExpense {
            name: item.name.clone(),
            cost: item.cost,
        })
        .collect();
    expense::insert_lines(&txn, header.id, lines).await?;

    // Re-read so updated_at reflects the inserted lines
    let saved = Estimate::find_by_id(header.id)
        .one(&txn)
        .await?
        .ok_or(Error::EstimateNotFound { id: header.id })?;

    txn.commit().await?;
    Ok(saved)
}

pub(crate) fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            message: "Name cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::breakdown::{LifeStage, Lifestyle, Sex, calculate_breakdown, total_cost};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_require_owner() {
        assert_eq!(require_owner(Some("user1")).unwrap(), "user1");
        assert!(matches!(require_owner(None), Err(Error::Unauthenticated)));
        assert!(matches!(require_owner(Some("  ")), Err(Error::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_create_estimate_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_estimate(&db, None, "My cat").await;
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated));

        let result = create_estimate(&db, Some(TEST_OWNER), "   ").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_get_estimate() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_estimate(&db, Some(TEST_OWNER), "  Minou  ").await?;
        assert_eq!(created.name, "Minou");
        assert_eq!(created.owner_id, TEST_OWNER);
        assert_eq!(created.created_at, created.updated_at);

        let found = get_estimate(&db, Some(TEST_OWNER), created.id).await?;
        assert_eq!(found, created);

        // Someone else cannot see it
        let result = get_estimate(&db, Some("intruder"), created.id).await;
        assert!(matches!(result, Err(Error::EstimateNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_estimates_most_recent_first() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_test_estimate(&db, "First").await?;
        let second = create_test_estimate(&db, "Second").await?;
        create_estimate(&db, Some("someone_else"), "Theirs").await?;

        let listed = list_estimates(&db, Some(TEST_OWNER)).await?;
        let ids: Vec<i64> = listed.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        // Adding a line to the older estimate moves it to the top
        create_test_expense(&db, first.id, "Food", 300.0).await?;
        let listed = list_estimates(&db, Some(TEST_OWNER)).await?;
        assert_eq!(listed[0].id, first.id);
        assert!(listed[0].updated_at >= second.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_touch_missing_estimate_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let result = touch_estimate(&db, 42).await;
        assert!(matches!(result, Err(Error::EstimateNotFound { id: 42 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_estimate_cascades() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        create_test_expense(&db, estimate.id, "Food", 300.0).await?;
        create_test_expense(&db, estimate.id, "Litter", 100.0).await?;

        delete_estimate(&db, Some(TEST_OWNER), estimate.id).await?;

        assert!(Estimate::find_by_id(estimate.id).one(&db).await?.is_none());
        let orphans = Expense::find()
            .filter(expense_entity::Column::EstimateId.eq(estimate.id))
            .all(&db)
            .await?;
        assert!(orphans.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_estimate_after_last_expense() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        let only = create_test_expense(&db, estimate.id, "Food", 300.0).await?;

        expense::delete_expense(&db, Some(TEST_OWNER), only.id).await?;
        assert!(
            expense::list_expenses(&db, Some(TEST_OWNER), estimate.id)
                .await?
                .is_empty()
        );

        delete_estimate(&db, Some(TEST_OWNER), estimate.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_estimate_of_other_owner() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;

        let result = delete_estimate(&db, Some("intruder"), estimate.id).await;
        assert!(matches!(result, Err(Error::EstimateNotFound { .. })));
        assert!(Estimate::find_by_id(estimate.id).one(&db).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_save_breakdown_full_workflow() -> Result<()> {
        let db = setup_rated_db().await?;
        let input = CostInput {
            life_stage: LifeStage::Kitten,
            sex: Sex::Male,
            lifestyle: Lifestyle::Indoor,
            insurance: true,
        };

        let items = calculate_breakdown(&db, &input).await?;
        let saved = save_breakdown(&db, Some(TEST_OWNER), &input, &items).await?;
        assert_eq!(saved.name, "Male Indoor Kitten with Insurance");

        let lines = expense::list_expenses(&db, Some(TEST_OWNER), saved.id).await?;
        let persisted_total: f64 = lines.iter().map(|e| e.cost).sum();
        assert_eq!(persisted_total, total_cost(&items));

        // Lines are stored alphabetically, orders dense
        let names: Vec<&str> = lines.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Food", "Insurance program (basic)", "Litter", "Sterilization"]
        );
        let orders: Vec<i32> = lines.iter().map(|e| e.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);

        Ok(())
    }

    #[tokio::test]
    async fn test_save_breakdown_requires_owner() -> Result<()> {
        let db = setup_rated_db().await?;
        let input = CostInput {
            life_stage: LifeStage::Adult,
            sex: Sex::Female,
            lifestyle: Lifestyle::Indoor,
            insurance: false,
        };
        let items = calculate_breakdown(&db, &input).await?;

        let result = save_breakdown(&db, None, &input, &items).await;
        assert!(matches!(result, Err(Error::Unauthenticated)));
        assert!(Estimate::find().all(&db).await?.is_empty());

        Ok(())
    }
}
