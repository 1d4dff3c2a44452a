//! Expense business logic - Creating, editing, reordering and deleting the
//! cost lines of an estimate.
//!
//! Every mutation runs in one transaction that also maintains the dense
//! `order` column (see [`crate::core::ordering`]) and refreshes the parent
//! estimate's `updated_at`. If any step fails the transaction is dropped and
//! nothing changes.

use crate::{
    core::{
        estimate::{find_owned, require_owner, touch_estimate, validate_name},
        ordering,
    },
    entities::{Expense, expense},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// A line to add to an estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// Name of the expense
    pub name: String,
    /// Annual cost in dollars
    pub cost: f64,
}

/// New values for an existing line. The line keeps its position.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseUpdate {
    /// New name
    pub name: String,
    /// New annual cost in dollars
    pub cost: f64,
}

fn validate_cost(cost: f64) -> Result<f64> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(Error::InvalidAmount { amount: cost });
    }
    Ok(cost)
}

/// Fetches an expense whose estimate belongs to `owner_id`.
async fn find_owned_expense<C>(db: &C, owner_id: &str, expense_id: i64) -> Result<expense::Model>
where
    C: ConnectionTrait,
{
    let line = Expense::find_by_id(expense_id)
        .one(db)
        .await?
        .ok_or(Error::ExpenseNotFound { id: expense_id })?;

    match find_owned(db, owner_id, line.estimate_id).await {
        Ok(_) => Ok(line),
        Err(Error::EstimateNotFound { .. }) => Err(Error::ExpenseNotFound { id: expense_id }),
        Err(e) => Err(e),
    }
}

/// Inserts lines at their alphabetical positions and touches the estimate.
/// The caller provides the transaction and has already checked ownership.
pub(crate) async fn insert_lines<C>(
    db: &C,
    estimate_id: i64,
    lines: Vec<NewExpense>,
) -> Result<Vec<expense::Model>>
where
    C: ConnectionTrait,
{
    let mut created = Vec::with_capacity(lines.len());
    for line in lines {
        let name = validate_name(&line.name)?;
        let cost = validate_cost(line.cost)?;

        let order = ordering::make_room_for(db, estimate_id, &name).await?;
        let model = expense::ActiveModel {
            estimate_id: Set(estimate_id),
            name: Set(name),
            cost: Set(cost),
            order: Set(order),
            ..Default::default()
        }
        .insert(db)
        .await?;
        created.push(model);
    }

    touch_estimate(db, estimate_id).await?;
    Ok(created)
}

/// Adds one line to an estimate at its alphabetical position.
///
/// # Errors
/// Returns an error if:
/// - No owner is signed in, or the estimate is not theirs
/// - The name is empty or the cost is negative or not finite
/// - The database operation fails
pub async fn create_expense(
    db: &DatabaseConnection,
    owner: Option<&str>,
    estimate_id: i64,
    line: NewExpense,
) -> Result<expense::Model> {
    let mut created = create_expenses(db, owner, estimate_id, vec![line]).await?;
    created.pop().ok_or_else(|| Error::Validation {
        message: "No expense was created".to_string(),
    })
}

/// Adds several lines to an estimate in one transaction.
///
/// Lines are inserted one after another, each at its alphabetical position
/// among the lines already present.
#[instrument(skip(db, lines), fields(count = lines.len()))]
pub async fn create_expenses(
    db: &DatabaseConnection,
    owner: Option<&str>,
    estimate_id: i64,
    lines: Vec<NewExpense>,
) -> Result<Vec<expense::Model>> {
    let owner_id = require_owner(owner)?;
    let txn = db.begin().await?;

    find_owned(&txn, owner_id, estimate_id).await?;
    let created = insert_lines(&txn, estimate_id, lines).await?;

    txn.commit().await?;
    info!(estimate_id, "Added {} expense line(s)", created.len());
    Ok(created)
}

/// Changes the name and cost of a line in place.
///
/// The parent estimate is resolved from the line itself.
///
/// # Errors
/// Returns an error if the input is invalid, the line does not exist or is
/// not the owner's, or the update fails.
pub async fn update_expense(
    db: &DatabaseConnection,
    owner: Option<&str>,
    expense_id: i64,
    update: ExpenseUpdate,
) -> Result<expense::Model> {
    let owner_id = require_owner(owner)?;
    let name = validate_name(&update.name)?;
    let cost = validate_cost(update.cost)?;

    let txn = db.begin().await?;
    let line = find_owned_expense(&txn, owner_id, expense_id).await?;
    let estimate_id = line.estimate_id;

    let mut active: expense::ActiveModel = line.into();
    active.name = Set(name);
    active.cost = Set(cost);
    let updated = active.update(&txn).await?;
    touch_estimate(&txn, estimate_id).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Deletes one line and closes the gap it leaves in the order.
#[instrument(skip(db))]
pub async fn delete_expense(
    db: &DatabaseConnection,
    owner: Option<&str>,
    expense_id: i64,
) -> Result<()> {
    let owner_id = require_owner(owner)?;
    let txn = db.begin().await?;

    let line = find_owned_expense(&txn, owner_id, expense_id).await?;
    let (estimate_id, order) = (line.estimate_id, line.order);
    line.delete(&txn).await?;
    ordering::close_gap(&txn, estimate_id, order).await?;
    touch_estimate(&txn, estimate_id).await?;

    txn.commit().await?;
    info!(expense_id, estimate_id, "Deleted expense");
    Ok(())
}

/// Deletes every line of an estimate and returns how many were removed.
#[instrument(skip(db))]
pub async fn delete_all_expenses(
    db: &DatabaseConnection,
    owner: Option<&str>,
    estimate_id: i64,
) -> Result<u64> {
    let owner_id = require_owner(owner)?;
    let txn = db.begin().await?;

    find_owned(&txn, owner_id, estimate_id).await?;
    let removed = Expense::delete_many()
        .filter(expense::Column::EstimateId.eq(estimate_id))
        .exec(&txn)
        .await?
        .rows_affected;
    touch_estimate(&txn, estimate_id).await?;

    txn.commit().await?;
    info!(estimate_id, removed, "Deleted all expenses");
    Ok(removed)
}

/// Lists the lines of an estimate in display order.
pub async fn list_expenses(
    db: &DatabaseConnection,
    owner: Option<&str>,
    estimate_id: i64,
) -> Result<Vec<expense::Model>> {
    let owner_id = require_owner(owner)?;
    find_owned(db, owner_id, estimate_id).await?;
    ordering::expenses_in_order(db, estimate_id).await
}

/// Moves a line from `expected_old_order` to `new_order` atomically.
///
/// The move is rejected, leaving everything as it was, when the line is no
/// longer at `expected_old_order` (another session moved it first) or when
/// `new_order` is outside `0..N`. Callers should re-fetch the list after an
/// `Ordering` error.
///
/// # Errors
/// Returns `Ordering` if the move is rejected or the store fails while
/// moving; `ExpenseNotFound`/`Unauthenticated` for ownership problems.
#[instrument(skip(db))]
pub async fn reorder_expense(
    db: &DatabaseConnection,
    owner: Option<&str>,
    expense_id: i64,
    expected_old_order: i32,
    new_order: i32,
) -> Result<()> {
    let owner_id = require_owner(owner)?;
    let txn = db.begin().await.map_err(reorder_failed)?;

    let line = find_owned_expense(&txn, owner_id, expense_id)
        .await
        .map_err(reorder_failed)?;
    if line.order != expected_old_order {
        warn!(
            expense_id,
            expected_old_order,
            actual = line.order,
            "Stale reorder request"
        );
        return Err(Error::Ordering {
            message: format!(
                "expense {expense_id} is at position {}, not {expected_old_order}",
                line.order
            ),
        });
    }

    let count = Expense::find()
        .filter(expense::Column::EstimateId.eq(line.estimate_id))
        .count(&txn)
        .await
        .map_err(reorder_failed)?;
    let in_range = u64::try_from(new_order).is_ok_and(|position| position < count);
    if !in_range {
        return Err(Error::Ordering {
            message: format!("position {new_order} is outside 0..{count}"),
        });
    }

    ordering::move_expense(&txn, &line, new_order)
        .await
        .map_err(reorder_failed)?;
    touch_estimate(&txn, line.estimate_id)
        .await
        .map_err(reorder_failed)?;
    txn.commit().await.map_err(reorder_failed)?;

    info!(expense_id, expected_old_order, new_order, "Reordered expense");
    Ok(())
}

/// Renumbers the lines of an estimate to `0..N`, keeping their relative
/// order. Returns the number of lines that moved.
pub async fn repair_expense_order(
    db: &DatabaseConnection,
    owner: Option<&str>,
    estimate_id: i64,
) -> Result<u64> {
    let owner_id = require_owner(owner)?;
    let txn = db.begin().await?;

    find_owned(&txn, owner_id, estimate_id).await?;
    let repaired = ordering::repair_order(&txn, estimate_id).await?;
    if repaired > 0 {
        touch_estimate(&txn, estimate_id).await?;
        warn!(estimate_id, repaired, "Repaired expense order");
    }

    txn.commit().await?;
    Ok(repaired)
}

fn reorder_failed<E: Into<Error>>(error: E) -> Error {
    match error.into() {
        Error::Database(e) => Error::Ordering {
            message: e.to_string(),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::ordering::is_dense;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn line(name: &str, cost: f64) -> NewExpense {
        NewExpense {
            name: name.to_string(),
            cost,
        }
    }

    async fn names(db: &DatabaseConnection, estimate_id: i64) -> Result<Vec<String>> {
        Ok(list_expenses(db, Some(TEST_OWNER), estimate_id)
            .await?
            .into_iter()
            .map(|e| e.name)
            .collect())
    }

    async fn assert_dense(db: &DatabaseConnection, estimate_id: i64) -> Result<()> {
        let orders: Vec<i32> = list_expenses(db, Some(TEST_OWNER), estimate_id)
            .await?
            .iter()
            .map(|e| e.order)
            .collect();
        assert!(is_dense(&orders), "orders not dense: {orders:?}");
        Ok(())
    }

    async fn order_of(db: &DatabaseConnection, estimate_id: i64, expense_id: i64) -> Result<i32> {
        Ok(list_expenses(db, Some(TEST_OWNER), estimate_id)
            .await?
            .iter()
            .find(|e| e.id == expense_id)
            .unwrap()
            .order)
    }

    async fn touched_at(db: &DatabaseConnection, estimate_id: i64) -> Result<DateTimeUtc> {
        // Keep successive timestamps apart
        std::thread::sleep(std::time::Duration::from_millis(5));
        let header = crate::core::estimate::get_estimate(db, Some(TEST_OWNER), estimate_id).await?;
        Ok(header.updated_at)
    }

    #[tokio::test]
    async fn test_create_expense_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_expense(&db, None, 1, line("Food", 10.0)).await;
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated));

        let result = update_expense(
            &db,
            Some(TEST_OWNER),
            1,
            ExpenseUpdate {
                name: String::new(),
                cost: 10.0,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = update_expense(
            &db,
            Some(TEST_OWNER),
            1,
            ExpenseUpdate {
                name: "Food".to_string(),
                cost: -5.0,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount } if amount == -5.0
        ));

        let result = update_expense(
            &db,
            Some(TEST_OWNER),
            1,
            ExpenseUpdate {
                name: "Food".to_string(),
                cost: f64::NAN,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_batch_is_rolled_back() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;

        let result = create_expenses(
            &db,
            Some(TEST_OWNER),
            estimate.id,
            vec![line("Food", 300.0), line("   ", 10.0)],
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(names(&db, estimate.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_alphabetical_insertion() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        create_expenses(
            &db,
            Some(TEST_OWNER),
            estimate.id,
            vec![line("Food", 300.0), line("Litter", 100.0)],
        )
        .await?;

        let created =
            create_expense(&db, Some(TEST_OWNER), estimate.id, line("Aardvark toy", 12.0)).await?;
        assert_eq!(created.order, 0);

        let lines = list_expenses(&db, Some(TEST_OWNER), estimate.id).await?;
        let pairs: Vec<(&str, i32)> = lines.iter().map(|e| (e.name.as_str(), e.order)).collect();
        assert_eq!(pairs, vec![("Aardvark toy", 0), ("Food", 1), ("Litter", 2)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_touches_estimate() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;

        create_expense(&db, Some(TEST_OWNER), estimate.id, line("Food", 300.0)).await?;

        let touched = crate::core::estimate::get_estimate(&db, Some(TEST_OWNER), estimate.id).await?;
        assert!(touched.updated_at > estimate.updated_at);
        assert_eq!(touched.created_at, estimate.created_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_every_mutation_touches_estimate() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        let food = create_test_expense(&db, estimate.id, "Food", 300.0).await?;
        let litter = create_test_expense(&db, estimate.id, "Litter", 100.0).await?;

        let before = touched_at(&db, estimate.id).await?;
        update_expense(
            &db,
            Some(TEST_OWNER),
            food.id,
            ExpenseUpdate {
                name: "Food".to_string(),
                cost: 350.0,
            },
        )
        .await?;
        let after_update = touched_at(&db, estimate.id).await?;
        assert!(after_update > before, "update_expense did not touch");

        reorder_expense(&db, Some(TEST_OWNER), litter.id, 1, 0).await?;
        let after_reorder = touched_at(&db, estimate.id).await?;
        assert!(after_reorder > after_update, "reorder_expense did not touch");

        delete_expense(&db, Some(TEST_OWNER), litter.id).await?;
        let after_delete = touched_at(&db, estimate.id).await?;
        assert!(after_delete > after_reorder, "delete_expense did not touch");

        delete_all_expenses(&db, Some(TEST_OWNER), estimate.id).await?;
        let after_clear = touched_at(&db, estimate.id).await?;
        assert!(after_clear > after_delete, "delete_all_expenses did not touch");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_in_foreign_estimate() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;

        let result = create_expense(&db, Some("intruder"), estimate.id, line("Food", 1.0)).await;
        assert!(matches!(result, Err(Error::EstimateNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_expense_keeps_position() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        create_test_expense(&db, estimate.id, "Food", 300.0).await?;
        let litter = create_test_expense(&db, estimate.id, "Litter", 100.0).await?;

        let updated = update_expense(
            &db,
            Some(TEST_OWNER),
            litter.id,
            ExpenseUpdate {
                name: "Aardvark litter".to_string(),
                cost: 120.0,
            },
        )
        .await?;
        assert_eq!(updated.name, "Aardvark litter");
        assert_eq!(updated.cost, 120.0);
        assert_eq!(updated.order, litter.order);

        assert_eq!(names(&db, estimate.id).await?, vec!["Food", "Aardvark litter"]);

        let result = update_expense(
            &db,
            Some("intruder"),
            litter.id,
            ExpenseUpdate {
                name: "Hacked".to_string(),
                cost: 0.0,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::ExpenseNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_expense_closes_gap() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        create_test_expense(&db, estimate.id, "Food", 300.0).await?;
        let litter = create_test_expense(&db, estimate.id, "Litter", 100.0).await?;
        create_test_expense(&db, estimate.id, "Toys", 40.0).await?;

        delete_expense(&db, Some(TEST_OWNER), litter.id).await?;

        assert_eq!(names(&db, estimate.id).await?, vec!["Food", "Toys"]);
        assert_dense(&db, estimate.id).await?;

        let result = delete_expense(&db, Some(TEST_OWNER), litter.id).await;
        assert!(matches!(result, Err(Error::ExpenseNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_all_expenses() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        create_test_expense(&db, estimate.id, "Food", 300.0).await?;
        create_test_expense(&db, estimate.id, "Litter", 100.0).await?;

        let removed = delete_all_expenses(&db, Some(TEST_OWNER), estimate.id).await?;
        assert_eq!(removed, 2);
        assert!(names(&db, estimate.id).await?.is_empty());

        // The estimate itself is still there
        crate::core::estimate::get_estimate(&db, Some(TEST_OWNER), estimate.id).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_last_to_first() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        create_test_expense(&db, estimate.id, "A", 1.0).await?;
        create_test_expense(&db, estimate.id, "B", 2.0).await?;
        let c = create_test_expense(&db, estimate.id, "C", 3.0).await?;
        assert_eq!(c.order, 2);

        reorder_expense(&db, Some(TEST_OWNER), c.id, 2, 0).await?;

        let lines = list_expenses(&db, Some(TEST_OWNER), estimate.id).await?;
        let pairs: Vec<(&str, i32)> = lines.iter().map(|e| (e.name.as_str(), e.order)).collect();
        assert_eq!(pairs, vec![("C", 0), ("A", 1), ("B", 2)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_store_failure_is_ordering_error() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_errors([sea_orm::DbErr::Custom("disk I/O error".to_string())])
            .into_connection();

        let result = reorder_expense(&db, Some(TEST_OWNER), 1, 0, 1).await;
        assert!(matches!(result, Err(Error::Ordering { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_unknown_expense_is_not_found() -> Result<()> {
        let (db, _estimate) = setup_with_estimate().await?;

        let result = reorder_expense(&db, Some(TEST_OWNER), 999, 0, 0).await;
        assert!(matches!(result, Err(Error::ExpenseNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_rejections_leave_state_intact() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        let a = create_test_expense(&db, estimate.id, "A", 1.0).await?;
        create_test_expense(&db, estimate.id, "B", 2.0).await?;

        // Stale expected order
        let result = reorder_expense(&db, Some(TEST_OWNER), a.id, 1, 0).await;
        assert!(matches!(result, Err(Error::Ordering { .. })));

        // Out of range targets
        let result = reorder_expense(&db, Some(TEST_OWNER), a.id, 0, 2).await;
        assert!(matches!(result, Err(Error::Ordering { .. })));
        let result = reorder_expense(&db, Some(TEST_OWNER), a.id, 0, -1).await;
        assert!(matches!(result, Err(Error::Ordering { .. })));

        // Someone else's line
        let result = reorder_expense(&db, Some("intruder"), a.id, 0, 1).await;
        assert!(matches!(result, Err(Error::ExpenseNotFound { .. })));

        assert_eq!(names(&db, estimate.id).await?, vec!["A", "B"]);
        assert_dense(&db, estimate.id).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_order_invariant_over_mixed_operations() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        let owner = Some(TEST_OWNER);

        let created = create_expenses(
            &db,
            owner,
            estimate.id,
            vec![
                line("Vet", 200.0),
                line("Food", 300.0),
                line("litter", 100.0),
                line("Toys", 40.0),
            ],
        )
        .await?;
        assert_eq!(names(&db, estimate.id).await?, vec!["Food", "litter", "Toys", "Vet"]);
        assert_dense(&db, estimate.id).await?;

        // Vet to the top
        let vet = &created[0];
        let vet_order = order_of(&db, estimate.id, vet.id).await?;
        reorder_expense(&db, owner, vet.id, vet_order, 0).await?;
        assert_eq!(names(&db, estimate.id).await?, vec!["Vet", "Food", "litter", "Toys"]);

        // Drop Food and add Grooming, which lands above Vet
        delete_expense(&db, owner, created[1].id).await?;
        create_expense(&db, owner, estimate.id, line("Grooming", 60.0)).await?;
        assert_eq!(
            names(&db, estimate.id).await?,
            vec!["Grooming", "Vet", "litter", "Toys"]
        );
        assert_dense(&db, estimate.id).await?;

        // Vet to the bottom
        let vet_order = order_of(&db, estimate.id, vet.id).await?;
        assert_eq!(vet_order, 1);
        reorder_expense(&db, owner, vet.id, vet_order, 3).await?;
        assert_eq!(
            names(&db, estimate.id).await?,
            vec!["Grooming", "litter", "Toys", "Vet"]
        );
        assert_dense(&db, estimate.id).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_repair_expense_order() -> Result<()> {
        let (db, estimate) = setup_with_estimate().await?;
        let a = create_test_expense(&db, estimate.id, "A", 1.0).await?;
        create_test_expense(&db, estimate.id, "B", 2.0).await?;

        // Simulate a gap left by older data
        let mut gap: expense::ActiveModel = a.into();
        gap.order = Set(-5);
        gap.update(&db).await?;
        let b = Expense::find()
            .filter(expense::Column::Name.eq("B"))
            .one(&db)
            .await?
            .unwrap();
        let mut gap: expense::ActiveModel = b.into();
        gap.order = Set(9);
        gap.update(&db).await?;

        assert_eq!(repair_expense_order(&db, Some(TEST_OWNER), estimate.id).await?, 2);
        assert_eq!(names(&db, estimate.id).await?, vec!["A", "B"]);
        assert_dense(&db, estimate.id).await?;

        Ok(())
    }
}
