//! Order maintenance for expense lines.
//!
//! Within one estimate the `order` column is a dense, zero-based sequence that
//! matches the display order. New lines land at their alphabetical position
//! (case-insensitive) among the current lines, deletes close the gap they
//! leave, and a drag-and-drop move shifts the lines in between by exactly one.
//!
//! Every shift is a single set-based `UPDATE`. The functions here take any
//! [`ConnectionTrait`] so the caller can run them inside one transaction
//! together with the insert, delete or move that needs them; none of them
//! commit on their own.

use crate::{
    entities::{Expense, expense},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*, sea_query::Expr};
use tracing::debug;

/// Position at which `name` should be inserted into `existing`, which must be
/// in display order.
///
/// This is the index of the first line whose lower-cased name sorts after the
/// lower-cased new name, or `existing.len()` if there is none.
#[must_use]
pub fn insertion_index<S: AsRef<str>>(existing: &[S], name: &str) -> usize {
    let wanted = name.to_lowercase();
    existing
        .iter()
        .position(|current| current.as_ref().to_lowercase() > wanted)
        .unwrap_or(existing.len())
}

/// Whether `orders` is exactly `{0, ..., len - 1}` in some arrangement.
#[must_use]
pub fn is_dense(orders: &[i32]) -> bool {
    let mut sorted = orders.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, order)| usize::try_from(*order).is_ok_and(|order| order == index))
}

/// Lines of an estimate in display order, ties broken by id.
pub async fn expenses_in_order<C>(db: &C, estimate_id: i64) -> Result<Vec<expense::Model>>
where
    C: ConnectionTrait,
{
    Expense::find()
        .filter(expense::Column::EstimateId.eq(estimate_id))
        .order_by_asc(expense::Column::Order)
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Opens a slot for a new line called `name` and returns its order.
///
/// Every line at or after the alphabetical insertion point moves down by one.
pub async fn make_room_for<C>(db: &C, estimate_id: i64, name: &str) -> Result<i32>
where
    C: ConnectionTrait,
{
    let existing = expenses_in_order(db, estimate_id).await?;
    let names: Vec<&str> = existing.iter().map(|e| e.name.as_str()).collect();
    let order = to_order(insertion_index(&names, name))?;

    let shifted = Expense::update_many()
        .col_expr(expense::Column::Order, Expr::col(expense::Column::Order).add(1))
        .filter(expense::Column::EstimateId.eq(estimate_id))
        .filter(expense::Column::Order.gte(order))
        .exec(db)
        .await?
        .rows_affected;

    debug!(estimate_id, order, shifted, "Made room for '{}'", name);
    Ok(order)
}

/// Closes the gap left by a removed line by moving every later line up by one.
pub async fn close_gap<C>(db: &C, estimate_id: i64, removed_order: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    Expense::update_many()
        .col_expr(expense::Column::Order, Expr::col(expense::Column::Order).sub(1))
        .filter(expense::Column::EstimateId.eq(estimate_id))
        .filter(expense::Column::Order.gt(removed_order))
        .exec(db)
        .await?;
    Ok(())
}

/// Moves `line` to `new_order`, shifting the lines in between by one.
///
/// Moving up shifts `[new_order, old)` down; moving down shifts
/// `(old, new_order]` up. The caller is responsible for range checks.
pub async fn move_expense<C>(db: &C, line: &expense::Model, new_order: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let old_order = line.order;
    if new_order == old_order {
        return Ok(());
    }

    let between = Expense::update_many().filter(expense::Column::EstimateId.eq(line.estimate_id));
    if new_order < old_order {
        between
            .col_expr(expense::Column::Order, Expr::col(expense::Column::Order).add(1))
            .filter(expense::Column::Order.gte(new_order))
            .filter(expense::Column::Order.lt(old_order))
            .exec(db)
            .await?;
    } else {
        between
            .col_expr(expense::Column::Order, Expr::col(expense::Column::Order).sub(1))
            .filter(expense::Column::Order.gt(old_order))
            .filter(expense::Column::Order.lte(new_order))
            .exec(db)
            .await?;
    }

    Expense::update_many()
        .col_expr(expense::Column::Order, Expr::value(new_order))
        .filter(expense::Column::Id.eq(line.id))
        .exec(db)
        .await?;

    debug!(
        expense_id = line.id,
        old_order, new_order, "Moved expense line"
    );
    Ok(())
}

/// Rewrites the orders of an estimate to `0..N`, keeping the current relative
/// order (ties broken by id). Returns the number of rows that changed.
pub async fn repair_order<C>(db: &C, estimate_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let mut repaired = 0;
    for (index, line) in expenses_in_order(db, estimate_id).await?.iter().enumerate() {
        let order = to_order(index)?;
        if line.order != order {
            Expense::update_many()
                .col_expr(expense::Column::Order, Expr::value(order))
                .filter(expense::Column::Id.eq(line.id))
                .exec(db)
                .await?;
            repaired += 1;
        }
    }
    Ok(repaired)
}

fn to_order(index: usize) -> Result<i32> {
    i32::try_from(index).map_err(|_| Error::Ordering {
        message: format!("position {index} is out of range"),
    })
}
