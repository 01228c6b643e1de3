use crate::{entities::document_sequence, errors::ServiceError};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use tracing::error;

/// Scope name for the global bidding-number sequence.
///
/// Bidding numbers count across calendar years; only the formatted prefix
/// carries the current year.
pub const BIDDING_SCOPE: &str = "bidding";

/// Scope name for the per-fiscal-year POW sequence.
pub fn pow_scope(fiscal_year: i32) -> String {
    format!("pow-{}", fiscal_year)
}

/// Draws the next value from a named sequence.
///
/// The increment is a single atomic `UPDATE ... SET value = value + 1` issued
/// on the caller's transaction, so two concurrent creators can never observe
/// the same value. The first draw for a scope inserts the row with value 1;
/// losing a concurrent first draw falls back to incrementing the winner's row.
pub(crate) async fn next_value<C: ConnectionTrait>(
    conn: &C,
    scope: &str,
) -> Result<i64, ServiceError> {
    let backend = conn.get_database_backend();

    let update = Query::update()
        .table(document_sequence::Entity)
        .value(
            document_sequence::Column::Value,
            Expr::col(document_sequence::Column::Value).add(1),
        )
        .and_where(Expr::col(document_sequence::Column::Scope).eq(scope))
        .to_owned();

    let result = conn.execute(backend.build(&update)).await.map_err(|e| {
        error!(scope = %scope, error = %e, "Failed to increment document sequence");
        ServiceError::DatabaseError(e)
    })?;

    if result.rows_affected() == 0 {
        let row = document_sequence::ActiveModel {
            scope: Set(scope.to_string()),
            value: Set(1),
        };
        match row.insert(conn).await {
            Ok(_) => return Ok(1),
            // Lost the first-draw race: another writer created the row
            // between our update and insert. Increment the row it left.
            Err(insert_err) => {
                let retry = conn
                    .execute(backend.build(&update))
                    .await
                    .map_err(ServiceError::DatabaseError)?;
                if retry.rows_affected() == 0 {
                    error!(scope = %scope, error = %insert_err, "Failed to seed document sequence");
                    return Err(ServiceError::DatabaseError(insert_err));
                }
            }
        }
    }

    let row = document_sequence::Entity::find_by_id(scope.to_string())
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
        .ok_or_else(|| {
            ServiceError::InternalError(format!("document sequence '{}' vanished mid-draw", scope))
        })?;

    Ok(row.value)
}

/// Formats a POW number: `POW-<fiscalYear>-<seq padded to 3 digits>`.
pub fn format_pow_number(fiscal_year: i32, seq: i64) -> String {
    format!("POW-{}-{:03}", fiscal_year, seq)
}

/// Formats a bidding number: `BID-<calendarYear>-<seq padded to 3 digits>`.
pub fn format_bidding_number(calendar_year: i32, seq: i64) -> String {
    format!("BID-{}-{:03}", calendar_year, seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(2026, 5, "POW-2026-005")]
    #[test_case(2026, 1, "POW-2026-001")]
    #[test_case(2024, 123, "POW-2024-123")]
    #[test_case(2024, 1000, "POW-2024-1000"; "padding does not truncate")]
    fn pow_number_format(year: i32, seq: i64, expected: &str) {
        assert_eq!(format_pow_number(year, seq), expected);
    }

    #[test_case(2026, 7, "BID-2026-007")]
    #[test_case(2025, 42, "BID-2025-042")]
    fn bidding_number_format(year: i32, seq: i64, expected: &str) {
        assert_eq!(format_bidding_number(year, seq), expected);
    }

    #[test]
    fn pow_scope_is_per_fiscal_year() {
        assert_eq!(pow_scope(2026), "pow-2026");
        assert_ne!(pow_scope(2026), pow_scope(2027));
    }

    #[tokio::test]
    async fn concurrent_first_draws_never_collide() {
        use crate::migrator::Migrator;
        use sea_orm::{ConnectOptions, Database, TransactionTrait};
        use sea_orm_migration::MigratorTrait;
        use std::sync::Arc;

        let db_file = tempfile::NamedTempFile::new().unwrap();
        let mut opts = ConnectOptions::new(format!(
            "sqlite://{}?mode=rwc",
            db_file.path().display()
        ));
        opts.max_connections(2).min_connections(2);
        let db = Arc::new(Database::connect(opts).await.unwrap());
        Migrator::up(db.as_ref(), None).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..2 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                let txn = db.begin().await.unwrap();
                let value = next_value(&txn, "fresh-scope").await.unwrap();
                txn.commit().await.unwrap();
                value
            }));
        }

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap());
        }
        values.sort_unstable();
        assert_eq!(values, vec![1, 2]);
    }
}
