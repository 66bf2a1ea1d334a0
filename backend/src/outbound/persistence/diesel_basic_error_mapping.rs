//! Shared Diesel error mapping for photo persistence.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// `NotFound` and query-builder failures map to query errors; a closed
/// connection maps to a connection error.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Map write failures, treating uniqueness and serialisation failures as
/// conflicts with a concurrent writer.
pub fn map_write_diesel_error<E, Q, C, K>(
    error: DieselError,
    query: Q,
    connection: C,
    conflict: K,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
    K: FnOnce(String) -> E,
{
    match &error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let constraint = info.constraint_name().unwrap_or("unique constraint");
            conflict(format!("{constraint} violated"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            conflict("concurrent transaction rejected".to_owned())
        }
        _ => map_basic_diesel_error(error, query, connection),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(String),
        Connection(String),
        Conflict(String),
    }

    fn query(message: &'static str) -> Mapped {
        Mapped::Query(message.to_owned())
    }

    fn connection(message: &'static str) -> Mapped {
        Mapped::Connection(message.to_owned())
    }

    #[rstest]
    fn pool_errors_use_connection_constructor() {
        let mapped = map_basic_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }

    #[rstest]
    #[case::not_found(DieselError::NotFound, Mapped::Query("record not found".to_owned()))]
    #[case::rollback(DieselError::RollbackTransaction, Mapped::Query("database error".to_owned()))]
    fn basic_errors_map_to_query(#[case] error: DieselError, #[case] expected: Mapped) {
        assert_eq!(map_basic_diesel_error(error, query, connection), expected);
    }

    #[rstest]
    fn write_errors_fall_back_to_basic_mapping() {
        let mapped = map_write_diesel_error(DieselError::NotFound, query, connection, |message| {
            Mapped::Conflict(message)
        });
        assert_eq!(mapped, Mapped::Query("record not found".to_owned()));
    }
}
