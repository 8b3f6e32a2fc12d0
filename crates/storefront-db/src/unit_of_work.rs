//! # Unit of Work
//!
//! A database transaction handed to the repository calls that must
//! succeed or fail together.
//!
//! ```text
//! let mut uow = db.begin().await?;
//!      │
//!      ├── orders().insert(&mut uow, &order)
//!      ├── orders().insert_item(&mut uow, &item)   ── error? drop uow → ROLLBACK
//!      ├── carts().clear(&mut uow, &cart_id)
//!      ▼
//! uow.commit().await?                              ── COMMIT
//! ```
//!
//! Dropping a `UnitOfWork` without committing rolls it back.

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// An open transaction.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        UnitOfWork { tx }
    }

    /// The connection repository calls execute on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> DbResult<()> {
        debug!("Committing unit of work");
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    pub async fn rollback(self) -> DbResult<()> {
        debug!("Rolling back unit of work");
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}
