//! # User Repository
//!
//! Users are created by the identity provider; checkout only reads them
//! and stores the shopper's saved address and payment preference.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{PaymentMethod, ShippingAddress, User, UserRole};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: UserRole,
    address: Option<String>,
    payment_method: Option<PaymentMethod>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> DbResult<Self> {
        Ok(User {
            address: row
                .address
                .as_deref()
                .map(serde_json::from_str::<ShippingAddress>)
                .transpose()
                .map_err(|e| DbError::corrupt("users.address", e))?,
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            payment_method: row.payment_method,
            created_at: row.created_at,
        })
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, address, payment_method, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Inserts a user.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - email already registered
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(id = %user.id, "Inserting user");

        let address = user
            .address
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DbError::corrupt("users.address", e))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, address, payment_method, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(address)
        .bind(user.payment_method)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Saves the shopper's shipping address.
    pub async fn update_address(&self, id: &str, address: &ShippingAddress) -> DbResult<()> {
        debug!(id = %id, "Updating user address");

        let encoded =
            serde_json::to_string(address).map_err(|e| DbError::corrupt("users.address", e))?;

        let result = sqlx::query("UPDATE users SET address = ?2 WHERE id = ?1")
            .bind(id)
            .bind(encoded)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }
        Ok(())
    }

    /// Saves the shopper's preferred payment method.
    pub async fn update_payment_method(&self, id: &str, method: PaymentMethod) -> DbResult<()> {
        debug!(id = %id, method = %method, "Updating user payment method");

        let result = sqlx::query("UPDATE users SET payment_method = ?2 WHERE id = ?1")
            .bind(id)
            .bind(method)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }
        Ok(())
    }
}
