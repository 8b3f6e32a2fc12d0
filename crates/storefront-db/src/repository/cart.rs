//! # Cart Repository
//!
//! Persistence for carts. Items are stored as a JSON array next to the
//! four derived totals, so a cart is read and written as one row.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Anonymous shopper          Signed-in shopper                           │
//! │  ─────────────────          ─────────────────                           │
//! │  carts.user_id IS NULL      carts.user_id = <user>                      │
//! │  looked up by session id    looked up by user id                        │
//! │                                                                         │
//! │  Sign-in: assign_to_user() moves the session cart to the user           │
//! │  Order placed: clear() empties it; the row is never deleted             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::unit_of_work::UnitOfWork;
use storefront_core::{Cart, CartOwner, CartTotals, Money};

macro_rules! select_carts {
    () => {
        r#"
        SELECT
            id, session_cart_id, user_id, items,
            items_price_cents, shipping_price_cents, tax_price_cents, total_price_cents,
            created_at, updated_at
        FROM carts
        "#
    };
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: String,
    session_cart_id: String,
    user_id: Option<String>,
    items: String,
    items_price_cents: i64,
    shipping_price_cents: i64,
    tax_price_cents: i64,
    total_price_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for Cart {
    type Error = DbError;

    fn try_from(row: CartRow) -> DbResult<Self> {
        Ok(Cart {
            items: serde_json::from_str(&row.items)
                .map_err(|e| DbError::corrupt("carts.items", e))?,
            id: row.id,
            session_cart_id: row.session_cart_id,
            user_id: row.user_id,
            totals: CartTotals {
                items_price: Money::from_cents(row.items_price_cents),
                shipping_price: Money::from_cents(row.shipping_price_cents),
                tax_price: Money::from_cents(row.tax_price_cents),
                total_price: Money::from_cents(row.total_price_cents),
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Finds the cart for an owner key.
    pub async fn find(&self, owner: &CartOwner) -> DbResult<Option<Cart>> {
        match owner {
            CartOwner::User(user_id) => self.find_by_user(user_id).await,
            CartOwner::Session(session) => self.find_by_session(session).await,
        }
    }

    /// Finds a signed-in user's cart.
    pub async fn find_by_user(&self, user_id: &str) -> DbResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(concat!(select_carts!(), "WHERE user_id = ?1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Cart::try_from).transpose()
    }

    /// Finds the anonymous cart for a session.
    ///
    /// A session cart that has been claimed by a user is not returned.
    pub async fn find_by_session(&self, session_cart_id: &str) -> DbResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(concat!(
            select_carts!(),
            "WHERE session_cart_id = ?1 AND user_id IS NULL"
        ))
        .bind(session_cart_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Cart::try_from).transpose()
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(concat!(select_carts!(), "WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Cart::try_from).transpose()
    }

    /// Inserts a new cart.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the owner already has a cart
    pub async fn insert(&self, cart: &Cart) -> DbResult<()> {
        debug!(id = %cart.id, user_id = ?cart.user_id, "Inserting cart");

        let items = encode_items(cart)?;

        sqlx::query(
            r#"
            INSERT INTO carts (
                id, session_cart_id, user_id, items,
                items_price_cents, shipping_price_cents, tax_price_cents, total_price_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&cart.id)
        .bind(&cart.session_cart_id)
        .bind(&cart.user_id)
        .bind(items)
        .bind(cart.totals.items_price.cents())
        .bind(cart.totals.shipping_price.cents())
        .bind(cart.totals.tax_price.cents())
        .bind(cart.totals.total_price.cents())
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes items and totals back after a mutation, stamping `updated_at`.
    pub async fn save(&self, cart: &Cart) -> DbResult<()> {
        debug!(id = %cart.id, lines = cart.items.len(), "Saving cart");

        let items = encode_items(cart)?;

        let result = sqlx::query(
            r#"
            UPDATE carts SET
                items = ?2,
                items_price_cents = ?3,
                shipping_price_cents = ?4,
                tax_price_cents = ?5,
                total_price_cents = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&cart.id)
        .bind(items)
        .bind(cart.totals.items_price.cents())
        .bind(cart.totals.shipping_price.cents())
        .bind(cart.totals.tax_price.cents())
        .bind(cart.totals.total_price.cents())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart", &cart.id));
        }
        Ok(())
    }

    /// Empties a cart inside a unit of work: no items, all totals zero.
    pub async fn clear(&self, uow: &mut UnitOfWork, cart_id: &str) -> DbResult<()> {
        debug!(id = %cart_id, "Clearing cart");

        let result = sqlx::query(
            r#"
            UPDATE carts SET
                items = '[]',
                items_price_cents = 0,
                shipping_price_cents = 0,
                tax_price_cents = 0,
                total_price_cents = 0,
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(cart_id)
        .bind(Utc::now())
        .execute(uow.conn())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart", cart_id));
        }
        Ok(())
    }

    /// Hands an anonymous cart to a user.
    ///
    /// Returns `false` when the cart is missing or already owned.
    pub async fn assign_to_user(&self, cart_id: &str, user_id: &str) -> DbResult<bool> {
        debug!(id = %cart_id, user_id = %user_id, "Assigning cart to user");

        let result = sqlx::query(
            "UPDATE carts SET user_id = ?2, updated_at = ?3 WHERE id = ?1 AND user_id IS NULL",
        )
        .bind(cart_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

fn encode_items(cart: &Cart) -> DbResult<String> {
    serde_json::to_string(&cart.items).map_err(|e| DbError::corrupt("carts.items", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, test_db, user};
    use storefront_core::PricingRules;

    #[tokio::test]
    async fn test_round_trip_with_items() {
        let db = test_db().await;
        let rules = PricingRules::default();
        let mut cart = Cart::new("c1", "s1", None, Utc::now());
        cart.add_product(&product("p1", "polo", 2500, 5), "", &rules)
            .unwrap();
        db.carts().insert(&cart).await.unwrap();

        let loaded = db.carts().find_by_session("s1").await.unwrap().unwrap();
        assert_eq!(loaded.items, cart.items);
        assert_eq!(loaded.totals, cart.totals);
    }

    #[tokio::test]
    async fn test_save_bumps_updated_at() {
        let db = test_db().await;
        let rules = PricingRules::default();
        let created = Utc::now() - chrono::Duration::hours(1);
        let mut cart = Cart::new("c1", "s1", None, created);
        db.carts().insert(&cart).await.unwrap();

        cart.add_product(&product("p1", "polo", 2500, 5), "", &rules)
            .unwrap();
        db.carts().save(&cart).await.unwrap();

        let loaded = db.carts().find_by_session("s1").await.unwrap().unwrap();
        assert!(loaded.updated_at > created);
        assert_eq!(loaded.items.len(), 1);
    }

    #[tokio::test]
    async fn test_one_anonymous_cart_per_session() {
        let db = test_db().await;
        db.carts()
            .insert(&Cart::new("c1", "s1", None, Utc::now()))
            .await
            .unwrap();

        let err = db
            .carts()
            .insert(&Cart::new("c2", "s1", None, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_assign_moves_cart_to_user() {
        let db = test_db().await;
        db.users().insert(&user("u1")).await.unwrap();
        db.carts()
            .insert(&Cart::new("c1", "s1", None, Utc::now()))
            .await
            .unwrap();

        assert!(db.carts().assign_to_user("c1", "u1").await.unwrap());
        assert!(db.carts().find_by_session("s1").await.unwrap().is_none());
        let owned = db.carts().find(&CartOwner::User("u1".into())).await.unwrap();
        assert_eq!(owned.map(|c| c.id), Some("c1".to_string()));

        // already owned
        assert!(!db.carts().assign_to_user("c1", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_rolls_back_with_unit_of_work() {
        let db = test_db().await;
        let rules = PricingRules::default();
        let mut cart = Cart::new("c1", "s1", None, Utc::now());
        cart.add_product(&product("p1", "polo", 2500, 5), "", &rules)
            .unwrap();
        db.carts().insert(&cart).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        db.carts().clear(&mut uow, "c1").await.unwrap();
        uow.rollback().await.unwrap();
        assert_eq!(db.carts().get_by_id("c1").await.unwrap().unwrap().items.len(), 1);

        let mut uow = db.begin().await.unwrap();
        db.carts().clear(&mut uow, "c1").await.unwrap();
        uow.commit().await.unwrap();
        let cleared = db.carts().get_by_id("c1").await.unwrap().unwrap();
        assert!(cleared.items.is_empty());
        assert_eq!(cleared.totals, CartTotals::default());
    }
}
