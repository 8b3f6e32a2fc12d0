//! # Order Repository
//!
//! Database operations for orders and order items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. PLACE (one unit of work)                                           │
//! │     └── insert()        → Order { is_paid: false }                     │
//! │     └── insert_item()   → OrderItem (snapshot of each cart line)       │
//! │                                                                         │
//! │  2. INITIATE PAYMENT                                                   │
//! │     └── set_pending_payment() → payment_result { id: <gateway ref> }   │
//! │                                                                         │
//! │  3. CONFIRM PAYMENT (one unit of work)                                 │
//! │     └── mark_paid()     → is_paid = 1, guarded by is_paid = 0          │
//! │                                                                         │
//! │  is_paid never goes back to 0.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::unit_of_work::UnitOfWork;
use storefront_core::{Money, Order, OrderItem, PaymentMethod, PaymentResult};

macro_rules! select_orders {
    () => {
        r#"
        SELECT
            id, user_id, shipping_address, payment_method,
            items_price_cents, shipping_price_cents, tax_price_cents, total_price_cents,
            is_paid, paid_at, is_delivered, delivered_at, payment_result, created_at
        FROM orders
        "#
    };
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    shipping_address: String,
    payment_method: PaymentMethod,
    items_price_cents: i64,
    shipping_price_cents: i64,
    tax_price_cents: i64,
    total_price_cents: i64,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    payment_result: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        let payment_result = row
            .payment_result
            .as_deref()
            .map(serde_json::from_str::<PaymentResult>)
            .transpose()
            .map_err(|e| DbError::corrupt("orders.payment_result", e))?;

        Ok(Order {
            shipping_address: serde_json::from_str(&row.shipping_address)
                .map_err(|e| DbError::corrupt("orders.shipping_address", e))?,
            id: row.id,
            user_id: row.user_id,
            payment_method: row.payment_method,
            items_price: Money::from_cents(row.items_price_cents),
            shipping_price: Money::from_cents(row.shipping_price_cents),
            tax_price: Money::from_cents(row.tax_price_cents),
            total_price: Money::from_cents(row.total_price_cents),
            is_paid: row.is_paid,
            paid_at: row.paid_at,
            is_delivered: row.is_delivered,
            delivered_at: row.delivered_at,
            payment_result,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: String,
    product_id: String,
    name: String,
    slug: String,
    image: String,
    price_cents: i64,
    quantity: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            order_id: row.order_id,
            product_id: row.product_id,
            name: row.name,
            slug: row.slug,
            image: row.image,
            price: Money::from_cents(row.price_cents),
            quantity: row.quantity,
        }
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(concat!(select_orders!(), "WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Gets all items for an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT order_id, product_id, name, slug, image, price_cents, quantity
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// Gets all items for an order, reading through a unit of work.
    pub async fn get_items_in(
        &self,
        uow: &mut UnitOfWork,
        order_id: &str,
    ) -> DbResult<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT order_id, product_id, name, slug, image, price_cents, quantity
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(uow.conn())
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// Inserts an order header inside a unit of work.
    pub async fn insert(&self, uow: &mut UnitOfWork, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, user_id = %order.user_id, "Inserting order");

        let address = serde_json::to_string(&order.shipping_address)
            .map_err(|e| DbError::corrupt("orders.shipping_address", e))?;
        let payment_result = encode_payment_result(order.payment_result.as_ref())?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, shipping_address, payment_method,
                items_price_cents, shipping_price_cents, tax_price_cents, total_price_cents,
                is_paid, paid_at, is_delivered, delivered_at, payment_result, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(address)
        .bind(order.payment_method)
        .bind(order.items_price.cents())
        .bind(order.shipping_price.cents())
        .bind(order.tax_price.cents())
        .bind(order.total_price.cents())
        .bind(order.is_paid)
        .bind(order.paid_at)
        .bind(order.is_delivered)
        .bind(order.delivered_at)
        .bind(payment_result)
        .bind(order.created_at)
        .execute(uow.conn())
        .await?;

        Ok(())
    }

    /// Inserts one order item inside a unit of work.
    ///
    /// ## Snapshot Pattern
    /// Name, slug, image and price are copied from the cart line, so the
    /// order reads the same even if the product changes later.
    pub async fn insert_item(&self, uow: &mut UnitOfWork, item: &OrderItem) -> DbResult<()> {
        debug!(order_id = %item.order_id, product_id = %item.product_id, "Inserting order item");

        sqlx::query(
            r#"
            INSERT INTO order_items (
                order_id, product_id, name, slug, image, price_cents, quantity
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(&item.name)
        .bind(&item.slug)
        .bind(&item.image)
        .bind(item.price.cents())
        .bind(item.quantity)
        .execute(uow.conn())
        .await?;

        Ok(())
    }

    /// Records the gateway reference of a payment that has been started.
    ///
    /// Leaves paid orders untouched; returns `false` in that case.
    pub async fn set_pending_payment(&self, order_id: &str, result: &PaymentResult) -> DbResult<bool> {
        debug!(id = %order_id, external_id = %result.id, "Recording pending payment");

        let encoded = encode_payment_result(Some(result))?;
        let outcome = sqlx::query(
            "UPDATE orders SET payment_result = ?2 WHERE id = ?1 AND is_paid = 0",
        )
        .bind(order_id)
        .bind(encoded)
        .execute(&self.pool)
        .await?;

        Ok(outcome.rows_affected() == 1)
    }

    /// Marks an order paid inside a unit of work.
    ///
    /// The update only applies while `is_paid = 0`. Returns `false` when
    /// another confirmation got there first.
    pub async fn mark_paid(
        &self,
        uow: &mut UnitOfWork,
        order_id: &str,
        result: &PaymentResult,
        paid_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        debug!(id = %order_id, "Marking order paid");

        let encoded = encode_payment_result(Some(result))?;
        let outcome = sqlx::query(
            r#"
            UPDATE orders SET
                is_paid = 1,
                paid_at = ?2,
                payment_result = ?3
            WHERE id = ?1 AND is_paid = 0
            "#,
        )
        .bind(order_id)
        .bind(paid_at)
        .bind(encoded)
        .execute(uow.conn())
        .await?;

        Ok(outcome.rows_affected() == 1)
    }

    /// Counts orders (for tests and diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn encode_payment_result(result: Option<&PaymentResult>) -> DbResult<Option<String>> {
    result
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DbError::corrupt("orders.payment_result", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{address, product, test_db, user};
    use storefront_core::{CartTotals, NewOrder};

    fn new_order(user_id: &str) -> Order {
        Order::place(
            "o1",
            NewOrder {
                user_id: user_id.to_string(),
                shipping_address: address(),
                payment_method: PaymentMethod::PayPal,
                totals: CartTotals {
                    items_price: Money::from_cents(7500),
                    shipping_price: Money::from_cents(1000),
                    tax_price: Money::from_cents(1125),
                    total_price: Money::from_cents(9625),
                },
            },
            Utc::now(),
        )
    }

    fn item(order_id: &str, product_id: &str) -> OrderItem {
        OrderItem {
            order_id: order_id.to_string(),
            product_id: product_id.to_string(),
            name: "Polo".to_string(),
            slug: "polo".to_string(),
            image: "/polo.jpg".to_string(),
            price: Money::from_cents(2500),
            quantity: 3,
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = test_db().await;
        db.users().insert(&user("u1")).await.unwrap();
        db.products().insert(&product("p1", "polo", 2500, 5)).await.unwrap();

        let order = new_order("u1");
        let mut uow = db.begin().await.unwrap();
        db.orders().insert(&mut uow, &order).await.unwrap();
        db.orders().insert_item(&mut uow, &item("o1", "p1")).await.unwrap();
        uow.commit().await.unwrap();

        let loaded = db.orders().get_by_id("o1").await.unwrap().unwrap();
        assert_eq!(loaded, order);
        let items = db.orders().get_items("o1").await.unwrap();
        assert_eq!(items, vec![item("o1", "p1")]);
    }

    #[tokio::test]
    async fn test_item_for_missing_product_violates_foreign_key() {
        let db = test_db().await;
        db.users().insert(&user("u1")).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        db.orders().insert(&mut uow, &new_order("u1")).await.unwrap();
        let err = db
            .orders()
            .insert_item(&mut uow, &item("o1", "gone"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        uow.rollback().await.unwrap();

        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_paid_only_once() {
        let db = test_db().await;
        db.users().insert(&user("u1")).await.unwrap();
        let mut uow = db.begin().await.unwrap();
        db.orders().insert(&mut uow, &new_order("u1")).await.unwrap();
        uow.commit().await.unwrap();

        let result = PaymentResult {
            id: "PP-1".to_string(),
            status: "COMPLETED".to_string(),
            email_address: "buyer@example.com".to_string(),
            price_paid: "96.25".to_string(),
        };

        let mut uow = db.begin().await.unwrap();
        assert!(db.orders().mark_paid(&mut uow, "o1", &result, Utc::now()).await.unwrap());
        uow.commit().await.unwrap();

        let mut uow = db.begin().await.unwrap();
        assert!(!db.orders().mark_paid(&mut uow, "o1", &result, Utc::now()).await.unwrap());
        uow.rollback().await.unwrap();

        let paid = db.orders().get_by_id("o1").await.unwrap().unwrap();
        assert!(paid.is_paid);
        assert_eq!(paid.payment_result, Some(result));

        // pending reference can no longer be overwritten
        assert!(!db
            .orders()
            .set_pending_payment("o1", &PaymentResult::pending("PP-2"))
            .await
            .unwrap());
    }
}
