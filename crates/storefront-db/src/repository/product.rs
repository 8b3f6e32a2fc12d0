//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Lookup by id and by slug
//! - Latest products for the landing page
//! - Stock decrement when an order is paid

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::unit_of_work::UnitOfWork;
use storefront_core::{Money, Product};

macro_rules! select_products {
    () => {
        r#"
        SELECT
            id, name, slug, category, brand, description, images,
            price_cents, stock, rating, num_reviews, is_featured, banner, created_at
        FROM products
        "#
    };
}

/// Raw `products` row; `images` is a JSON array.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    slug: String,
    category: String,
    brand: String,
    description: String,
    images: String,
    price_cents: i64,
    stock: i64,
    rating: f64,
    num_reviews: i64,
    is_featured: bool,
    banner: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        Ok(Product {
            images: serde_json::from_str(&row.images)
                .map_err(|e| DbError::corrupt("products.images", e))?,
            id: row.id,
            name: row.name,
            slug: row.slug,
            category: row.category,
            brand: row.brand,
            description: row.description,
            price: Money::from_cents(row.price_cents),
            stock: row.stock,
            rating: row.rating,
            num_reviews: row.num_reviews,
            is_featured: row.is_featured,
            banner: row.banner,
            created_at: row.created_at,
        })
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.get_by_slug("polo-sporting-stretch-shirt").await?;
/// let latest = repo.list_latest(4).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(concat!(select_products!(), "WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets a product by its URL slug.
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(concat!(select_products!(), "WHERE slug = ?1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Newest products first.
    pub async fn list_latest(&self, limit: u32) -> DbResult<Vec<Product>> {
        debug!(limit, "Listing latest products");

        let rows = sqlx::query_as::<_, ProductRow>(concat!(
            select_products!(),
            "ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - slug already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(slug = %product.slug, "Inserting product");

        let images = serde_json::to_string(&product.images)
            .map_err(|e| DbError::corrupt("products.images", e))?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, slug, category, brand, description, images,
                price_cents, stock, rating, num_reviews, is_featured, banner, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(&product.description)
        .bind(images)
        .bind(product.price.cents())
        .bind(product.stock)
        .bind(product.rating)
        .bind(product.num_reviews)
        .bind(product.is_featured)
        .bind(&product.banner)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Overwrites the stock level (admin restock).
    pub async fn set_stock(&self, id: &str, stock: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET stock = ?2 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Removes a product from the catalog.
    ///
    /// Fails with `ForeignKeyViolation` once the product appears on an order.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Counts products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Subtracts `quantity` from a product's stock inside a unit of work.
    ///
    /// Unconditional: stock may go negative if two orders raced for the
    /// last units.
    pub async fn decrement_stock(
        &self,
        uow: &mut UnitOfWork,
        id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        debug!(id = %id, quantity, "Decrementing stock");

        let result = sqlx::query("UPDATE products SET stock = stock - ?2 WHERE id = ?1")
            .bind(id)
            .bind(quantity)
            .execute(uow.conn())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, test_db};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let polo = product("p1", "polo-shirt", 2500, 5);
        db.products().insert(&polo).await.unwrap();

        let by_id = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(by_id, polo);

        let by_slug = db.products().get_by_slug("polo-shirt").await.unwrap();
        assert_eq!(by_slug.map(|p| p.id), Some("p1".to_string()));

        assert!(db.products().get_by_id("missing").await.unwrap().is_none());
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let db = test_db().await;
        db.products()
            .insert(&product("p1", "polo-shirt", 2500, 5))
            .await
            .unwrap();

        let err = db
            .products()
            .insert(&product("p2", "polo-shirt", 2500, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_latest_newest_first() {
        let db = test_db().await;
        for (i, slug) in ["a-shirt", "b-shirt", "c-shirt"].iter().enumerate() {
            let mut p = product(&format!("p{i}"), slug, 1000, 1);
            p.created_at = Utc::now() + chrono::Duration::seconds(i as i64);
            db.products().insert(&p).await.unwrap();
        }

        let latest = db.products().list_latest(2).await.unwrap();
        let ids: Vec<_> = latest.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[tokio::test]
    async fn test_decrement_stock_in_unit_of_work() {
        let db = test_db().await;
        db.products()
            .insert(&product("p1", "polo-shirt", 2500, 5))
            .await
            .unwrap();

        let mut uow = db.begin().await.unwrap();
        db.products().decrement_stock(&mut uow, "p1", 2).await.unwrap();
        uow.rollback().await.unwrap();
        assert_eq!(db.products().get_by_id("p1").await.unwrap().unwrap().stock, 5);

        let mut uow = db.begin().await.unwrap();
        db.products().decrement_stock(&mut uow, "p1", 2).await.unwrap();
        uow.commit().await.unwrap();
        assert_eq!(db.products().get_by_id("p1").await.unwrap().unwrap().stock, 3);
    }
}
