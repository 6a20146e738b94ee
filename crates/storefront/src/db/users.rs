//! User repository for database operations.
//!
//! Users own two child collections, `shop.cart_item` and `shop.order` (with
//! `shop.order_item`). Mutations load the current cart, apply the change with
//! the rules in `bunny_shop_core`, and write the result back inside one
//! transaction. There is no per-user locking: concurrent mutations of the
//! same user race and the last commit wins.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use bunny_shop_core::{
    Cart, CartLine, NewCartLine, Order, OrderId, OrderLine, OrderStatus, Price, UserId,
};

use super::{RepositoryError, map_unique_violation};
use crate::models::{Address, NewUser, User};

/// Repository for user, cart and order database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a user with this exact email exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM shop.user WHERE email = $1)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;

        Ok(exists.0)
    }

    /// Create a new user with an empty cart and no orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO shop.user (name, email, phone, street, city, state, zip_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, email, phone, street, city, state, zip_code, created_at
            ",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&new_user.address.street)
        .bind(&new_user.address.city)
        .bind(&new_user.address.state)
        .bind(&new_user.address.zip_code)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        Ok(row.into_user(Cart::new(), Vec::new()))
    }

    /// Get a user by their ID, including cart and order history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored order status is invalid.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, phone, street, city, state, zip_code, created_at
            FROM shop.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let cart = load_cart(&mut conn, id).await?;
        let orders = load_orders(&mut conn, id).await?;

        Ok(Some(row.into_user(cart, orders)))
    }

    /// Get a user's cart.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        if !user_exists(&mut conn, user_id).await? {
            return Ok(None);
        }

        Ok(Some(load_cart(&mut conn, user_id).await?))
    }

    /// Add an item to a user's cart, merging with an existing line for the
    /// same product, and return the updated cart.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::Cart` if the merged quantity or the cart
    /// total is out of range; nothing is written.
    #[instrument(skip(self, item), fields(user_id = %user_id, product_id = %item.product_id))]
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        item: NewCartLine,
    ) -> Result<Option<Cart>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if !user_exists(&mut tx, user_id).await? {
            return Ok(None);
        }

        let mut cart = load_cart(&mut tx, user_id).await?;
        cart.add(item, Utc::now())?;
        replace_cart(&mut tx, user_id, &cart).await?;

        tx.commit().await?;

        Ok(Some(cart))
    }

    /// Turn the user's current cart into an order and empty the cart.
    ///
    /// An empty cart still produces an order, with a zero total.
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::Cart` if the cart total is out of range.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn place_order(&self, user_id: UserId) -> Result<Option<Order>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if !user_exists(&mut tx, user_id).await? {
            return Ok(None);
        }

        let mut cart = load_cart(&mut tx, user_id).await?;
        let order = Order::place(&mut cart, Utc::now())?;

        insert_order(&mut tx, user_id, &order).await?;
        replace_cart(&mut tx, user_id, &cart).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.order_id,
            total = %order.total,
            lines = order.products.len(),
            "Order placed"
        );

        Ok(Some(order))
    }

    /// Get a user's orders, oldest first.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored order status is invalid.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_orders(&self, user_id: UserId) -> Result<Option<Vec<Order>>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        if !user_exists(&mut conn, user_id).await? {
            return Ok(None);
        }

        Ok(Some(load_orders(&mut conn, user_id).await?))
    }
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    phone: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, cart: Cart, orders: Vec<Order>) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: Address {
                street: self.street,
                city: self.city,
                state: self.state,
                zip_code: self.zip_code,
            },
            cart,
            orders,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: String,
    name: String,
    price: Price,
    quantity: i32,
    added_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartLine {
    fn from(row: CartItemRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name,
            price: row.price,
            quantity: row.quantity,
            added_at: row.added_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_id: String,
    total: Price,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_pk: i64,
    product_id: String,
    name: String,
    price: Price,
    quantity: i32,
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn user_exists(conn: &mut PgConnection, user_id: UserId) -> Result<bool, RepositoryError> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM shop.user WHERE id = $1)")
        .bind(user_id)
        .fetch_one(conn)
        .await?;

    Ok(exists.0)
}

async fn load_cart(conn: &mut PgConnection, user_id: UserId) -> Result<Cart, RepositoryError> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        r"
        SELECT product_id, name, price, quantity, added_at
        FROM shop.cart_item
        WHERE user_id = $1
        ORDER BY position
        ",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    Ok(Cart::from_lines(rows.into_iter().map(CartLine::from).collect()))
}

/// Overwrite the stored cart with `cart`, keeping line order.
async fn replace_cart(
    conn: &mut PgConnection,
    user_id: UserId,
    cart: &Cart,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM shop.cart_item WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    for (index, line) in cart.lines().iter().enumerate() {
        let position = i32::try_from(index).unwrap_or(i32::MAX);

        sqlx::query(
            r"
            INSERT INTO shop.cart_item (user_id, position, product_id, name, price, quantity, added_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user_id)
        .bind(position)
        .bind(&line.product_id)
        .bind(&line.name)
        .bind(line.price)
        .bind(line.quantity)
        .bind(line.added_at)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn insert_order(
    conn: &mut PgConnection,
    user_id: UserId,
    order: &Order,
) -> Result<(), RepositoryError> {
    let (order_pk,): (i64,) = sqlx::query_as(
        r"
        INSERT INTO shop.order (user_id, order_id, total, status, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
    )
    .bind(user_id)
    .bind(order.order_id.as_str())
    .bind(order.total)
    .bind(order.status.as_str())
    .bind(order.created_at)
    .fetch_one(&mut *conn)
    .await?;

    for (index, line) in order.products.iter().enumerate() {
        let position = i32::try_from(index).unwrap_or(i32::MAX);

        sqlx::query(
            r"
            INSERT INTO shop.order_item (order_pk, position, product_id, name, price, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(order_pk)
        .bind(position)
        .bind(&line.product_id)
        .bind(&line.name)
        .bind(line.price)
        .bind(line.quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn load_orders(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Vec<Order>, RepositoryError> {
    let order_rows = sqlx::query_as::<_, OrderRow>(
        r"
        SELECT id, order_id, total, status, created_at
        FROM shop.order
        WHERE user_id = $1
        ORDER BY id
        ",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    if order_rows.is_empty() {
        return Ok(Vec::new());
    }

    let order_pks: Vec<i64> = order_rows.iter().map(|r| r.id).collect();

    let item_rows = sqlx::query_as::<_, OrderItemRow>(
        r"
        SELECT order_pk, product_id, name, price, quantity
        FROM shop.order_item
        WHERE order_pk = ANY($1)
        ORDER BY order_pk, position
        ",
    )
    .bind(&order_pks)
    .fetch_all(&mut *conn)
    .await?;

    let mut lines_by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for item in item_rows {
        lines_by_order
            .entry(item.order_pk)
            .or_default()
            .push(OrderLine {
                product_id: item.product_id,
                name: item.name,
                price: item.price,
                quantity: item.quantity,
            });
    }

    order_rows
        .into_iter()
        .map(|row| {
            let status = row.status.parse::<OrderStatus>().map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid order status: {e}"))
            })?;

            Ok(Order {
                order_id: OrderId::new(row.order_id),
                products: lines_by_order.remove(&row.id).unwrap_or_default(),
                total: row.total,
                status,
                created_at: row.created_at,
            })
        })
        .collect()
}
