use uuid::Uuid;

use super::metrics::{cart_view, require_quantity};
use super::StorefrontService;
use crate::database::models::storefront::{CartChange, CartLine, CartView, WishlistEntry};
use crate::services::{ServiceError, ServiceResult};

impl StorefrontService {
    pub async fn cart(&self, user_id: Uuid) -> ServiceResult<CartView> {
        let lines = sqlx::query_as::<_, CartLine>(
            "SELECT p.*, c.quantity
             FROM storefront.cart_items c
             JOIN storefront.products p ON p.id = c.product_id
             WHERE c.user_id = $1
             ORDER BY p.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(cart_view(lines))
    }

    /// Adding a product already in the cart increases its quantity.
    pub async fn add_to_cart(&self, user_id: Uuid, change: CartChange) -> ServiceResult<CartView> {
        require_quantity(change.quantity)?;
        let product = self.product_by_code(&change.product_code).await?;

        sqlx::query(
            "INSERT INTO storefront.cart_items (user_id, product_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, product_id)
             DO UPDATE SET quantity = storefront.cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(user_id)
        .bind(product.id)
        .bind(change.quantity)
        .execute(&self.pool)
        .await?;
        self.cart(user_id).await
    }

    pub async fn update_cart(&self, user_id: Uuid, change: CartChange) -> ServiceResult<CartView> {
        require_quantity(change.quantity)?;
        let product = self.product_by_code(&change.product_code).await?;

        let updated = sqlx::query(
            "UPDATE storefront.cart_items SET quantity = $3 WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product.id)
        .bind(change.quantity)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(ServiceError::NotFound("Item not in cart".to_string()));
        }
        self.cart(user_id).await
    }

    pub async fn remove_from_cart(&self, user_id: Uuid, product_code: &str) -> ServiceResult<CartView> {
        let removed = sqlx::query(
            "DELETE FROM storefront.cart_items c
             USING storefront.products p
             WHERE p.id = c.product_id AND c.user_id = $1 AND p.product_code = $2",
        )
        .bind(user_id)
        .bind(product_code.trim())
        .execute(&self.pool)
        .await?
        .rows_affected();
        if removed == 0 {
            return Err(ServiceError::NotFound("Item not in cart".to_string()));
        }
        self.cart(user_id).await
    }

    pub async fn wishlist(&self, user_id: Uuid) -> ServiceResult<Vec<WishlistEntry>> {
        let entries = sqlx::query_as::<_, WishlistEntry>(
            "SELECT p.*, w.added_at
             FROM storefront.wishlist_items w
             JOIN storefront.products p ON p.id = w.product_id
             WHERE w.user_id = $1
             ORDER BY w.added_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn add_to_wishlist(&self, user_id: Uuid, product_id: Uuid) -> ServiceResult<Vec<WishlistEntry>> {
        self.product_by_id(product_id).await?;
        sqlx::query(
            "INSERT INTO storefront.wishlist_items (user_id, product_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;
        self.wishlist(user_id).await
    }

    pub async fn remove_from_wishlist(&self, user_id: Uuid, product_id: Uuid) -> ServiceResult<Vec<WishlistEntry>> {
        let removed = sqlx::query("DELETE FROM storefront.wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(ServiceError::NotFound("Product not in wishlist".to_string()));
        }
        self.wishlist(user_id).await
    }
}
