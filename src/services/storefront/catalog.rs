use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::StorefrontService;
use crate::database::models::storefront::{CatalogPage, CatalogQuery, Product, ProductSort};
use crate::services::{contains_pattern, ServiceError, ServiceResult};

/// Append the shared catalog filters to a query that already has a WHERE clause.
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a CatalogQuery) {
    if let Some(category) = query.category.as_deref().map(str::trim) {
        if !category.is_empty() && category != "All" {
            builder.push(" AND category = ").push_bind(category);
        }
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        builder
            .push(" AND name ILIKE ")
            .push_bind(contains_pattern(search))
            .push(" ESCAPE '\\'");
    }
    if let Some(min) = query.min_price {
        builder.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = query.max_price {
        builder.push(" AND price <= ").push_bind(max);
    }
}

/// Rows to skip for a 1-based page; pages past the addressable range are rejected.
fn page_offset(page: Option<i64>, limit: i64) -> ServiceResult<i64> {
    let page = page.filter(|p| *p > 0).unwrap_or(1);
    (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| ServiceError::invalid("page", "is out of range"))
}

impl StorefrontService {
    /// One page of the catalog plus the number of matching products.
    pub async fn list_products(&self, query: CatalogQuery) -> ServiceResult<CatalogPage> {
        let limit = self.listing.clamp_limit(query.limit);
        let offset = page_offset(query.page, limit)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM storefront.products WHERE TRUE");
        push_filters(&mut count, &query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM storefront.products WHERE TRUE");
        push_filters(&mut select, &query);
        select.push(match query.sort {
            Some(ProductSort::LowToHigh) => " ORDER BY price ASC, name",
            Some(ProductSort::HighToLow) => " ORDER BY price DESC, name",
            None => " ORDER BY created_at DESC",
        });
        select.push(" LIMIT ").push_bind(limit);
        select.push(" OFFSET ").push_bind(offset);
        let products = select.build_query_as::<Product>().fetch_all(&self.pool).await?;

        Ok(CatalogPage { products, total })
    }

    pub async fn product_by_id(&self, id: Uuid) -> ServiceResult<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM storefront.products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product"))
    }

    pub async fn product_by_code(&self, code: &str) -> ServiceResult<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM storefront.products WHERE product_code = $1")
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        assert_eq!(page_offset(None, 10).unwrap(), 0);
        assert_eq!(page_offset(Some(0), 10).unwrap(), 0);
        assert_eq!(page_offset(Some(-4), 10).unwrap(), 0);
        assert_eq!(page_offset(Some(3), 20).unwrap(), 40);
    }

    #[test]
    fn huge_page_is_rejected_not_overflowed() {
        assert!(matches!(
            page_offset(Some(i64::MAX), 2),
            Err(ServiceError::InvalidField { field: "page", .. })
        ));
    }
}
