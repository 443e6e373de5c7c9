//! Pure calculations behind the storefront dashboard.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::database::models::storefront::{
    CartItem, CartLine, CartView, MonthlyCustomers, MonthlySales, OrderStatus, OrdersByStatus,
};
use crate::services::{ServiceError, ServiceResult};

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn one_decimal(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Month-over-month growth in percent, one decimal. Growth from nothing to
/// something counts as 100%.
pub fn growth_percent(current: Decimal, previous: Decimal) -> f64 {
    if previous > Decimal::ZERO {
        one_decimal((current - previous) / previous * Decimal::ONE_HUNDRED)
    } else if current > Decimal::ZERO {
        100.0
    } else {
        0.0
    }
}

/// Share of all customers that joined recently, in percent with one decimal.
pub fn customer_growth(new_customers: i64, total_customers: i64) -> f64 {
    if total_customers <= 0 {
        return 0.0;
    }
    one_decimal(Decimal::from(new_customers) / Decimal::from(total_customers) * Decimal::ONE_HUNDRED)
}

/// Sales for every month Jan..Dec from `(month number, amount)` pairs; months
/// without sales are zero.
pub fn monthly_sales(rows: &[(i32, Decimal)]) -> Vec<MonthlySales> {
    let mut totals = [Decimal::ZERO; 12];
    for (month, amount) in rows {
        if let Some(slot) = usize::try_from(*month - 1).ok().and_then(|i| totals.get_mut(i)) {
            *slot += amount;
        }
    }
    MONTH_NAMES
        .iter()
        .zip(totals)
        .map(|(month, sales)| MonthlySales { month, sales })
        .collect()
}

/// Running customer totals per month Jan..Dec from `(month number, signups)` pairs.
pub fn cumulative_customers(rows: &[(i32, i64)]) -> Vec<MonthlyCustomers> {
    let mut counts = [0i64; 12];
    for (month, signups) in rows {
        if let Some(slot) = usize::try_from(*month - 1).ok().and_then(|i| counts.get_mut(i)) {
            *slot += signups;
        }
    }
    let mut running = 0;
    MONTH_NAMES
        .iter()
        .zip(counts)
        .map(|(month, count)| {
            running += count;
            MonthlyCustomers {
                month,
                customers: running,
            }
        })
        .collect()
}

pub fn orders_by_status(rows: &[(OrderStatus, i64)]) -> OrdersByStatus {
    let mut counts = OrdersByStatus::default();
    for (status, count) in rows {
        match status {
            OrderStatus::Pending => counts.pending += count,
            OrderStatus::Confirmed => counts.processing += count,
            OrderStatus::Shipped => counts.shipped += count,
            OrderStatus::Delivered => counts.delivered += count,
            OrderStatus::Cancelled => counts.cancelled += count,
        }
    }
    counts
}

/// Line totals and the cart total.
pub fn cart_view(lines: Vec<CartLine>) -> CartView {
    let items: Vec<CartItem> = lines
        .into_iter()
        .map(|line| CartItem {
            line_total: line.product.price * Decimal::from(line.quantity),
            product_id: line.product.id,
            product_code: line.product.product_code,
            name: line.product.name,
            price: line.product.price,
            quantity: line.quantity,
        })
        .collect();
    let total = items.iter().map(|item| item.line_total).sum();
    CartView { items, total }
}

/// Customers may only cancel orders nobody has acted on yet.
pub fn ensure_cancellable(status: OrderStatus) -> ServiceResult<()> {
    if status != OrderStatus::Pending {
        return Err(ServiceError::Validation(format!(
            "Only pending orders can be cancelled (current status: {})",
            status
        )));
    }
    Ok(())
}

pub fn require_quantity(quantity: i32) -> ServiceResult<()> {
    if quantity < 1 {
        return Err(ServiceError::invalid("quantity", "must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::storefront::Product;
    use chrono::Utc;
    use uuid::Uuid;

    fn product(code: &str, cents: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            product_code: code.into(),
            name: format!("Product {}", code),
            description: String::new(),
            price: Decimal::new(cents, 2),
            stock: 10,
            category: "General".into(),
            images: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn growth_against_previous_month() {
        assert_eq!(growth_percent(Decimal::from(150), Decimal::from(100)), 50.0);
        assert_eq!(growth_percent(Decimal::from(50), Decimal::from(100)), -50.0);
        assert_eq!(growth_percent(Decimal::from(2), Decimal::from(3)), -33.3);
    }

    #[test]
    fn growth_from_zero() {
        assert_eq!(growth_percent(Decimal::from(10), Decimal::ZERO), 100.0);
        assert_eq!(growth_percent(Decimal::ZERO, Decimal::ZERO), 0.0);
    }

    #[test]
    fn customer_growth_share() {
        assert_eq!(customer_growth(1, 3), 33.3);
        assert_eq!(customer_growth(5, 0), 0.0);
    }

    #[test]
    fn monthly_sales_fill_every_month() {
        let sales = monthly_sales(&[(1, Decimal::from(10)), (3, Decimal::from(5)), (3, Decimal::from(7))]);
        assert_eq!(sales.len(), 12);
        assert_eq!(sales[0].month, "Jan");
        assert_eq!(sales[0].sales, Decimal::from(10));
        assert_eq!(sales[1].sales, Decimal::ZERO);
        assert_eq!(sales[2].sales, Decimal::from(12));
        assert_eq!(sales[11].month, "Dec");
    }

    #[test]
    fn customers_accumulate() {
        let growth = cumulative_customers(&[(2, 3), (4, 1)]);
        assert_eq!(growth[0].customers, 0);
        assert_eq!(growth[1].customers, 3);
        assert_eq!(growth[2].customers, 3);
        assert_eq!(growth[3].customers, 4);
        assert_eq!(growth[11].customers, 4);
    }

    #[test]
    fn out_of_range_months_are_ignored() {
        let sales = monthly_sales(&[(0, Decimal::ONE), (13, Decimal::ONE)]);
        assert!(sales.iter().all(|m| m.sales == Decimal::ZERO));
    }

    #[test]
    fn confirmed_orders_count_as_processing() {
        let counts = orders_by_status(&[(OrderStatus::Confirmed, 2), (OrderStatus::Pending, 1)]);
        assert_eq!(counts.processing, 2);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.cancelled, 0);
    }

    #[test]
    fn cart_totals() {
        let view = cart_view(vec![
            CartLine {
                product: product("A1", 1999),
                quantity: 2,
            },
            CartLine {
                product: product("B2", 500),
                quantity: 1,
            },
        ]);
        assert_eq!(view.items[0].line_total, Decimal::new(3998, 2));
        assert_eq!(view.total, Decimal::new(4498, 2));
    }

    #[test]
    fn empty_cart_total_is_zero() {
        assert_eq!(cart_view(vec![]).total, Decimal::ZERO);
    }

    #[test]
    fn only_pending_orders_cancel() {
        assert!(ensure_cancellable(OrderStatus::Pending).is_ok());
        let err = ensure_cancellable(OrderStatus::Shipped).unwrap_err();
        assert!(err.to_string().contains("shipped"));
    }

    #[test]
    fn quantity_floor() {
        assert!(require_quantity(0).is_err());
        assert!(require_quantity(1).is_ok());
    }
}
