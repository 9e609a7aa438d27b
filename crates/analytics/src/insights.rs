use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use grainbridge_sales::{Order, OrderStatus};

/// Month-over-month demand summary.
///
/// `growth` is the percentage rendered with one decimal, e.g. `"12.5"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInsights {
    pub forecast: String,
    pub recommendation: String,
    pub growth: String,
}

const RISING: &str = "Demand is rising. Secure additional supply contracts for Basmati varieties.";
const COOLING: &str = "Demand is cooling. Consider promotional discounts for bulk buyers.";
const STEADY: &str = "Maintain current stock levels.";

/// `(previous_month_start, current_month_start)` for the UTC calendar month
/// containing `now`.
pub fn month_windows(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let current = today - Days::new(u64::from(today.day0()));
    let last_of_previous = current - Days::new(1);
    let previous = last_of_previous - Days::new(u64::from(last_of_previous.day0()));
    (
        previous.and_time(NaiveTime::MIN).and_utc(),
        current.and_time(NaiveTime::MIN).and_utc(),
    )
}

/// Compare revenue of the current calendar month against the previous one.
///
/// Cancelled orders are excluded. Growth is 0 when the previous month had no
/// revenue.
pub fn market_insights<'a>(orders: impl IntoIterator<Item = &'a Order>, now: DateTime<Utc>) -> MarketInsights {
    let (previous_start, current_start) = month_windows(now);

    let mut current = 0.0;
    let mut previous = 0.0;
    for order in orders {
        if order.status == OrderStatus::Cancelled {
            continue;
        }
        if order.created_at >= current_start {
            current += order.total_amount;
        } else if order.created_at >= previous_start {
            previous += order.total_amount;
        }
    }

    let growth = if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    };

    let recommendation = if growth > 5.0 {
        RISING
    } else if growth < -5.0 {
        COOLING
    } else {
        STEADY
    };
    let direction = if growth >= 0.0 { "INCREASED" } else { "DECREASED" };

    MarketInsights {
        forecast: format!("Market demand has {direction} by {:.1}%", growth.abs()),
        recommendation: recommendation.to_string(),
        growth: format!("{growth:.1}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use grainbridge_core::UserId;

    fn order(total: f64, status: OrderStatus, at: DateTime<Utc>) -> Order {
        let mut o = Order::place(UserId::new(), vec![], total, "Lahore".to_string(), at);
        o.status = status;
        o
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn windows_follow_calendar_months() {
        let (prev, cur) = month_windows(now());
        assert_eq!(prev, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(cur, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        let (prev, cur) = month_windows(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(prev, Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(cur, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn growth_is_zero_without_previous_revenue() {
        let orders = vec![order(5000.0, OrderStatus::Delivered, now())];
        let insights = market_insights(&orders, now());
        assert_eq!(insights.growth, "0.0");
        assert_eq!(insights.forecast, "Market demand has INCREASED by 0.0%");
        assert_eq!(insights.recommendation, STEADY);
    }

    #[test]
    fn rising_demand() {
        let feb = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        let orders = vec![
            order(1000.0, OrderStatus::Delivered, feb),
            order(1500.0, OrderStatus::Pending, now()),
            order(9999.0, OrderStatus::Cancelled, now()),
        ];
        let insights = market_insights(&orders, now());
        assert_eq!(insights.growth, "50.0");
        assert_eq!(insights.forecast, "Market demand has INCREASED by 50.0%");
        assert_eq!(insights.recommendation, RISING);
    }

    #[test]
    fn cooling_demand_and_old_orders_ignored() {
        let feb = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        let jan = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let orders = vec![
            order(2000.0, OrderStatus::Shipped, feb),
            order(50_000.0, OrderStatus::Delivered, jan),
            order(1500.0, OrderStatus::Processing, now() - Duration::days(1)),
        ];
        let insights = market_insights(&orders, now());
        assert_eq!(insights.growth, "-25.0");
        assert_eq!(insights.forecast, "Market demand has DECREASED by 25.0%");
        assert_eq!(insights.recommendation, COOLING);
    }

    #[test]
    fn small_moves_keep_steady_advice() {
        let feb = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let orders = vec![order(1000.0, OrderStatus::Delivered, feb), order(1050.0, OrderStatus::Delivered, now())];
        let insights = market_insights(&orders, now());
        assert_eq!(insights.growth, "5.0");
        assert_eq!(insights.recommendation, STEADY);
    }
}
