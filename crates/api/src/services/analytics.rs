//! Sales analytics for the operator dashboard.
//!
//! Every view is derived in Rust from the raw range rows of a
//! [`SalesStore`], so the `PostgreSQL` and in-memory stores agree on bucket
//! boundaries, rounding and tie-breaking. All carts in range are counted
//! regardless of status.
//!
//! Calendar days are taken in a fixed reporting offset
//! (`ANALYTICS_UTC_OFFSET_MINUTES`). Results are cached with `moka` for a
//! short TTL; a TTL of zero disables caching.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use moka::future::Cache;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use norkys_core::ItemId;

use super::error::{ServiceError, ValidationError};
use crate::models::{DailySales, KpiSummary, LineSaleRow, PaymentMethodShare, ProductRanking};
use crate::store::SalesStore;

pub const DEFAULT_DAILY_DAYS: u32 = 7;
pub const DEFAULT_TOP_DAYS: u32 = 30;
pub const DEFAULT_TOP: u32 = 5;
pub const DEFAULT_DATES_TOP: u32 = 15;
pub const DEFAULT_KPI_DAYS: u32 = 7;
pub const MAX_DAYS: u32 = 366;
pub const MAX_TOP: u32 = 100;

#[derive(Debug, Clone)]
enum CacheValue {
    Daily(Arc<Vec<DailySales>>),
    Shares(Arc<Vec<PaymentMethodShare>>),
    Ranking(Arc<Vec<ProductRanking>>),
    Dates(Arc<Vec<NaiveDate>>),
    Kpis(KpiSummary),
}

fn bounded(
    field: &'static str,
    raw: Option<i64>,
    default: u32,
    max: u32,
) -> Result<u32, ValidationError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    u32::try_from(value)
        .ok()
        .filter(|v| (1..=max).contains(v))
        .ok_or(ValidationError::OutOfRange {
            field,
            min: 1,
            max: i64::from(max),
            value,
        })
}

/// Parse a `YYYY-MM-DD` calendar date in years 1 through 9999.
///
/// # Errors
///
/// Returns `ValidationError::InvalidDate` for anything else.
pub fn parse_day(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .filter(|day| (1..=9999).contains(&day.year()))
        .ok_or_else(|| ValidationError::InvalidDate(raw.to_owned()))
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RankBy {
    Quantity,
    Profit,
}

/// Group line rows per item and keep the `top` best by `rank`.
///
/// Ties go to the lower item id.
fn rank_products(rows: &[LineSaleRow], rank: RankBy, top: u32) -> Vec<ProductRanking> {
    let mut per_item: BTreeMap<ItemId, ProductRanking> = BTreeMap::new();
    for row in rows {
        let entry = per_item
            .entry(row.item_id)
            .or_insert_with(|| ProductRanking {
                item_id: row.item_id,
                item_name: row.item_name.clone(),
                quantity: 0,
                revenue: Decimal::ZERO,
                profit: Decimal::ZERO,
            });
        entry.quantity += i64::from(row.quantity);
        entry.revenue += row.revenue();
        entry.profit += row.profit();
    }

    let mut ranked: Vec<ProductRanking> = per_item.into_values().collect();
    ranked.sort_by(|a, b| {
        let metric = match rank {
            RankBy::Quantity => b.quantity.cmp(&a.quantity),
            RankBy::Profit => b.profit.cmp(&a.profit),
        };
        metric.then(a.item_id.cmp(&b.item_id))
    });
    ranked.truncate(usize::try_from(top).unwrap_or(usize::MAX));
    ranked
}

/// Read-only aggregation engine over historical carts.
#[derive(Clone)]
pub struct SalesAnalytics {
    sales: Arc<dyn SalesStore>,
    offset: FixedOffset,
    clock: fn() -> DateTime<Utc>,
    cache: Option<Cache<String, CacheValue>>,
}

impl SalesAnalytics {
    /// Create an engine reporting in `offset` with results cached for
    /// `cache_ttl` (zero disables the cache).
    #[must_use]
    pub fn new(sales: Arc<dyn SalesStore>, offset: FixedOffset, cache_ttl: Duration) -> Self {
        let cache = (!cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(500)
                .time_to_live(cache_ttl)
                .build()
        });

        Self {
            sales,
            offset,
            clock: Utc::now,
            cache,
        }
    }

    /// Replace the wall clock.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn today(&self) -> NaiveDate {
        (self.clock)().with_timezone(&self.offset).date_naive()
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// UTC instant of local midnight starting `day`.
    fn start_of(&self, day: NaiveDate) -> DateTime<Utc> {
        let local = day.and_time(NaiveTime::MIN);
        (local - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }

    /// `[from, to)` covering the last `days` calendar days, today included.
    fn window(&self, days: u32) -> (NaiveDate, DateTime<Utc>, DateTime<Utc>) {
        let today = self.today();
        let first = today - TimeDelta::days(i64::from(days) - 1);
        (first, self.start_of(first), self.start_of(today + TimeDelta::days(1)))
    }

    async fn cached(&self, key: &str) -> Option<CacheValue> {
        let hit = self.cache.as_ref()?.get(key).await;
        if hit.is_some() {
            debug!(key, "Analytics cache hit");
        }
        hit
    }

    async fn remember(&self, key: String, value: CacheValue) {
        if let Some(cache) = &self.cache {
            cache.insert(key, value).await;
        }
    }

    /// Sales per calendar day for the last `days` days (default 7).
    ///
    /// Always returns exactly `days` buckets in ascending order, zero-filled
    /// for days without carts.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` if `days` is outside `1..=366`.
    #[instrument(skip(self))]
    pub async fn daily_sales(
        &self,
        days: Option<i64>,
    ) -> Result<Arc<Vec<DailySales>>, ServiceError> {
        let days = bounded("days", days, DEFAULT_DAILY_DAYS, MAX_DAYS)?;
        let key = format!("daily:{days}");
        if let Some(CacheValue::Daily(series)) = self.cached(&key).await {
            return Ok(series);
        }

        let (first, from, to) = self.window(days);
        let rows = self.sales.cart_totals_between(from, to).await?;

        let mut buckets: BTreeMap<NaiveDate, DailySales> = first
            .iter_days()
            .take(usize::try_from(days).unwrap_or(usize::MAX))
            .map(|day| {
                (
                    day,
                    DailySales {
                        day,
                        total: Decimal::ZERO,
                        orders: 0,
                    },
                )
            })
            .collect();
        for row in &rows {
            if let Some(bucket) = buckets.get_mut(&self.day_of(row.created_at)) {
                bucket.total += row.total;
                bucket.orders += 1;
            }
        }

        let series = Arc::new(buckets.into_values().collect::<Vec<_>>());
        self.remember(key, CacheValue::Daily(series.clone())).await;
        Ok(series)
    }

    /// Orders and revenue per payment method across all carts that have one.
    ///
    /// Sorted by order count descending, then label ascending.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the read fails.
    #[instrument(skip(self))]
    pub async fn payment_methods(&self) -> Result<Arc<Vec<PaymentMethodShare>>, ServiceError> {
        let key = "payment-methods".to_owned();
        if let Some(CacheValue::Shares(shares)) = self.cached(&key).await {
            return Ok(shares);
        }

        let rows = self.sales.payment_method_rows().await?;
        let mut per_method: BTreeMap<String, PaymentMethodShare> = BTreeMap::new();
        for row in &rows {
            let Some(method) = &row.payment_method else {
                continue;
            };
            let share = per_method
                .entry(method.as_str().to_owned())
                .or_insert_with(|| PaymentMethodShare {
                    method: method.as_str().to_owned(),
                    orders: 0,
                    total: Decimal::ZERO,
                });
            share.orders += 1;
            share.total += row.total;
        }

        let mut shares: Vec<PaymentMethodShare> = per_method.into_values().collect();
        shares.sort_by(|a, b| b.orders.cmp(&a.orders).then_with(|| a.method.cmp(&b.method)));

        let shares = Arc::new(shares);
        self.remember(key, CacheValue::Shares(shares.clone())).await;
        Ok(shares)
    }

    async fn ranking(
        &self,
        rank: RankBy,
        days: Option<i64>,
        top: Option<i64>,
    ) -> Result<Arc<Vec<ProductRanking>>, ServiceError> {
        let days = bounded("days", days, DEFAULT_TOP_DAYS, MAX_DAYS)?;
        let top = bounded("top", top, DEFAULT_TOP, MAX_TOP)?;
        let key = format!("top:{rank:?}:{days}:{top}");
        if let Some(CacheValue::Ranking(ranked)) = self.cached(&key).await {
            return Ok(ranked);
        }

        let (_, from, to) = self.window(days);
        let rows = self.sales.line_sales_between(from, to).await?;
        let ranked = Arc::new(rank_products(&rows, rank, top));
        self.remember(key, CacheValue::Ranking(ranked.clone())).await;
        Ok(ranked)
    }

    /// Best-selling items by units over the last `days` days (default 30),
    /// at most `top` entries (default 5).
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` for `days` outside `1..=366` or
    /// `top` outside `1..=100`.
    #[instrument(skip(self))]
    pub async fn top_by_quantity(
        &self,
        days: Option<i64>,
        top: Option<i64>,
    ) -> Result<Arc<Vec<ProductRanking>>, ServiceError> {
        self.ranking(RankBy::Quantity, days, top).await
    }

    /// Most profitable items over the last `days` days (default 30), at most
    /// `top` entries (default 5).
    ///
    /// Profit is `quantity × (captured unit price − current cost basis)`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` for `days` outside `1..=366` or
    /// `top` outside `1..=100`.
    #[instrument(skip(self))]
    pub async fn top_by_profit(
        &self,
        days: Option<i64>,
        top: Option<i64>,
    ) -> Result<Arc<Vec<ProductRanking>>, ServiceError> {
        self.ranking(RankBy::Profit, days, top).await
    }

    /// Most profitable items on one calendar day.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidDate` if `date` is missing or not
    /// `YYYY-MM-DD`, and `ValidationError::OutOfRange` for a bad `top`.
    #[instrument(skip(self))]
    pub async fn top_by_profit_on(
        &self,
        date: Option<&str>,
        top: Option<i64>,
    ) -> Result<Arc<Vec<ProductRanking>>, ServiceError> {
        let day = parse_day(date.unwrap_or_default())?;
        let top = bounded("top", top, DEFAULT_TOP, MAX_TOP)?;
        let key = format!("top-on:{day}:{top}");
        if let Some(CacheValue::Ranking(ranked)) = self.cached(&key).await {
            return Ok(ranked);
        }

        let rows = self
            .sales
            .line_sales_between(self.start_of(day), self.start_of(day + TimeDelta::days(1)))
            .await?;
        let ranked = Arc::new(rank_products(&rows, RankBy::Profit, top));
        self.remember(key, CacheValue::Ranking(ranked.clone())).await;
        Ok(ranked)
    }

    /// The most recent `top` days (default 15) with at least one cart,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` if `top` is outside `1..=100`.
    #[instrument(skip(self))]
    pub async fn available_dates(
        &self,
        top: Option<i64>,
    ) -> Result<Arc<Vec<NaiveDate>>, ServiceError> {
        let top = bounded("top", top, DEFAULT_DATES_TOP, MAX_TOP)?;
        let key = format!("dates:{top}");
        if let Some(CacheValue::Dates(dates)) = self.cached(&key).await {
            return Ok(dates);
        }

        let dates = Arc::new(
            self.sales
                .recent_order_days(top, self.offset.local_minus_utc())
                .await?,
        );
        self.remember(key, CacheValue::Dates(dates.clone())).await;
        Ok(dates)
    }

    /// Headline figures for the last `days` days (default 7).
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` if `days` is outside `1..=366`.
    #[instrument(skip(self))]
    pub async fn kpis(&self, days: Option<i64>) -> Result<KpiSummary, ServiceError> {
        let days = bounded("days", days, DEFAULT_KPI_DAYS, MAX_DAYS)?;
        let key = format!("kpis:{days}");
        if let Some(CacheValue::Kpis(summary)) = self.cached(&key).await {
            return Ok(summary);
        }

        let (_, from, to) = self.window(days);
        let carts = self.sales.cart_totals_between(from, to).await?;
        let lines = self.sales.line_sales_between(from, to).await?;

        let order_count = count(carts.len());
        let total_revenue: Decimal = carts.iter().map(|c| c.total).sum();
        let average_order_value = if order_count == 0 {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(order_count)).round_dp(2)
        };

        let summary = KpiSummary {
            days,
            total_revenue,
            order_count,
            average_order_value,
            units_sold: lines.iter().map(|l| i64::from(l.quantity)).sum(),
            gross_profit: lines.iter().map(LineSaleRow::profit).sum(),
            guest_order_count: count(carts.iter().filter(|c| c.is_guest).count()),
        };
        self.remember(key, CacheValue::Kpis(summary.clone())).await;
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::{NewCart, NewCartLine};
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use norkys_core::{CartOwner, CartStatus, DeliveryInfo, PaymentMethod, UserId};

    /// 2026-10-19 10:00 in Lima (UTC-5).
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap()
    }

    fn utc(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    fn lima() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn cart(lines: &[(i32, i32, i64)], guest: bool) -> NewCart {
        let owner = if guest {
            CartOwner::Guest(norkys_core::GuestContact {
                name: "Ana".to_owned(),
                surname: "Torres".to_owned(),
                email: norkys_core::Email::parse("ana@example.com").unwrap(),
                national_id: "45678912".to_owned(),
            })
        } else {
            CartOwner::Registered {
                user_id: UserId::new(2),
            }
        };
        NewCart {
            owner,
            delivery: DeliveryInfo {
                title: "Home".to_owned(),
                address: "123 Main".to_owned(),
                reference: None,
                phone_primary: "555-0100".to_owned(),
                phone_secondary: None,
                location: None,
            },
            lines: lines
                .iter()
                .map(|&(item, quantity, cents)| NewCartLine {
                    item_id: ItemId::new(item),
                    quantity,
                    unit_price: Decimal::new(cents, 2),
                })
                .collect(),
        }
    }

    async fn engine() -> (Arc<MemoryStore>, SalesAnalytics) {
        let store = Arc::new(MemoryStore::new(UserId::new(1)));
        store.seed_demo().await;
        let analytics =
            SalesAnalytics::new(store.clone(), lima(), Duration::ZERO).with_clock(fixed_now);
        (store, analytics)
    }

    async fn place(
        store: &MemoryStore,
        at: DateTime<Utc>,
        lines: &[(i32, i32, i64)],
        method: Option<&str>,
        guest: bool,
    ) {
        store
            .insert_cart_at(
                &cart(lines, guest),
                at,
                CartStatus::Completed,
                method.and_then(PaymentMethod::parse),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_daily_series_has_one_bucket_per_day() {
        let (store, analytics) = engine().await;
        // 03:00 UTC on the 19th is still the 18th in Lima.
        place(&store, utc(19, 3), &[(7, 2, 900)], None, false).await;
        place(&store, utc(19, 14), &[(1, 1, 2190)], None, false).await;

        let series = analytics.daily_sales(Some(3)).await.unwrap();
        let days: Vec<NaiveDate> = series.iter().map(|b| b.day).collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            ]
        );
        assert_eq!(series[0].orders, 0);
        assert_eq!(series[1].total, Decimal::new(1800, 2));
        assert_eq!(series[2].total, Decimal::new(2190, 2));
    }

    #[tokio::test]
    async fn test_daily_series_without_data_is_zero_filled() {
        let (_, analytics) = engine().await;
        let series = analytics.daily_sales(None).await.unwrap();
        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|b| b.orders == 0 && b.total == Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_window_bounds_are_validated() {
        let (_, analytics) = engine().await;
        for days in [0, -3, 367] {
            assert!(matches!(
                analytics.daily_sales(Some(days)).await,
                Err(ServiceError::Validation(ValidationError::OutOfRange { field: "days", .. }))
            ));
        }
        assert!(analytics.daily_sales(Some(366)).await.is_ok());
        assert!(matches!(
            analytics.top_by_quantity(None, Some(101)).await,
            Err(ServiceError::Validation(ValidationError::OutOfRange { field: "top", .. }))
        ));
    }

    #[tokio::test]
    async fn test_top_by_quantity_breaks_ties_by_item_id() {
        let (store, analytics) = engine().await;
        let at = fixed_now() - TimeDelta::days(2);
        place(&store, at, &[(4, 3, 1290), (2, 3, 3790)], None, false).await;
        place(&store, at, &[(7, 5, 900), (5, 1, 890)], None, false).await;

        let ranked = analytics.top_by_quantity(None, Some(3)).await.unwrap();
        let ids: Vec<i32> = ranked.iter().map(|r| r.item_id.as_i32()).collect();
        assert_eq!(ids, vec![7, 2, 4]);

        let all = analytics.top_by_quantity(None, Some(50)).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_profit_uses_captured_price_and_cost_basis() {
        let (store, analytics) = engine().await;
        let at = fixed_now() - TimeDelta::days(1);
        // Item 7 cost 3.50; sold at 9.00 and at a discounted 5.00.
        place(&store, at, &[(7, 2, 900)], None, false).await;
        place(&store, at, &[(7, 1, 500), (6, 10, 990)], None, false).await;

        let ranked = analytics.top_by_profit(Some(7), Some(5)).await.unwrap();
        assert_eq!(ranked[0].item_id, ItemId::new(6));
        assert_eq!(ranked[0].profit, Decimal::new(4700, 2));
        assert_eq!(ranked[1].item_id, ItemId::new(7));
        assert_eq!(ranked[1].profit, Decimal::new(1250, 2));
        assert_eq!(ranked[1].quantity, 3);
    }

    #[tokio::test]
    async fn test_profit_on_date_rejects_unrepresentable_years() {
        let (_, analytics) = engine().await;
        let east = SalesAnalytics::new(
            Arc::new(MemoryStore::new(UserId::new(1))),
            FixedOffset::east_opt(5 * 3600).unwrap(),
            Duration::ZERO,
        )
        .with_clock(fixed_now);

        for engine in [&analytics, &east] {
            for date in ["+262142-12-31", "-262143-01-01", "0000-06-01", "+10000-01-01"] {
                assert!(
                    matches!(
                        engine.top_by_profit_on(Some(date), None).await,
                        Err(ServiceError::Validation(ValidationError::InvalidDate(_)))
                    ),
                    "{date}"
                );
            }
        }
        assert!(parse_day("9999-12-31").is_ok());
        assert!(parse_day("0001-01-01").is_ok());
    }

    #[tokio::test]
    async fn test_profit_on_date_uses_reporting_day() {
        let (store, analytics) = engine().await;
        place(&store, utc(16, 4), &[(1, 1, 2190)], None, false).await;
        place(&store, utc(16, 6), &[(3, 1, 6990)], None, false).await;

        let ranked = analytics
            .top_by_profit_on(Some("2026-10-15"), None)
            .await
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item_id, ItemId::new(1));

        assert!(matches!(
            analytics.top_by_profit_on(Some("15/10/2026"), None).await,
            Err(ServiceError::Validation(ValidationError::InvalidDate(_)))
        ));
        assert!(analytics.top_by_profit_on(None, None).await.is_err());
    }

    #[tokio::test]
    async fn test_payment_methods_sorted_by_orders_then_label() {
        let (store, analytics) = engine().await;
        let at = fixed_now() - TimeDelta::days(400);
        place(&store, at, &[(1, 1, 2190)], Some("card"), false).await;
        place(&store, at, &[(1, 1, 2190)], Some("cash"), false).await;
        place(&store, at, &[(1, 2, 2190)], Some("cash"), false).await;
        place(&store, at, &[(1, 1, 2190)], Some("yape"), false).await;
        place(&store, at, &[(1, 1, 2190)], None, false).await;

        let shares = analytics.payment_methods().await.unwrap();
        let labels: Vec<&str> = shares.iter().map(|s| s.method.as_str()).collect();
        assert_eq!(labels, vec!["cash", "card", "yape"]);
        assert_eq!(shares[0].orders, 2);
        assert_eq!(shares[0].total, Decimal::new(6570, 2));
    }

    #[tokio::test]
    async fn test_available_dates_newest_first() {
        let (store, analytics) = engine().await;
        for day in [10, 12, 12, 18] {
            place(&store, utc(day, 17), &[(1, 1, 2190)], None, false).await;
        }

        let dates = analytics.available_dates(Some(2)).await.unwrap();
        assert_eq!(
            *dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_kpis() {
        let (store, analytics) = engine().await;
        let at = fixed_now() - TimeDelta::hours(3);
        place(&store, at, &[(7, 2, 900)], Some("cash"), true).await;
        place(&store, at, &[(1, 1, 2190)], None, false).await;
        place(&store, at - TimeDelta::days(30), &[(3, 9, 6990)], None, false).await;

        let kpis = analytics.kpis(None).await.unwrap();
        assert_eq!(kpis.days, 7);
        assert_eq!(kpis.order_count, 2);
        assert_eq!(kpis.total_revenue, Decimal::new(3990, 2));
        assert_eq!(kpis.average_order_value, Decimal::new(1995, 2));
        assert_eq!(kpis.units_sold, 3);
        // (9.00 - 3.50) * 2 + (21.90 - 9.80)
        assert_eq!(kpis.gross_profit, Decimal::new(2310, 2));
        assert_eq!(kpis.guest_order_count, 1);
    }

    #[tokio::test]
    async fn test_kpis_without_orders_are_zero() {
        let (_, analytics) = engine().await;
        let kpis = analytics.kpis(Some(1)).await.unwrap();
        assert_eq!(kpis.order_count, 0);
        assert_eq!(kpis.average_order_value, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_cached_views_are_reused() {
        let store = Arc::new(MemoryStore::new(UserId::new(1)));
        store.seed_demo().await;
        let analytics = SalesAnalytics::new(store.clone(), lima(), Duration::from_secs(60))
            .with_clock(fixed_now);

        let before = analytics.kpis(None).await.unwrap();
        place(&store, fixed_now(), &[(7, 2, 900)], None, false).await;
        let after = analytics.kpis(None).await.unwrap();
        assert_eq!(before, after);
    }
}
