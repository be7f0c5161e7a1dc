use super::aggregate;
use crate::db::repository::order;
use crate::utils::SharedClock;
use crate::utils::time::{ReportWindow, business_date, parse_date};
use chrono_tz::Tz;
use shared::error::AppResult;
use shared::models::{
    KitchenStatistics, OrderDetail, PopularItems, PreparationTimeReport, SalesReport,
};
use sqlx::SqlitePool;

/// Loads a window's order history and hands it to [`aggregate`]
#[derive(Clone)]
pub struct ReportsService {
    pool: SqlitePool,
    clock: SharedClock,
    tz: Tz,
}

impl ReportsService {
    pub fn new(pool: SqlitePool, clock: SharedClock, tz: Tz) -> Self {
        Self { pool, clock, tz }
    }

    fn window(&self, start_date: &str, end_date: &str) -> AppResult<ReportWindow> {
        ReportWindow::new(parse_date(start_date)?, parse_date(end_date)?, self.tz)
    }

    async fn load(&self, window: &ReportWindow) -> AppResult<Vec<OrderDetail>> {
        let orders =
            order::find_created_between(&self.pool, window.start_millis, window.end_millis).await?;
        tracing::debug!(
            start = %window.start,
            end = %window.end,
            orders = orders.len(),
            "Loaded order history for report"
        );
        Ok(orders)
    }

    pub async fn daily_sales(&self, date: &str) -> AppResult<SalesReport> {
        let window = ReportWindow::single_day(parse_date(date)?, self.tz);
        let orders = self.load(&window).await?;
        Ok(aggregate::sales_report(&orders, &window, self.tz))
    }

    /// Seven days starting at `start_date`
    pub async fn weekly_sales(&self, start_date: &str) -> AppResult<SalesReport> {
        let window = ReportWindow::week_from(parse_date(start_date)?, self.tz)?;
        let orders = self.load(&window).await?;
        Ok(aggregate::sales_report(&orders, &window, self.tz))
    }

    pub async fn sales_between(&self, start_date: &str, end_date: &str) -> AppResult<SalesReport> {
        let window = self.window(start_date, end_date)?;
        let orders = self.load(&window).await?;
        Ok(aggregate::sales_report(&orders, &window, self.tz))
    }

    pub async fn popular_items(
        &self,
        start_date: &str,
        end_date: &str,
        limit: Option<usize>,
    ) -> AppResult<PopularItems> {
        let window = self.window(start_date, end_date)?;
        let orders = self.load(&window).await?;
        Ok(aggregate::popular_items(
            &orders,
            &window,
            limit.unwrap_or(aggregate::DEFAULT_POPULAR_LIMIT),
        ))
    }

    pub async fn preparation_time(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<PreparationTimeReport> {
        let window = self.window(start_date, end_date)?;
        let orders = self.load(&window).await?;
        Ok(aggregate::preparation_time(&orders, &window, self.tz))
    }

    /// Kitchen dashboard for today in the business timezone
    pub async fn kitchen_statistics(&self) -> AppResult<KitchenStatistics> {
        let today = business_date(self.clock.now_millis(), self.tz);
        let window = ReportWindow::single_day(today, self.tz);
        let orders = self.load(&window).await?;
        Ok(aggregate::kitchen_statistics(&orders, &window))
    }
}
