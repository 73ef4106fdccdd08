//! Read-only month projections.

use fieldops_shared::types::OrganizationId;

use crate::calendar::types::{CalendarMonth, MonthRange, RevenueSummary};
use crate::store::{ProjectionStore, StoreError};

/// Builds calendar and revenue views for one organization.
pub struct CalendarService<P> {
    projections: P,
}

impl<P: ProjectionStore> CalendarService<P> {
    /// Creates the service over a projection store.
    pub const fn new(projections: P) -> Self {
        Self { projections }
    }

    /// Records of `range` grouped by day.
    ///
    /// # Errors
    ///
    /// Returns the store error if the projection query fails.
    pub async fn calendar(
        &self,
        organization_id: OrganizationId,
        range: MonthRange,
    ) -> Result<CalendarMonth, StoreError> {
        let rows = self.projections.month_projection(organization_id, range).await?;
        Ok(CalendarMonth::group(range, rows))
    }

    /// Revenue totals of `range`.
    ///
    /// # Errors
    ///
    /// Returns the store error if the projection query fails.
    pub async fn revenue(
        &self,
        organization_id: OrganizationId,
        range: MonthRange,
    ) -> Result<RevenueSummary, StoreError> {
        let rows = self.projections.month_projection(organization_id, range).await?;
        Ok(RevenueSummary::summarize(range, &rows))
    }
}
