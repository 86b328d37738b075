//! Payroll reporting over the stores.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::calculation::build_payroll_report;
use crate::config::PayrollConfig;
use crate::error::DtrResult;
use crate::models::{AttendanceEvent, PayrollRecord, PayrollReport, PersonId, ReportRange, RosterFilter};
use crate::store::{EventLog, IdentityStore};

use super::clock::Clock;

/// Computes payroll reports and exports from the identity store and the
/// event log.
///
/// Reports are read-only: computing one never writes to either store, and
/// computing the same range twice over an unchanged log gives equal reports.
pub struct PayrollService<I: IdentityStore + ?Sized, L: EventLog + ?Sized> {
    identity: Arc<I>,
    log: Arc<L>,
    clock: Arc<dyn Clock>,
    roster: RosterFilter,
}

impl<I: IdentityStore + ?Sized, L: EventLog + ?Sized> PayrollService<I, L> {
    /// Creates a service listing every registered person.
    pub fn new(identity: Arc<I>, log: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            identity,
            log,
            clock,
            roster: RosterFilter::All,
        }
    }

    /// Applies the payroll settings.
    pub fn with_config(mut self, config: &PayrollConfig) -> Self {
        self.roster = config.roster;
        self
    }

    /// Which persons the reports list.
    pub fn roster_filter(&self) -> RosterFilter {
        self.roster
    }

    /// Computes the report for clock-ins in `[start, end]`.
    ///
    /// An absent start means no lower bound and an absent end means now.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if either store fails; no partial report is
    /// returned.
    pub fn compute_report(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> DtrResult<PayrollReport> {
        self.report_for(ReportRange::new(start, end, self.clock.now()))
    }

    /// Computes the report for whole days, the end date included.
    pub fn compute_report_for_dates(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> DtrResult<PayrollReport> {
        self.report_for(ReportRange::from_dates(start, end, self.clock.now()))
    }

    /// Computes the report from raw `YYYY-MM-DD` parameters.
    ///
    /// Blank or unparsable dates are treated as absent.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use chrono::NaiveDate;
    /// use dtr_payroll::service::{ManualClock, PayrollService};
    /// use dtr_payroll::store::InMemoryStore;
    ///
    /// let now = NaiveDate::from_ymd_opt(2026, 1, 31)
    ///     .unwrap()
    ///     .and_hms_opt(17, 0, 0)
    ///     .unwrap();
    /// let store = Arc::new(InMemoryStore::new());
    /// let service = PayrollService::new(store.clone(), store, Arc::new(ManualClock::new(now)));
    ///
    /// let report = service
    ///     .compute_report_from_params(Some("2026-01-01"), Some("not a date"))
    ///     .unwrap();
    /// assert_eq!(report.range.end, now);
    /// assert!(report.rows.is_empty());
    /// ```
    pub fn compute_report_from_params(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> DtrResult<PayrollReport> {
        self.report_for(ReportRange::parse(start, end, self.clock.now()))
    }

    /// Computes the report for an already-resolved range.
    pub fn report_for(&self, range: ReportRange) -> DtrResult<PayrollReport> {
        let persons = self.identity.list_persons(self.roster)?;
        let events = self.log.query_events_in_range(&range)?;
        let report = build_payroll_report(range, &persons, &events);

        debug!(
            start = ?report.range.start,
            end = %report.range.end,
            persons = report.rows.len(),
            events = events.len(),
            grand_total = %report.grand_total,
            "Computed payroll report"
        );

        Ok(report)
    }

    /// Computes the report for `[start, end]` and flattens it into export
    /// records, one per report row in the same order.
    pub fn export_records(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> DtrResult<Vec<PayrollRecord>> {
        Ok(self.compute_report(start, end)?.to_records())
    }

    /// Export counterpart of [`compute_report_from_params`], taking the same
    /// lenient `YYYY-MM-DD` strings.
    ///
    /// [`compute_report_from_params`]: Self::compute_report_from_params
    pub fn export_records_from_params(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> DtrResult<Vec<PayrollRecord>> {
        Ok(self.compute_report_from_params(start, end)?.to_records())
    }

    /// Lists one person's attendance events with clock-ins in `range`,
    /// oldest first.
    pub fn person_events(
        &self,
        person_id: PersonId,
        range: &ReportRange,
    ) -> DtrResult<Vec<AttendanceEvent>> {
        self.log.events_for_person(person_id, range)
    }
}
