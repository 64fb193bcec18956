// Alert and event endpoints
//
// Both are paged listings filtered by level, module and search key;
// alerts additionally split into archived / unarchived.

use crate::client::OmadaClient;
use crate::error::Error;
use crate::filter::LogFilter;
use crate::models::LogEntry;
use crate::pager::Pager;

impl OmadaClient {
    /// All alerts matching `filter`, all pages.
    pub async fn get_alerts(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, Error> {
        self.page_alerts(None, None, filter).all().await
    }

    /// Pager over `GET /sites/{site}/alerts`.
    pub fn page_alerts(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
        filter: &LogFilter,
    ) -> Pager<'_, Self, LogEntry> {
        let query = self.page_query(self.site_path("/alerts"), page_size, filter.alert_params());
        self.pager(query, page)
    }

    /// All events matching `filter`, all pages.
    pub async fn get_events(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, Error> {
        self.page_events(None, None, filter).all().await
    }

    /// Pager over `GET /sites/{site}/events`.
    pub fn page_events(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
        filter: &LogFilter,
    ) -> Pager<'_, Self, LogEntry> {
        let query = self.page_query(self.site_path("/events"), page_size, filter.event_params());
        self.pager(query, page)
    }
}
