// Paged collection walking
//
// The controller pages list endpoints with `currentPage`/`currentPageSize`
// query parameters and answers with `{currentPage, currentSize, totalRows,
// data}`. There is no explicit "last page" flag: a walk is exhausted once
// `totalRows <= currentPage * currentSize`, or as soon as a page comes back
// empty.
//
// `PageCursor` holds the bookkeeping and is shared by the async `Pager` and
// the closure-driven `BlockingPager`. The cursor only moves after a fetch has
// fully completed, so dropping an in-flight `next()` leaves it untouched.

use std::future::Future;
use std::marker::PhantomData;

use futures_core::Stream;
use serde::Deserialize;
use tracing::trace;

use crate::error::Error;

/// Page size used when neither the client nor the caller picks one.
pub const DEFAULT_PAGE_SIZE: u32 = 1024;

// ── Wire shape ───────────────────────────────────────────────────────

/// The `result` payload of a paged endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub current_page: u32,
    /// Page size the controller applied to this request.
    pub current_size: u32,
    /// Live row count at fetch time. May drift between pages.
    pub total_rows: u64,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

// ── Query descriptor ─────────────────────────────────────────────────

/// Everything needed to fetch any page of one collection: the endpoint
/// path, the requested page size, and endpoint-specific filter params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    path: String,
    page_size: u32,
    params: Vec<(&'static str, String)>,
}

impl PageQuery {
    pub fn new(path: impl Into<String>, page_size: u32) -> Self {
        Self {
            path: path.into(),
            page_size,
            params: Vec::new(),
        }
    }

    /// Attach filter parameters sent along with every page request.
    pub fn with_params(mut self, params: Vec<(&'static str, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Full query string parameters for fetching `page`.
    pub fn params_for(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = self.params.clone();
        params.push(("currentPage", page.to_string()));
        params.push(("currentPageSize", self.page_size.to_string()));
        params
    }
}

/// Fetches a single page of a collection described by a [`PageQuery`].
///
/// [`OmadaClient`](crate::OmadaClient) implements this over HTTP; tests
/// plug in an in-memory collection.
pub trait PageFetcher<T> {
    fn fetch_page(
        &self,
        query: &PageQuery,
        page: u32,
    ) -> impl Future<Output = Result<Page<T>, Error>> + Send;
}

// ── Bookkeeping ──────────────────────────────────────────────────────

/// Position of a walk over a paged collection.
///
/// Starts `Active` on the requested page and becomes `Exhausted` (terminal)
/// once a fetched page shows nothing is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    current_page: u32,
    has_next: bool,
    total_rows: Option<u64>,
}

impl PageCursor {
    /// `None` starts at page 1. Page numbers are 1-based, so 0 is bumped to 1.
    pub fn new(start_page: Option<u32>) -> Self {
        Self {
            current_page: start_page.unwrap_or(1).max(1),
            has_next: true,
            total_rows: None,
        }
    }

    /// The next page that will be fetched.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Row count reported by the most recent page, if any was fetched.
    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows
    }

    /// Fail with [`Error::AllPagesLoaded`] once exhausted.
    pub fn ensure_active(&self) -> Result<(), Error> {
        if self.has_next {
            Ok(())
        } else {
            Err(Error::AllPagesLoaded)
        }
    }

    /// Record a fetched page and hand back its items.
    pub fn advance<T>(&mut self, page: Page<T>) -> Vec<T> {
        let covered = u64::from(page.current_page) * u64::from(page.current_size);
        let empty = page.current_size == 0 || page.data.is_empty();

        self.current_page = page.current_page.saturating_add(1);
        self.total_rows = Some(page.total_rows);
        self.has_next = !empty && page.total_rows > covered;

        trace!(
            page = page.current_page,
            size = page.current_size,
            total_rows = page.total_rows,
            has_next = self.has_next,
            "page loaded"
        );

        page.data
    }
}

// ── Async pager ──────────────────────────────────────────────────────

/// Walks a paged endpoint one request at a time.
///
/// Pages are fetched strictly in order and never prefetched. `next()`
/// takes `&mut self`, so a pager can't be stepped from two tasks at once;
/// the fetcher itself may be shared by any number of pagers.
pub struct Pager<'a, F, T> {
    fetcher: &'a F,
    query: PageQuery,
    cursor: PageCursor,
    _item: PhantomData<fn() -> T>,
}

impl<'a, F, T> Pager<'a, F, T>
where
    F: PageFetcher<T>,
{
    pub fn new(fetcher: &'a F, query: PageQuery, start_page: Option<u32>) -> Self {
        Self {
            fetcher,
            query,
            cursor: PageCursor::new(start_page),
            _item: PhantomData,
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }

    pub fn total_rows(&self) -> Option<u64> {
        self.cursor.total_rows()
    }

    pub fn current_page(&self) -> u32 {
        self.cursor.current_page()
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    /// Fetch the next page and return its items.
    pub async fn next(&mut self) -> Result<Vec<T>, Error> {
        self.cursor.ensure_active()?;
        let page = self
            .fetcher
            .fetch_page(&self.query, self.cursor.current_page())
            .await?;
        Ok(self.cursor.advance(page))
    }

    /// Fetch every remaining page, concatenated in fetch order.
    ///
    /// A failing page aborts the walk; items gathered so far are dropped.
    pub async fn all(&mut self) -> Result<Vec<T>, Error> {
        let mut data = Vec::new();
        while self.has_next() {
            data.extend(self.next().await?);
        }
        Ok(data)
    }

    /// Yield the remaining items one at a time, fetching pages on demand.
    pub fn into_stream(self) -> impl Stream<Item = Result<T, Error>> + 'a
    where
        T: 'a,
    {
        let mut pager = self;
        async_stream::try_stream! {
            while pager.has_next() {
                for item in pager.next().await? {
                    yield item;
                }
            }
        }
    }
}

// ── Blocking pager ───────────────────────────────────────────────────

/// Synchronous counterpart of [`Pager`] for callers whose fetch function
/// blocks the calling thread.
///
/// Also an [`Iterator`] over pages, ending once the walk is exhausted.
pub struct BlockingPager<F, T> {
    fetch: F,
    query: PageQuery,
    cursor: PageCursor,
    _item: PhantomData<fn() -> T>,
}

impl<F, T> BlockingPager<F, T>
where
    F: FnMut(&PageQuery, u32) -> Result<Page<T>, Error>,
{
    pub fn new(fetch: F, query: PageQuery, start_page: Option<u32>) -> Self {
        Self {
            fetch,
            query,
            cursor: PageCursor::new(start_page),
            _item: PhantomData,
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }

    pub fn total_rows(&self) -> Option<u64> {
        self.cursor.total_rows()
    }

    pub fn current_page(&self) -> u32 {
        self.cursor.current_page()
    }

    pub fn next_page(&mut self) -> Result<Vec<T>, Error> {
        self.cursor.ensure_active()?;
        let page = (self.fetch)(&self.query, self.cursor.current_page())?;
        Ok(self.cursor.advance(page))
    }

    pub fn all(&mut self) -> Result<Vec<T>, Error> {
        let mut data = Vec::new();
        while self.has_next() {
            data.extend(self.next_page()?);
        }
        Ok(data)
    }
}

impl<F, T> Iterator for BlockingPager<F, T>
where
    F: FnMut(&PageQuery, u32) -> Result<Page<T>, Error>,
{
    type Item = Result<Vec<T>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.has_next().then(|| self.next_page())
    }
}
