//! Forward-only traversal of paginated search results.

use crate::client::ResourceClient;
use crate::error::Result;
use crate::model::ResultPage;

/// Lazily walks the pages of one search by following continuation handles.
///
/// The first page is handed in by the caller; each later page is fetched
/// only when [`next_page`](Self::next_page) is called. Once the server stops
/// returning pages the cursor is exhausted for good and must be replaced by a
/// fresh search to start over.
pub struct PageCursor<'a, C: ?Sized> {
    client: &'a C,
    current: Option<ResultPage>,
    started: bool,
    pages_fetched: usize,
}

impl<'a, C> PageCursor<'a, C>
where
    C: ResourceClient + ?Sized,
{
    /// Creates a cursor starting at `first`; `None` yields an empty sequence.
    pub fn new(client: &'a C, first: Option<ResultPage>) -> Self {
        let pages_fetched = usize::from(first.is_some());
        Self {
            client,
            current: first,
            started: false,
            pages_fetched,
        }
    }

    /// Returns the next page, or `None` once the result set is exhausted.
    ///
    /// A page without a continuation handle ends the sequence without another
    /// request.
    ///
    /// # Errors
    ///
    /// Propagates the client's error when a page fetch fails. The cursor is
    /// exhausted afterwards.
    pub async fn next_page(&mut self) -> Result<Option<&ResultPage>> {
        if self.started {
            let Some(previous) = self.current.take() else {
                return Ok(None);
            };
            if !previous.has_next() {
                return Ok(None);
            }
            self.current = self.client.continue_search(&previous).await?;
            if self.current.is_none() {
                return Ok(None);
            }
            self.pages_fetched += 1;
        } else {
            self.started = true;
        }

        if let Some(page) = &self.current {
            tracing::debug!(
                page = self.pages_fetched,
                entries = page.len(),
                total = ?page.total,
                has_next = page.has_next(),
                "search page ready"
            );
        }
        Ok(self.current.as_ref())
    }

    /// Number of pages obtained so far, including the initial page.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.started && self.current.as_ref().is_none_or(|page| !page.has_next())
    }
}
