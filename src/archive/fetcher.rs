//! Abstraction over fetching archived content.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;

/// A stream of body chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// A response body being streamed.
pub struct StreamedBody {
    /// Value of the Content-Type header, if any.
    pub content_type: Option<String>,

    /// Value of the Content-Length header, if any.
    pub content_length: Option<u64>,

    pub stream: ByteStream,
}

/// Source of archived pages and files.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Fetch a URL and return its body as text.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// Fetch a URL and return its body as a stream of chunks.
    async fn fetch_stream(&self, url: &str) -> Result<StreamedBody>;
}

/// In-memory archive for tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use futures::stream::{self, StreamExt};

    use super::*;
    use crate::error::Error;

    #[derive(Clone)]
    struct Route {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    }

    /// Serves canned responses and counts requests per URL.
    ///
    /// A route key ending in `*` matches every URL starting with the rest of the key.
    #[derive(Default)]
    pub struct MemoryArchive {
        routes: Mutex<HashMap<String, Route>>,
        hits: Mutex<HashMap<String, usize>>,
    }

    impl MemoryArchive {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(self, url: &str, body: &str) -> Self {
            self.route(url, 200, Some("text/html"), body.as_bytes())
        }

        pub fn file(self, url: &str, body: &[u8]) -> Self {
            self.route(url, 200, Some("video/mp4"), body)
        }

        pub fn status(self, url: &str, status: u16) -> Self {
            self.route(url, status, None, b"")
        }

        pub fn route(self, url: &str, status: u16, content_type: Option<&str>, body: &[u8]) -> Self {
            self.routes.lock().unwrap().insert(
                url.to_string(),
                Route {
                    status,
                    content_type: content_type.map(str::to_string),
                    body: body.to_vec(),
                },
            );
            self
        }

        /// Number of requests made to URLs starting with `prefix`.
        pub fn hits(&self, prefix: &str) -> usize {
            self.hits
                .lock()
                .unwrap()
                .iter()
                .filter(|(url, _)| url.starts_with(prefix))
                .map(|(_, n)| n)
                .sum()
        }

        fn lookup(&self, url: &str) -> Result<Route> {
            *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;

            let routes = self.routes.lock().unwrap();
            let route = routes.get(url).cloned().or_else(|| {
                routes
                    .iter()
                    .filter_map(|(key, route)| {
                        key.strip_suffix('*')
                            .filter(|prefix| url.starts_with(prefix))
                            .map(|prefix| (prefix.len(), route))
                    })
                    .max_by_key(|(len, _)| *len)
                    .map(|(_, route)| route.clone())
            });

            match route {
                Some(route) if route.status == 200 => Ok(route),
                Some(route) if route.status == 429 => Err(Error::RateLimited(url.to_string())),
                Some(route) => Err(Error::Fetch(format!("HTTP {} for {}", route.status, url))),
                None => Err(Error::Fetch(format!("HTTP 404 Not Found for {}", url))),
            }
        }
    }

    #[async_trait]
    impl ArchiveFetcher for MemoryArchive {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            let route = self.lookup(url)?;
            Ok(String::from_utf8_lossy(&route.body).into_owned())
        }

        async fn fetch_stream(&self, url: &str) -> Result<StreamedBody> {
            let route = self.lookup(url)?;
            let chunks: Vec<Result<Bytes>> = route
                .body
                .chunks(4)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect();

            Ok(StreamedBody {
                content_type: route.content_type,
                content_length: Some(route.body.len() as u64),
                stream: stream::iter(chunks).boxed(),
            })
        }
    }
}
