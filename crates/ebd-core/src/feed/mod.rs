//! Order status feed: fetch the RSS document for an e-mail address and turn
//! its items into [`Scene`]s.
//!
//! Each `get_items` call fetches the feed again; the returned iterator streams
//! items out of that one document and cannot be restarted.

mod parse;

pub use parse::DescriptionFields;

use crate::error::{EntryError, FeedError};
use crate::events::{Observer, RunEvent};
use crate::retry::{run_with_retry, RetryPolicy};
use crate::scene::Scene;
use crate::transport::Transport;
use crate::url_model::normalize_host;
use parse::{ItemReader, RawItem};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which orders to download. Parsed from the command line; `ALL` selects every order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderFilter {
    All,
    Order(String),
}

impl OrderFilter {
    pub const ALL: &'static str = "ALL";

    pub fn matches(&self, order_id: &str) -> bool {
        match self {
            OrderFilter::All => true,
            OrderFilter::Order(id) => id == order_id,
        }
    }
}

impl FromStr for OrderFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s == Self::ALL {
            OrderFilter::All
        } else {
            OrderFilter::Order(s.to_string())
        })
    }
}

impl fmt::Display for OrderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderFilter::All => f.write_str(Self::ALL),
            OrderFilter::Order(id) => f.write_str(id),
        }
    }
}

/// Validated feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub link: String,
    pub fields: DescriptionFields,
}

impl TryFrom<RawItem> for FeedEntry {
    type Error = EntryError;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        let link = raw
            .link
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .ok_or(EntryError::MissingLink)?;
        let description = raw.description.ok_or(EntryError::MissingDescription)?;
        let fields = DescriptionFields::parse(&description)?;
        Ok(FeedEntry { link, fields })
    }
}

/// Status feed of one user.
pub struct FeedSource {
    feed_url: String,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn Observer>,
    retry: RetryPolicy,
}

impl FeedSource {
    pub fn new(
        host: &str,
        email: &str,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn Observer>,
        retry: RetryPolicy,
    ) -> Self {
        let feed_url = format!(
            "{}/ordering/status/{}/rss/",
            normalize_host(host),
            email.trim()
        );
        Self {
            feed_url,
            transport,
            observer,
            retry,
        }
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// Fetches the feed and returns the scenes matching `filter`, lazily.
    ///
    /// A fetch failure is returned directly. An XML error later in the
    /// document is yielded once as `Err`, after which the iterator ends.
    pub fn get_items(&self, filter: &OrderFilter) -> Result<SceneIter, FeedError> {
        let observer = &self.observer;
        let document = run_with_retry(
            &self.retry,
            |attempt, error, delay| {
                observer.run(RunEvent::FeedRetry {
                    attempt,
                    error,
                    delay,
                })
            },
            |_| self.transport.get_bytes(&self.feed_url),
        )
        .map_err(|source| FeedError::Fetch {
            url: self.feed_url.clone(),
            source,
        })?;

        Ok(SceneIter {
            items: ItemReader::new(document),
            filter: filter.clone(),
            observer: Arc::clone(&self.observer),
            done: false,
        })
    }
}

/// Lazy, single-pass sequence of scenes from one fetched feed document.
pub struct SceneIter {
    items: ItemReader,
    filter: OrderFilter,
    observer: Arc<dyn Observer>,
    done: bool,
}

impl Iterator for SceneIter {
    type Item = Result<Scene, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let raw = match self.items.next_item() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(FeedError::Xml(e)));
                }
            };

            let scene = FeedEntry::try_from(raw).and_then(|entry| {
                self.observer.run(RunEvent::EntryRead {
                    order_id: &entry.fields.order_id,
                    status: entry.fields.status.as_deref(),
                });
                if self.filter.matches(&entry.fields.order_id) {
                    Scene::new(&entry.link, &entry.fields.order_id).map(Some)
                } else {
                    Ok(None)
                }
            });
            match scene {
                Ok(Some(scene)) => return Some(Ok(scene)),
                Ok(None) => {}
                Err(error) => self.observer.run(RunEvent::EntrySkipped { error: &error }),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::recording::RecordingObserver;
    use crate::transport::memory::{MemoryTransport, Reply};
    use std::time::Duration;

    const FEED_URL: &str = "http://espa.example.org/ordering/status/a@b.c/rss/";

    fn item(link: &str, order: &str) -> String {
        format!(
            "<item><title>x</title><link>{}</link>\
             <description>scene_status:complete,orderid:{},orderdate:2024-01-01</description></item>",
            link, order
        )
    }

    fn feed(items: &[String]) -> String {
        format!(
            "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel>\
             <title>ESPA Status Feed</title><link>http://espa.example.org/</link>{}</channel></rss>",
            items.concat()
        )
    }

    fn source(transport: MemoryTransport, observer: Arc<RecordingObserver>) -> (FeedSource, Arc<MemoryTransport>) {
        let transport = Arc::new(transport);
        let src = FeedSource::new(
            "espa.example.org",
            "a@b.c",
            transport.clone(),
            observer,
            RetryPolicy::default(),
        );
        (src, transport)
    }

    fn two_orders() -> String {
        feed(&[
            item("http://host/L1/LT81234.tar.gz", "A"),
            item("http://host/L1/LT85678.tar.gz", "B"),
            item("http://host/L1/LT89999.tar.gz", "A"),
        ])
    }

    #[test]
    fn order_filter_parse() {
        assert_eq!("ALL".parse::<OrderFilter>().unwrap(), OrderFilter::All);
        assert_eq!(
            "order42".parse::<OrderFilter>().unwrap(),
            OrderFilter::Order("order42".into())
        );
        assert_eq!(OrderFilter::All.to_string(), "ALL");
    }

    #[test]
    fn feed_url_from_host_and_email() {
        let (src, _) = source(MemoryTransport::new(), Arc::default());
        assert_eq!(src.feed_url(), FEED_URL);
    }

    #[test]
    fn example_entry_becomes_scene() {
        let body = feed(&[item("http://host/L1/LT81234.tar.gz", "order42")]);
        let (src, _) = source(MemoryTransport::new().with_body(FEED_URL, body), Arc::default());
        let scenes: Vec<Scene> = src
            .get_items(&OrderFilter::All)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(scenes.len(), 1);
        let s = &scenes[0];
        assert_eq!(s.order_id(), "order42");
        assert_eq!(s.filename(), "LT81234.tar.gz");
        assert_eq!(s.name(), "LT81234");
        assert_eq!(s.checksum_url(), "http://host/L1/LT81234.md5");
    }

    #[test]
    fn filter_by_order() {
        let (src, _) = source(
            MemoryTransport::new().with_body(FEED_URL, two_orders()),
            Arc::default(),
        );
        let only_a: Vec<Scene> = src
            .get_items(&OrderFilter::Order("A".into()))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(only_a.len(), 2);
        assert!(only_a.iter().all(|s| s.order_id() == "A"));

        let all: Vec<Scene> = src
            .get_items(&OrderFilter::All)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().any(|s| s.order_id() == "B"));
    }

    #[test]
    fn every_call_refetches() {
        let (src, transport) = source(
            MemoryTransport::new().with_body(FEED_URL, two_orders()),
            Arc::default(),
        );
        let _ = src.get_items(&OrderFilter::All).unwrap().count();
        let _ = src.get_items(&OrderFilter::All).unwrap().count();
        assert_eq!(transport.count(FEED_URL), 2);
    }

    #[test]
    fn malformed_entries_are_skipped_with_warning() {
        let body = feed(&[
            "<item><link>http://host/a.tar.gz</link><description>no fields here</description></item>"
                .to_string(),
            "<item><description>scene_status:complete,orderid:A,orderdate:x</description></item>"
                .to_string(),
            item("http://host/L1/LT81234.tar.gz", "A"),
        ]);
        let observer = Arc::new(RecordingObserver::default());
        let (src, _) = source(MemoryTransport::new().with_body(FEED_URL, body), observer.clone());
        let scenes: Vec<Scene> = src
            .get_items(&OrderFilter::All)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(scenes.len(), 1);
        let skipped = observer
            .lines()
            .iter()
            .filter(|l| l.starts_with("run: skipped"))
            .count();
        assert_eq!(skipped, 2);
    }

    #[test]
    fn malformed_document_yields_error_then_ends() {
        let body = format!(
            "<rss><channel>{}<item><link>x</description></item></channel></rss>",
            item("http://host/L1/LT81234.tar.gz", "A")
        );
        let (src, _) = source(MemoryTransport::new().with_body(FEED_URL, body), Arc::default());
        let mut iter = src.get_items(&OrderFilter::All).unwrap();
        assert!(matches!(iter.next(), Some(Ok(_))));
        assert!(matches!(iter.next(), Some(Err(FeedError::Xml(_)))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn unreachable_feed_is_fetch_error() {
        let (src, _) = source(MemoryTransport::new().with_status(FEED_URL, 500), Arc::default());
        match src.get_items(&OrderFilter::All) {
            Err(FeedError::Fetch { url, .. }) => assert_eq!(url, FEED_URL),
            _ => panic!("expected fetch error"),
        }
    }

    #[test]
    fn transient_feed_errors_retried_when_configured() {
        let transport = Arc::new(MemoryTransport::new().with_replies(
            FEED_URL,
            vec![Reply::Status(503), Reply::Body(two_orders().into_bytes())],
        ));
        let observer = Arc::new(RecordingObserver::default());
        let src = FeedSource::new(
            "http://espa.example.org/",
            "a@b.c",
            transport.clone(),
            observer.clone(),
            RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
            },
        );
        assert_eq!(src.get_items(&OrderFilter::All).unwrap().count(), 3);
        assert_eq!(transport.count(FEED_URL), 2);
        assert!(observer.lines().contains(&"run: feed-retry 2".to_string()));
    }

    #[test]
    fn entries_are_reported_before_filtering() {
        let observer = Arc::new(RecordingObserver::default());
        let (src, _) = source(
            MemoryTransport::new().with_body(FEED_URL, two_orders()),
            observer.clone(),
        );
        let _ = src.get_items(&OrderFilter::Order("B".into())).unwrap().count();
        assert_eq!(
            observer.lines(),
            vec!["run: entry A", "run: entry B", "run: entry A"]
        );
    }
}
