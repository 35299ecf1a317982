//! Cookie enumeration
//!
//! The engine delivers cookies to a visitor on its own thread, one call per
//! cookie, tagged with `index` and the declared `total`. An enumeration is
//! complete once every index below `total` has been seen. Calls may repeat or
//! arrive out of order; a repeated index counts once.

use corvid_engine::{CookieStore, CookieVisitor, EngineCookie};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::error::SessionError;
use crate::Result;

pub const DEFAULT_COOKIE_TIMEOUT: Duration = Duration::from_secs(5);

type Completion = oneshot::Sender<Result<Vec<EngineCookie>>>;

/// Visitor that gathers a full enumeration and reports it exactly once.
pub struct CookieCollector {
    cookies: BTreeMap<usize, EngineCookie>,
    total: Option<usize>,
    done: Option<Completion>,
}

impl CookieCollector {
    pub fn new() -> (Self, oneshot::Receiver<Result<Vec<EngineCookie>>>) {
        let (tx, rx) = oneshot::channel();
        let collector = Self {
            cookies: BTreeMap::new(),
            total: None,
            done: Some(tx),
        };
        (collector, rx)
    }

    fn finish(&mut self, result: Result<Vec<EngineCookie>>) {
        if let Some(done) = self.done.take() {
            // Receiver gone means the caller stopped waiting
            let _ = done.send(result);
        }
    }
}

impl CookieVisitor for CookieCollector {
    fn visit(&mut self, cookie: &EngineCookie, index: usize, total: usize) -> bool {
        if self.done.is_none() {
            return false;
        }

        // A visit with a bad index still means the jar is not empty
        self.total = Some(total);

        if index >= total {
            tracing::warn!(index, total, "Ignoring cookie outside declared range");
            return true;
        }

        self.cookies.entry(index).or_insert_with(|| cookie.clone());

        if self.cookies.len() >= total {
            let cookies = std::mem::take(&mut self.cookies).into_values().collect();
            self.finish(Ok(cookies));
            return false;
        }

        true
    }
}

impl Drop for CookieCollector {
    fn drop(&mut self) {
        if self.done.is_none() {
            return;
        }

        match self.total {
            // Released without a single visit: the jar is empty
            None => self.finish(Ok(Vec::new())),
            Some(total) if self.cookies.len() >= total => self.finish(Ok(Vec::new())),
            Some(total) => {
                let visited = self.cookies.len();
                self.finish(Err(SessionError::IncompleteCookieEnumeration { visited, total }));
            }
        }
    }
}

/// Enumerate every cookie in `store`, waiting at most `timeout` for the
/// enumeration to complete.
pub async fn collect_cookies(
    store: &dyn CookieStore,
    timeout: Duration,
) -> Result<Vec<EngineCookie>> {
    let (collector, rx) = CookieCollector::new();

    if !store.visit_all_cookies(Box::new(collector)) {
        return Err(SessionError::CookieStoreUnavailable);
    }

    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(SessionError::CookieStoreUnavailable),
        Err(_) => {
            tracing::warn!(timeout = ?timeout, "Cookie enumeration timed out");
            Err(SessionError::CookieTimeout(timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_engine::headless::HeadlessCookieStore;
    use parking_lot::Mutex;

    fn cookie(name: &str) -> EngineCookie {
        EngineCookie {
            name: name.into(),
            value: "v".into(),
            domain: "example.com".into(),
            path: "/".into(),
            secure: false,
            http_only: false,
            expires: None,
        }
    }

    /// Replays a fixed sequence of `(name, index, total)` visits from another
    /// thread, then drops the visitor.
    struct ScriptedStore {
        visits: Vec<(&'static str, usize, usize)>,
    }

    impl CookieStore for ScriptedStore {
        fn visit_all_cookies(&self, mut visitor: Box<dyn CookieVisitor>) -> bool {
            let visits = self.visits.clone();
            std::thread::spawn(move || {
                for (name, index, total) in visits {
                    visitor.visit(&cookie(name), index, total);
                }
            });
            true
        }

        fn set_cookie(&self, _url: &str, _cookie: EngineCookie) -> bool {
            false
        }
    }

    /// Holds on to the visitor forever.
    #[derive(Default)]
    struct StalledStore {
        held: Mutex<Vec<Box<dyn CookieVisitor>>>,
    }

    impl CookieStore for StalledStore {
        fn visit_all_cookies(&self, visitor: Box<dyn CookieVisitor>) -> bool {
            self.held.lock().push(visitor);
            true
        }

        fn set_cookie(&self, _url: &str, _cookie: EngineCookie) -> bool {
            false
        }
    }

    struct ClosedStore;

    impl CookieStore for ClosedStore {
        fn visit_all_cookies(&self, _visitor: Box<dyn CookieVisitor>) -> bool {
            false
        }

        fn set_cookie(&self, _url: &str, _cookie: EngineCookie) -> bool {
            false
        }
    }

    fn names(cookies: &[EngineCookie]) -> Vec<&str> {
        cookies.iter().map(|c| c.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_collects_headless_store() {
        let store = HeadlessCookieStore::new();
        store.set_cookie("http://example.com/", cookie("a"));
        store.set_cookie("http://example.com/", cookie("b"));

        let cookies = collect_cookies(&store, DEFAULT_COOKIE_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(names(&cookies), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_store_completes() {
        let store = HeadlessCookieStore::new();
        let cookies = collect_cookies(&store, DEFAULT_COOKIE_TIMEOUT)
            .await
            .unwrap();
        assert!(cookies.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_order_and_duplicate_visits() {
        let store = ScriptedStore {
            visits: vec![("c", 2, 3), ("a", 0, 3), ("a-again", 0, 3), ("b", 1, 3)],
        };

        let cookies = collect_cookies(&store, DEFAULT_COOKIE_TIMEOUT)
            .await
            .unwrap();
        // Ordered by index; the repeated index keeps its first cookie
        assert_eq!(names(&cookies), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_duplicates_do_not_complete_early() {
        let store = ScriptedStore {
            visits: vec![("a", 0, 2), ("a", 0, 2)],
        };

        let err = collect_cookies(&store, DEFAULT_COOKIE_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::IncompleteCookieEnumeration {
                visited: 1,
                total: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_stalled_store_times_out() {
        let store = StalledStore::default();
        let err = collect_cookies(&store, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::CookieTimeout(_)));
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let err = collect_cookies(&ClosedStore, DEFAULT_COOKIE_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::CookieStoreUnavailable));
    }

    #[test]
    fn test_out_of_range_visits_are_incomplete() {
        let (mut collector, mut rx) = CookieCollector::new();

        assert!(collector.visit(&cookie("a"), 1, 1));
        assert!(collector.visit(&cookie("b"), 3, 1));
        drop(collector);

        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(
            err,
            SessionError::IncompleteCookieEnumeration {
                visited: 0,
                total: 1
            }
        ));
    }

    #[test]
    fn test_collector_stops_after_completion() {
        let (mut collector, mut rx) = CookieCollector::new();

        assert!(!collector.visit(&cookie("only"), 0, 1));
        assert!(!collector.visit(&cookie("late"), 0, 1));
        drop(collector);

        let cookies = rx.try_recv().unwrap().unwrap();
        assert_eq!(names(&cookies), vec!["only"]);
    }
}
