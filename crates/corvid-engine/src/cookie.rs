//! Engine cookie jar and the visitor protocol used to enumerate it

use crate::time::EngineTime;

/// A cookie in the engine's native representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub expires: Option<EngineTime>,
}

impl EngineCookie {
    /// Cookies are keyed by name, domain and path.
    pub fn same_key(&self, other: &EngineCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

/// Callback invoked once per cookie during [`CookieStore::visit_all_cookies`].
///
/// `index` is zero-based and `total` is the number of cookies the store
/// intends to deliver. Calls may arrive on an engine thread, in any order.
/// The store drops the visitor when the enumeration is over; an empty store
/// drops it without a single call. Return `false` to stop early.
pub trait CookieVisitor: Send {
    fn visit(&mut self, cookie: &EngineCookie, index: usize, total: usize) -> bool;
}

/// The engine-global cookie jar shared by every tab.
pub trait CookieStore: Send + Sync {
    /// Start an enumeration. Returns false if the store cannot be accessed,
    /// in which case the visitor is dropped without being called.
    fn visit_all_cookies(&self, visitor: Box<dyn CookieVisitor>) -> bool;

    /// Insert or replace a cookie on behalf of `url`.
    fn set_cookie(&self, url: &str, cookie: EngineCookie) -> bool;
}
