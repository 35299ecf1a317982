//! Durable cookie representation

use chrono::{DateTime, Utc};
use corvid_engine::{EngineCookie, EngineTime};
use serde::{Deserialize, Serialize};

/// Engine-independent cookie as stored in `cookies.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// Origin the cookie is set back for on restore
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
}

impl CookieRecord {
    /// Fails only if the engine expiry has no UTC equivalent.
    pub fn from_engine(cookie: &EngineCookie) -> corvid_engine::Result<Self> {
        let expires = cookie.expires.map(|t| t.to_utc()).transpose()?;

        Ok(Self {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
            url: Self::origin_url(cookie),
            expires,
            secure: cookie.secure,
            http_only: cookie.http_only,
        })
    }

    pub fn to_engine(&self) -> corvid_engine::Result<EngineCookie> {
        let expires = self.expires.map(EngineTime::from_utc).transpose()?;

        Ok(EngineCookie {
            name: self.name.clone(),
            value: self.value.clone(),
            domain: self.domain.clone(),
            path: self.path.clone(),
            secure: self.secure,
            http_only: self.http_only,
            expires,
        })
    }

    /// `scheme://domain/path` for a cookie. Leading dots of domain cookies are
    /// dropped; secure cookies get `https`.
    pub fn origin_url(cookie: &EngineCookie) -> String {
        let scheme = if cookie.secure { "https" } else { "http" };
        let host = cookie.domain.trim_start_matches('.');
        let path = if cookie.path.starts_with('/') {
            cookie.path.as_str()
        } else if cookie.path.is_empty() {
            "/"
        } else {
            return format!("{}://{}/{}", scheme, host, cookie.path);
        };

        format!("{}://{}{}", scheme, host, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cookie() -> EngineCookie {
        EngineCookie {
            name: "sid".into(),
            value: "abc".into(),
            domain: ".example.com".into(),
            path: "/app".into(),
            secure: true,
            http_only: true,
            expires: None,
        }
    }

    #[test]
    fn test_origin_url() {
        assert_eq!(CookieRecord::origin_url(&cookie()), "https://example.com/app");

        let plain = EngineCookie {
            domain: "localhost".into(),
            path: String::new(),
            secure: false,
            ..cookie()
        };
        assert_eq!(CookieRecord::origin_url(&plain), "http://localhost/");
    }

    #[test]
    fn test_expiry_round_trip() {
        let expires = Utc.with_ymd_and_hms(2030, 6, 1, 12, 30, 0).unwrap();
        let engine = EngineCookie {
            expires: Some(EngineTime::from_utc(expires).unwrap()),
            ..cookie()
        };

        let record = CookieRecord::from_engine(&engine).unwrap();
        assert_eq!(record.expires, Some(expires));
        assert_eq!(record.to_engine().unwrap(), engine);
    }

    #[test]
    fn test_unconvertible_expiry_is_an_error() {
        let record = CookieRecord {
            expires: Some(Utc.with_ymd_and_hms(1500, 1, 1, 0, 0, 0).unwrap()),
            ..CookieRecord::from_engine(&cookie()).unwrap()
        };
        assert!(record.to_engine().is_err());

        let engine = EngineCookie {
            expires: Some(EngineTime::from_micros(-1)),
            ..cookie()
        };
        assert!(CookieRecord::from_engine(&engine).is_err());
    }

    #[test]
    fn test_json_field_names() {
        let record = CookieRecord::from_engine(&cookie()).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["httpOnly"], true);
        assert_eq!(json["url"], "https://example.com/app");
        assert!(json.get("expires").is_none());
    }
}
