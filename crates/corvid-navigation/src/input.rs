//! Input resolution for the address bar
//!
//! Turns whatever was typed into something the engine can load. Resolution is
//! total: every input yields either `about:blank` or an absolute URL.

use std::net::IpAddr;
use url::Url;

pub const DEFAULT_SEARCH_TEMPLATE: &str = "https://www.google.com/search?q=%s";

#[derive(Debug, Clone)]
pub struct UrlResolver {
    /// Search engine URL template (%s replaced with query)
    search_template: String,
}

impl UrlResolver {
    pub fn new() -> Self {
        Self {
            search_template: DEFAULT_SEARCH_TEMPLATE.to_string(),
        }
    }

    pub fn with_search_engine(template: &str) -> Self {
        let mut resolver = Self::new();
        resolver.set_search_engine(template);
        resolver
    }

    /// Replace the search template. Templates without a `%s` placeholder, or
    /// that do not form a URL, are rejected and the current one is kept.
    pub fn set_search_engine(&mut self, template: &str) -> bool {
        let template = template.trim();
        if !template.contains("%s") || Url::parse(&template.replace("%s", "q")).is_err() {
            tracing::warn!(template = %template, "Ignoring invalid search template");
            return false;
        }

        self.search_template = template.to_string();
        true
    }

    pub fn search_template(&self) -> &str {
        &self.search_template
    }

    /// Resolve address bar text into a navigable address
    pub fn resolve(&self, input: &str) -> String {
        let input = input.trim();

        if input.is_empty() {
            return "about:blank".to_string();
        }

        let lower = input.to_ascii_lowercase();
        if lower.starts_with("about:") || lower.starts_with("file://") {
            return input.to_string();
        }

        if Self::is_absolute_url(input) {
            return input.to_string();
        }

        if let Some(url) = Self::host_url(input) {
            return url;
        }

        if input.contains('.') && !input.chars().any(char::is_whitespace) {
            let candidate = format!("https://{}", input);
            if Url::parse(&candidate).is_ok() {
                return candidate;
            }
        }

        self.build_search_url(input)
    }

    /// Any scheme the URL parser accepts, except `host:port` which only looks
    /// like one (`localhost:8080` would otherwise be scheme `localhost`).
    fn is_absolute_url(input: &str) -> bool {
        if input.chars().any(char::is_whitespace) || Url::parse(input).is_err() {
            return false;
        }

        !Self::is_host_and_port(input)
    }

    fn is_host_and_port(input: &str) -> bool {
        let (authority, _) = Self::split_host_and_rest(input);
        match authority.split_once(':') {
            Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
                host.eq_ignore_ascii_case("localhost") || Self::is_dns_hostname(host)
            }
            _ => false,
        }
    }

    /// `https://` form of a bare host or IP address, if the input is one
    fn host_url(input: &str) -> Option<String> {
        if input.chars().any(char::is_whitespace) {
            return None;
        }

        let (authority, rest) = Self::split_host_and_rest(input);

        let candidate = match Self::parse_ip_host(authority) {
            Some(IpAddr::V6(_)) if !authority.starts_with('[') => {
                format!("https://[{}]{}", authority, rest)
            }
            Some(_) => format!("https://{}{}", authority, rest),
            None => {
                let host = Self::strip_port(authority)?;
                if !host.eq_ignore_ascii_case("localhost") && !Self::is_dns_hostname(host) {
                    return None;
                }
                format!("https://{}{}", authority, rest)
            }
        };

        Url::parse(&candidate).ok().map(|_| candidate)
    }

    fn parse_ip_host(host: &str) -> Option<IpAddr> {
        if host.is_empty() {
            return None;
        }

        let host = if let Some(bracketed) = host.strip_prefix('[') {
            bracketed.split(']').next().unwrap_or(bracketed)
        } else if host.matches(':').count() == 1 {
            host.split(':').next().unwrap_or(host)
        } else {
            host
        };

        host.parse().ok()
    }

    /// Host part of `host[:port]`; `None` if the port is not numeric
    fn strip_port(authority: &str) -> Option<&str> {
        match authority.split_once(':') {
            Some((host, port))
                if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) =>
            {
                Some(host)
            }
            Some(_) => None,
            None => Some(authority),
        }
    }

    /// Dotted DNS name: letters, digits and inner hyphens per label
    fn is_dns_hostname(host: &str) -> bool {
        if host.len() > 253 || !host.contains('.') || host.starts_with('.') || host.ends_with('.')
        {
            return false;
        }

        host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
    }

    fn split_host_and_rest(input: &str) -> (&str, &str) {
        let cut = input.find(['/', '?', '#']).unwrap_or(input.len());
        input.split_at(cut)
    }

    /// Build search URL from query
    fn build_search_url(&self, query: &str) -> String {
        let encoded = urlencoding::encode(query);
        self.search_template.replace("%s", &encoded)
    }
}

impl Default for UrlResolver {
    fn default() -> Self {
        Self::new()
    }
}
