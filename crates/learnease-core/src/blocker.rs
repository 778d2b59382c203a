//! Focus blocker: a toggle and a list of distracting hosts.
//!
//! A URL is blocked when the blocker is on and the URL's host is a listed
//! host or a subdomain of one.

use url::Url;

use crate::error::{CoreError, StorageError, ValidationError};
use crate::storage::{self, KeyValueStore};

const KEY_ACTIVE: &str = "focusBlockerActive";
const KEY_SITES: &str = "blockedSites";

pub const DEFAULT_BLOCKED_SITES: [&str; 10] = [
    "facebook.com",
    "x.com",
    "instagram.com",
    "reddit.com",
    "youtube.com",
    "tiktok.com",
    "netflix.com",
    "hulu.com",
    "in.pinterest.com",
    "tumblr.com",
];

/// Lowercase host of `input`, without a leading `www.`.
///
/// Accepts full URLs as well as bare hosts like `reddit.com/r/rust`.
pub fn normalize_host(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let host = match Url::parse(trimmed) {
        Ok(url) if url.host_str().is_some() => url.host_str()?.to_string(),
        _ => Url::parse(&format!("http://{trimmed}"))
            .ok()?
            .host_str()?
            .to_string(),
    };
    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

pub struct FocusBlocker<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> FocusBlocker<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn is_active(&self) -> Result<bool, StorageError> {
        Ok(storage::load(self.store, KEY_ACTIVE)?.unwrap_or(false))
    }

    pub fn set_active(&self, active: bool) -> Result<(), StorageError> {
        storage::save(self.store, KEY_ACTIVE, &active)
    }

    /// Flip the blocker and return the new setting.
    pub fn toggle(&self) -> Result<bool, StorageError> {
        let next = !self.is_active()?;
        self.set_active(next)?;
        Ok(next)
    }

    pub fn sites(&self) -> Result<Vec<String>, StorageError> {
        Ok(storage::load(self.store, KEY_SITES)?.unwrap_or_else(|| {
            DEFAULT_BLOCKED_SITES
                .iter()
                .map(|s| (*s).to_string())
                .collect()
        }))
    }

    /// Add a host. Returns `false` if it was already listed.
    pub fn add_site(&self, site: &str) -> Result<bool, CoreError> {
        let host = normalize_host(site).ok_or_else(|| invalid_site(site))?;
        let mut sites = self.sites()?;
        if sites.contains(&host) {
            return Ok(false);
        }
        sites.push(host);
        storage::save(self.store, KEY_SITES, &sites)?;
        Ok(true)
    }

    /// Remove a host. Returns `false` if it was not listed.
    pub fn remove_site(&self, site: &str) -> Result<bool, CoreError> {
        let host = normalize_host(site).ok_or_else(|| invalid_site(site))?;
        let mut sites = self.sites()?;
        let before = sites.len();
        sites.retain(|s| *s != host);
        if sites.len() == before {
            return Ok(false);
        }
        storage::save(self.store, KEY_SITES, &sites)?;
        Ok(true)
    }

    pub fn is_blocked(&self, url: &str) -> Result<bool, StorageError> {
        if !self.is_active()? {
            return Ok(false);
        }
        let Some(host) = normalize_host(url) else {
            return Ok(false);
        };
        Ok(self
            .sites()?
            .iter()
            .any(|site| host == *site || host.ends_with(&format!(".{site}"))))
    }
}

fn invalid_site(site: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: "site".into(),
        message: format!("'{site}' is not a host name"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn normalize_handles_urls_and_bare_hosts() {
        assert_eq!(
            normalize_host("https://WWW.Reddit.com/r/rust").as_deref(),
            Some("reddit.com")
        );
        assert_eq!(normalize_host("youtube.com/watch?v=1").as_deref(), Some("youtube.com"));
        assert_eq!(normalize_host("   ").as_deref(), None);
    }

    #[test]
    fn inactive_blocker_blocks_nothing() {
        let store = MemoryStore::new();
        let blocker = FocusBlocker::new(&store);
        assert!(!blocker.is_blocked("https://reddit.com").unwrap());
        assert!(blocker.toggle().unwrap());
        assert!(blocker.is_blocked("https://reddit.com").unwrap());
    }

    #[test]
    fn subdomains_match_but_lookalikes_do_not() {
        let store = MemoryStore::new();
        let blocker = FocusBlocker::new(&store);
        blocker.set_active(true).unwrap();
        assert!(blocker.is_blocked("https://old.reddit.com/r/rust").unwrap());
        assert!(!blocker.is_blocked("https://notreddit.com").unwrap());
        assert!(!blocker.is_blocked("https://docs.rs").unwrap());
    }

    #[test]
    fn site_list_edits_persist() {
        let store = MemoryStore::new();
        let blocker = FocusBlocker::new(&store);
        blocker.set_active(true).unwrap();
        assert_eq!(blocker.sites().unwrap().len(), DEFAULT_BLOCKED_SITES.len());

        assert!(blocker.add_site("https://news.ycombinator.com").unwrap());
        assert!(!blocker.add_site("news.ycombinator.com").unwrap());
        assert!(blocker.remove_site("reddit.com").unwrap());
        assert!(!blocker.remove_site("reddit.com").unwrap());

        assert!(blocker.is_blocked("https://news.ycombinator.com/item?id=1").unwrap());
        assert!(!blocker.is_blocked("https://reddit.com").unwrap());
    }
}
