//! Thread-local regex cache
//!
//! The same regex groups show up in many patterns of a syntax set, and the
//! lookahead needs its `.+` boundary on every variable slot. Compiled
//! regexes are cached per thread; `Regex` clones share the compiled program.
//!
//! The cache holds at most [`MAX_CACHED_REGEXES`] entries and starts over
//! when full, so patterns compiled from untrusted text cannot grow it
//! without bound.

use hashbrown::HashMap;
use regex::Regex;
use std::cell::RefCell;

/// Number of regexes kept per thread before the cache is cleared
pub const MAX_CACHED_REGEXES: usize = 1024;

thread_local! {
    /// Thread-local cache of compiled regex patterns
    static REGEX_CACHE: RefCell<HashMap<String, Regex>> = RefCell::new(HashMap::new());
}

/// Get or compile a regex pattern
///
/// # Returns
/// * `Ok(Regex)` if the pattern is valid
/// * `Err(regex::Error)` if it does not compile (errors are not cached)
#[inline]
pub fn get_or_compile(pattern: &str) -> Result<Regex, regex::Error> {
    REGEX_CACHE.with(|cache| {
        if let Some(regex) = cache.borrow().get(pattern) {
            return Ok(regex.clone());
        }

        let regex = Regex::new(pattern)?;
        let mut cache = cache.borrow_mut();
        if cache.len() >= MAX_CACHED_REGEXES {
            cache.clear();
        }
        cache.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    })
}

/// Clear the regex cache
pub fn clear_cache() {
    REGEX_CACHE.with(|cache| cache.borrow_mut().clear());
}

/// Get the number of cached patterns
pub fn cache_size() -> usize {
    REGEX_CACHE.with(|cache| cache.borrow().len())
}
