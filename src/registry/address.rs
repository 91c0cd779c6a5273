//! Flat `namespace:command` addressing.

pub const NAMESPACE_SEP: char = ':';

pub fn qualified(path: &[String]) -> String {
    path.join(&NAMESPACE_SEP.to_string())
}

/// Splits on the first separator.
pub fn parse(token: &str) -> Option<(&str, &str)> {
    token.split_once(NAMESPACE_SEP)
}

pub fn is_qualified(token: &str) -> bool {
    token.contains(NAMESPACE_SEP)
}

pub fn segments(rest: &str) -> impl Iterator<Item = &str> {
    rest.split(NAMESPACE_SEP).filter(|s| !s.is_empty())
}
