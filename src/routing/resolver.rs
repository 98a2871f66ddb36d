//! Target channel resolution by name preference.

use crate::common::ChannelRef;

/// Return the first channel whose name matches a candidate.
///
/// Candidates are tried in order and names compare case-insensitively, so
/// the result depends on candidate order, not on channel order.
pub fn resolve<'a, S: AsRef<str>>(
    channels: &'a [ChannelRef],
    candidates: &[S],
) -> Option<&'a ChannelRef> {
    candidates.iter().find_map(|candidate| {
        let candidate = candidate.as_ref();
        channels
            .iter()
            .find(|channel| names_match(&channel.name, candidate))
    })
}

/// Case-insensitive name comparison, Unicode-aware.
pub fn names_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}
