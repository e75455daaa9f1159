//! Selection of the most specific stored entry for a logical key.
//!
//! Callers must pass store results ordered **least specific first**, e.g.
//! default, then service, then version, then instance. The last entry whose
//! key is one of the candidates wins. Entries are filtered by membership only;
//! they are never re-ranked by candidate position.

use crate::context::HostContext;
use crate::keys::possible_keys;
use crate::store::KeyValue;

/// Finds the most specific entry for `key` among `candidates`.
///
/// An empty slice yields `None`. See the module docs for the ordering
/// callers must honour.
pub fn most_specific_match<'a>(
    candidates: &'a [KeyValue],
    key: &str,
    context: Option<&HostContext>,
) -> Option<&'a KeyValue> {
    if candidates.is_empty() {
        return None;
    }

    let possible = possible_keys(key, context);
    select_most_specific(&possible, candidates)
}

/// Like [`most_specific_match`], with the candidate keys already built.
pub fn select_most_specific<'a, K>(possible: &[K], candidates: &'a [KeyValue]) -> Option<&'a KeyValue>
where
    K: AsRef<str>,
{
    candidates
        .iter()
        .rev()
        .find(|candidate| possible.iter().any(|k| k.as_ref() == candidate.key))
}
