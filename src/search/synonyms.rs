use crate::corpus::types::SynonymTable;
use std::collections::BTreeSet;

/// Expands `tokens` with every synonym group they belong to.
///
/// A token belongs to a group when it equals the group's key or appears among its
/// values; the whole group (key and values) is then added. The result always
/// contains the input tokens.
pub fn expand(tokens: &[String], table: &SynonymTable) -> BTreeSet<String> {
    let mut expanded: BTreeSet<String> = tokens.iter().cloned().collect();

    for token in tokens {
        for (key, values) in table {
            if key == token || values.iter().any(|v| v == token) {
                expanded.insert(key.clone());
                expanded.extend(values.iter().cloned());
            }
        }
    }

    expanded
}
