//! Coreference index over canonical event ids.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::schema::event::Mention;

/// Symmetric coreference partners per canonical id.
///
/// Every raw chain `k -> [c1, .., cn]` makes all of `{k, c1, .., cn}`
/// partners of each other. Partners keep first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CoreferenceIndex {
    partners: FxHashMap<String, Vec<String>>,
}

impl CoreferenceIndex {
    /// Build the index from word-id chains. Word ids resolve to the first
    /// mention whose span starts at that word; an unknown word id is
    /// returned as the error.
    pub fn build(
        chains: &BTreeMap<u32, Vec<u32>>,
        mentions: &[Mention],
    ) -> Result<Self, u32> {
        let mut index = Self::default();
        for (head, rest) in chains {
            let mut chain = Vec::with_capacity(rest.len() + 1);
            chain.push(resolve_word_id(*head, mentions)?);
            for word_id in rest {
                chain.push(resolve_word_id(*word_id, mentions)?);
            }
            for member in &chain {
                for other in &chain {
                    if other != member {
                        index.link(member, other);
                    }
                }
            }
        }
        Ok(index)
    }

    fn link(&mut self, from: &str, to: &str) {
        let entry = self.partners.entry(from.to_string()).or_default();
        if !entry.iter().any(|p| p == to) {
            entry.push(to.to_string());
        }
    }

    /// Coreference partners of `id`, or `None` if it is in no chain.
    pub fn partners(&self, id: &str) -> Option<&[String]> {
        self.partners.get(id).map(Vec::as_slice)
    }
}

/// Id of the first mention whose span starts at `word_id`.
pub fn resolve_word_id(word_id: u32, mentions: &[Mention]) -> Result<String, u32> {
    mentions
        .iter()
        .find(|m| m.span.start() == word_id)
        .map(|m| m.id.clone())
        .ok_or(word_id)
}
