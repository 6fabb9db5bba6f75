//! Partitioning of the sequenced client list into batches.

use std::collections::BTreeSet;

use imms_model::{Batch, BatchStrategy, ClientRecord};

/// File-safe form of a group key: runs of non-alphanumerics become one
/// underscore, edges are trimmed, the result is lowercased.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_sep = false;
    for ch in value.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batcher {
    strategy: BatchStrategy,
    batch_size: usize,
}

impl Batcher {
    /// A `batch_size` of 0 disables batching.
    pub fn new(strategy: BatchStrategy, batch_size: usize) -> Self {
        Self {
            strategy,
            batch_size,
        }
    }

    pub fn strategy(&self) -> BatchStrategy {
        self.strategy
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Split `clients` into batches without reordering them.
    ///
    /// Groups appear in first-seen order; each group is chunked on its own
    /// so one school's count never shifts another's boundaries.
    pub fn plan<'a>(&self, clients: &'a [ClientRecord]) -> Vec<Batch<'a>> {
        if self.batch_size == 0 || clients.is_empty() {
            return Vec::new();
        }

        let mut groups: Vec<(Option<&'a str>, Vec<&'a ClientRecord>)> = Vec::new();
        for client in clients {
            let key = match self.strategy {
                BatchStrategy::Size => None,
                BatchStrategy::School => Some(client.school.id.as_str()),
                BatchStrategy::Board => Some(client.board.id.as_str()),
            };
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(client),
                None => groups.push((key, vec![client])),
            }
        }

        let mut batches = Vec::new();
        let mut used_prefixes = BTreeSet::new();
        for (key, members) in groups {
            let base = match (self.strategy, key) {
                (BatchStrategy::Size, _) | (_, None) => "batch".to_string(),
                (BatchStrategy::School, Some(key)) => format!("school_{}", slugify(key)),
                (BatchStrategy::Board, Some(key)) => format!("board_{}", slugify(key)),
            };
            let prefix = unique_prefix(&base, &mut used_prefixes);
            if prefix != base {
                tracing::warn!(
                    group_key = key.unwrap_or_default(),
                    name = %prefix,
                    "batch group key collides with another after slugify, renamed"
                );
            }
            let total_batches = members.len().div_ceil(self.batch_size);
            for (idx, chunk) in members.chunks(self.batch_size).enumerate() {
                batches.push(Batch {
                    strategy: self.strategy,
                    group_key: key.map(str::to_string),
                    name: format!("{prefix}_{:02}", idx + 1),
                    batch_number: idx + 1,
                    total_batches,
                    members: chunk.to_vec(),
                });
            }
        }

        tracing::info!(
            strategy = %self.strategy,
            batch_size = self.batch_size,
            batches = batches.len(),
            "planned batches"
        );
        batches
    }
}

/// `base` if unused, else the first free `{base}_{n}` starting at 2.
fn unique_prefix(base: &str, used: &mut BTreeSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{base}_{n}");
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}
