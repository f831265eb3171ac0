use std::collections::HashMap;
use std::io::Cursor;

use bytes::Bytes;

use crate::encoder::EncodedEntry;
use crate::error::FlushError;

/// Source-name resolution strategy, fixed at configuration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    /// The `{TAG}` template: source is the tag itself.
    Tag,
    /// Any other template: the literal `{TAG}` is substituted at most once.
    /// A template without `{TAG}` yields the same source for every tag.
    Template(String),
}

impl SourceFormat {
    pub fn from_template(template: &str) -> Self {
        match template {
            "{TAG}" => SourceFormat::Tag,
            other => SourceFormat::Template(other.to_string()),
        }
    }

    pub fn resolve(&self, tag: &str) -> String {
        match self {
            SourceFormat::Tag => tag.to_string(),
            SourceFormat::Template(template) => template.replacen("{TAG}", tag, 1),
        }
    }
}

/// Per-chunk grouping of lines by resolved source. Groups are created lazily
/// on first occurrence and iterate in first-occurrence order; lines within a
/// group keep their original relative order.
#[derive(Debug, Default)]
pub struct SourceGroups {
    groups: Vec<(String, Vec<Bytes>)>,
    index: HashMap<String, usize>,
}

impl SourceGroups {
    fn push(&mut self, source: String, line: Bytes) {
        match self.index.get(&source) {
            Some(&i) => self.groups[i].1.push(line),
            None => {
                self.index.insert(source.clone(), self.groups.len());
                self.groups.push((source, vec![line]));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Bytes])> {
        self.groups
            .iter()
            .map(|(source, lines)| (source.as_str(), lines.as_slice()))
    }
}

impl IntoIterator for SourceGroups {
    type Item = (String, Vec<Bytes>);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Decodes an accumulated chunk of [`EncodedEntry`] frames and groups the
/// lines by resolved source. Decode order is original write order. A chunk
/// that fails to decode is fatal for this flush and is not retried here.
pub fn group(chunk: &[u8], source: &SourceFormat) -> Result<SourceGroups, FlushError> {
    let mut groups = SourceGroups::default();
    let len = chunk.len() as u64;
    let mut cursor = Cursor::new(chunk);
    while cursor.position() < len {
        let entry: EncodedEntry = rmp_serde::from_read(&mut cursor)
            .map_err(|e| FlushError::Decode(e.to_string()))?;
        groups.push(source.resolve(&entry.tag), Bytes::from(entry.line));
    }
    Ok(groups)
}
