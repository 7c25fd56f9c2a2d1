//! Tag Catalog for the bookmark list.
//!
//! Holds the server's tag list, used for the tag dialog and as completion
//! dictionary of tag input fields.

use crate::types::bookmark::Tag;

/// Trait defining tag catalog operations.
pub trait TagCatalogTrait {
    fn replace(&mut self, tags: Vec<Tag>);
    fn tags(&self) -> &[Tag];
    fn get(&self, idx: usize) -> Option<&Tag>;
    fn names(&self) -> Vec<String>;
    /// Renames the tag at `idx` and re-sorts the catalog. Returns the old name.
    fn rename(&mut self, idx: usize, new_name: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCatalog {
    tags: Vec<Tag>,
}

impl TagCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl TagCatalogTrait for TagCatalog {
    fn replace(&mut self, tags: Vec<Tag>) {
        self.tags = tags;
    }

    fn tags(&self) -> &[Tag] {
        &self.tags
    }

    fn get(&self, idx: usize) -> Option<&Tag> {
        self.tags.get(idx)
    }

    fn names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }

    fn rename(&mut self, idx: usize, new_name: &str) -> Option<String> {
        let tag = self.tags.get_mut(idx)?;
        let old = std::mem::replace(&mut tag.name, new_name.to_string());
        // stable, so equal names keep their relative order
        self.tags.sort_by_key(|t| t.name.to_lowercase());
        Some(old)
    }
}
