//! Store key codec.
//!
//! Every entity is stored at `<CATEGORY_TAG>:<id>`. Tags are a fixed set
//! and never contain the `:` delimiter, so decoding splits on the first
//! `:` and ids may themselves contain `:` without ambiguity.
//!
//! Tag lexicographic order is `CONFIG` < `CONFIGGROUP` < `MACHINE` <
//! `MACHINEGROUP`; a full store scan therefore visits categories in that
//! order. Nothing in the core depends on cross-category scan order.

use crate::error::{StoreError, StoreResult};
use std::fmt;

/// The four entity categories multiplexed onto the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// A named log-collection configuration.
    Config,
    /// A single agent host record.
    Machine,
    /// A named, ordered group of config ids.
    ConfigGroup,
    /// A named group of machine ids.
    MachineGroup,
}

impl Category {
    /// Every category, for iteration in diagnostics.
    pub const ALL: [Category; 4] = [
        Category::Config,
        Category::Machine,
        Category::ConfigGroup,
        Category::MachineGroup,
    ];

    /// Returns the fixed key-prefix tag for this category.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Category::Config => "CONFIG",
            Category::Machine => "MACHINE",
            Category::ConfigGroup => "CONFIGGROUP",
            Category::MachineGroup => "MACHINEGROUP",
        }
    }

    /// Looks up a category by its tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "CONFIG" => Some(Category::Config),
            "MACHINE" => Some(Category::Machine),
            "CONFIGGROUP" => Some(Category::ConfigGroup),
            "MACHINEGROUP" => Some(Category::MachineGroup),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

/// Encodes a (category, id) pair into its store key.
///
/// Encoding never fails.
#[must_use]
pub fn encode_key(category: Category, id: &str) -> Vec<u8> {
    format!("{}:{id}", category.tag()).into_bytes()
}

/// Decodes a store key into its (category, id) pair.
///
/// # Errors
///
/// Returns [`StoreError::MalformedKey`] if the key is not UTF-8 or has no
/// delimiter, and [`StoreError::UnknownCategory`] if the tag is outside
/// the fixed set. Either is a store-integrity violation.
pub fn decode_key(key: &[u8]) -> StoreResult<(Category, &str)> {
    let text = std::str::from_utf8(key).map_err(|_| StoreError::malformed_key(key))?;
    let (tag, id) = text
        .split_once(':')
        .ok_or_else(|| StoreError::malformed_key(key))?;
    let category = Category::from_tag(tag).ok_or_else(|| StoreError::unknown_category(tag))?;
    Ok((category, id))
}
