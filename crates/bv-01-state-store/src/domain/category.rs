//! State categories. Each category is persisted and locked independently.

use std::fmt;

/// One independently persisted map of vault state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Collections,
    Cooldowns,
    Watches,
    Badges,
    Stats,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Collections,
        Category::Cooldowns,
        Category::Watches,
        Category::Badges,
        Category::Stats,
    ];

    /// File name used by the JSON file backend.
    pub fn file_name(self) -> &'static str {
        match self {
            Category::Collections => "collections.json",
            Category::Cooldowns => "cooldowns.json",
            Category::Watches => "watches.json",
            Category::Badges => "badges.json",
            Category::Stats => "stats.json",
        }
    }

    /// Position in [`Category::ALL`]; used to index per-category locks.
    pub fn index(self) -> usize {
        match self {
            Category::Collections => 0,
            Category::Cooldowns => 1,
            Category::Watches => 2,
            Category::Badges => 3,
            Category::Stats => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Collections => "collections",
            Category::Cooldowns => "cooldowns",
            Category::Watches => "watches",
            Category::Badges => "badges",
            Category::Stats => "stats",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_all_order() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_file_names_are_distinct() {
        let mut names: Vec<_> = Category::ALL.iter().map(|c| c.file_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Category::ALL.len());
    }
}
