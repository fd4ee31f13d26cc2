//! Section order: the H2 outlines of the compared pages side by side

use serde::{Deserialize, Serialize};

use crate::extract::PageFeatures;

/// H2 headings by position in each page's outline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionOrder {
    /// Rank of the page in each column
    pub ranks: Vec<usize>,

    /// `rows[i][j]` is the `i`-th H2 of page `ranks[j]`, if it has one
    pub rows: Vec<Vec<Option<String>>>,
}

impl SectionOrder {
    /// Lay out `(rank, features)` pairs, one column per page
    pub fn from_pages(pages: &[(usize, &PageFeatures)]) -> Self {
        let depth = pages
            .iter()
            .map(|(_, page)| page.h2s.len())
            .max()
            .unwrap_or(0);

        let rows = (0..depth)
            .map(|position| {
                pages
                    .iter()
                    .map(|(_, page)| page.h2s.get(position).cloned())
                    .collect()
            })
            .collect();

        Self {
            ranks: pages.iter().map(|(rank, _)| *rank).collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
