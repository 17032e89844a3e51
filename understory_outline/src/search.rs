// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filtering the visible rows by text.

use alloc::vec::Vec;

use crate::error::TreeError;
use crate::tree::{Tree, try_string};
use crate::types::NodeId;

impl Tree {
    /// Show only the entries whose text contains `query`, ignoring case.
    ///
    /// While a search is active the layout lists every matching entry flat at
    /// depth 0 in document order, including entries inside collapsed folders.
    /// Folders are never listed. `None` or an empty query ends the search and
    /// restores the normal layout. An open edit is committed first. Selection
    /// and expansion state are left alone.
    pub fn set_search(&mut self, query: Option<&str>) -> Result<(), TreeError> {
        let query = query.filter(|q| !q.is_empty());
        if query == self.search.as_deref() {
            return Ok(());
        }
        let query = query.map(try_string).transpose()?;
        self.commit_edit();
        match &query {
            Some(q) => log::debug!("searching for {q:?}"),
            None => log::debug!("search ended"),
        }
        self.search = query;
        self.recalculate();
        Ok(())
    }

    /// The active search text.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Whether a search is filtering the rows.
    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    /// Entries with an element containing `query`, all at depth 0.
    pub(crate) fn matching_entries(&self, query: &str) -> Vec<(NodeId, usize)> {
        let query = query.to_lowercase();
        self.subtree(self.root)
            .into_iter()
            .filter(|&id| {
                let node = self.node(id);
                !node.is_folder()
                    && node
                        .elements
                        .iter()
                        .filter_map(|e| e.text())
                        .any(|text| text.to_lowercase().contains(&query))
            })
            .map(|id| (id, 0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TreeConfig;
    use crate::tree::Tree;
    use crate::types::{ElementId, FieldDesc, FieldFlags, NodeId};
    use kurbo::Point;

    /// A collapsed `Bookmarks` folder holding two entries, then a top-level entry.
    fn hotlist() -> (Tree, [NodeId; 4]) {
        let config = TreeConfig::default().with_entry_fields([
            FieldDesc::new("Title", FieldFlags::DEFAULT | FieldFlags::ALLOW_EDIT),
            FieldDesc::new("URL", FieldFlags::SHOW_NAME),
        ]);
        let mut tree = Tree::new(config);
        let root = tree.root();
        let folder = tree.create_folder(Some(root), "Bookmarks").unwrap();
        let home = tree
            .create_entry(Some(folder), &["NetSurf home", "https://www.netsurf-browser.org"])
            .unwrap();
        let docs = tree
            .create_entry(Some(folder), &["Docs", "https://example.org/docs"])
            .unwrap();
        let news = tree
            .create_entry(Some(root), &["netsurf news", "https://example.org/news"])
            .unwrap();
        (tree, [folder, home, docs, news])
    }

    #[test]
    fn search_lists_matches_flat() {
        let (mut tree, [folder, home, _, news]) = hotlist();
        assert_eq!(tree.visible_rows(), &[folder, news]);
        tree.set_search(Some("NETSURF")).unwrap();
        assert_eq!(tree.search(), Some("NETSURF"));
        assert_eq!(tree.visible_rows(), &[home, news], "hidden entries found, folder dropped");
        assert_eq!(tree.depth_of(home), Some(0));
        assert_eq!(tree.node_bounds(home).map(|b| b.x0), Some(0.0), "no indentation");
        assert_eq!(tree.node_bounds(folder), None);
        assert_eq!(tree.extent().height, 40.0);
        let hit = tree.hit_test(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(hit.element, ElementId::primary(home));
        assert!(!hit.furniture, "search rows have no gutter");
        assert!(!tree.is_expanded(folder), "expansion untouched");
    }

    #[test]
    fn secondary_fields_are_searched() {
        let (mut tree, [_, home, docs, news]) = hotlist();
        tree.set_search(Some("example.org")).unwrap();
        assert_eq!(tree.visible_rows(), &[docs, news]);
        tree.set_search(Some("zzz")).unwrap();
        assert!(tree.visible_rows().is_empty(), "nothing matches");
        tree.set_search(Some("browser")).unwrap();
        assert_eq!(tree.visible_rows(), &[home]);
    }

    #[test]
    fn empty_query_ends_the_search() {
        let (mut tree, [folder, _, _, news]) = hotlist();
        tree.set_search(Some("docs")).unwrap();
        let _ = tree.take_damage();
        tree.set_search(Some("")).unwrap();
        assert!(!tree.is_searching());
        assert_eq!(tree.visible_rows(), &[folder, news]);
        let damage = tree.take_damage().union_rect().unwrap();
        assert_eq!(damage.y0, 0.0, "whole content repainted");
        tree.set_search(None).unwrap();
        assert!(tree.take_damage().is_empty(), "no change, no damage");
    }

    #[test]
    fn structural_changes_keep_filtering() {
        let (mut tree, [folder, home, _, news]) = hotlist();
        tree.set_search(Some("net")).unwrap();
        let fresh = tree.create_entry(Some(folder), &["Another NetSurf page"]).unwrap();
        let other = tree.create_entry(Some(folder), &["Unrelated"]).unwrap();
        assert_eq!(tree.visible_rows(), &[home, fresh, news]);
        assert_eq!(tree.row_of(other), None);
        tree.set_element_text(ElementId::primary(other), "net again").unwrap();
        assert_eq!(tree.visible_rows(), &[home, fresh, other, news]);
        assert_eq!(
            tree.node_bounds(news).map(|b| (b.y0, b.y1)),
            Some((60.0, 80.0)),
            "rows stay packed"
        );
    }

    #[test]
    fn search_commits_an_open_edit() {
        let (mut tree, [_, _, _, news]) = hotlist();
        tree.start_edit(ElementId::primary(news)).unwrap();
        tree.set_edit_buffer("netsurf blog").unwrap();
        tree.set_search(Some("blog")).unwrap();
        assert!(!tree.is_editing());
        assert_eq!(tree.visible_rows(), &[news], "committed text is searched");
    }

    #[test]
    fn editing_a_filtered_out_entry_ends_the_search() {
        let (mut tree, [folder, _, docs, news]) = hotlist();
        tree.set_search(Some("news")).unwrap();
        tree.start_edit(ElementId::primary(docs)).unwrap();
        assert!(!tree.is_searching());
        assert!(tree.is_expanded(folder), "ancestors expanded for the edit");
        assert!(tree.row_of(docs).is_some());
        tree.cancel_edit();
        tree.set_search(Some("news")).unwrap();
        tree.start_edit(ElementId::primary(news)).unwrap();
        assert_eq!(tree.search(), Some("news"), "visible rows edit in place");
    }
}
