//! In-memory [`ViewportAdapter`] for tests and headless hosts.
//!
//! Items are laid out on a fixed grid by their position among item nodes,
//! so reordering immediately changes every item's reported rect. Every
//! mutating call bumps [`MemoryViewport::mutation_count`], which lets tests
//! assert that a pass was write-free.

use std::collections::BTreeMap;

use crate::geometry::Rect;
use crate::id::ItemId;
use crate::placeholder::PlaceholderStyle;
use crate::viewport::{Anchor, ComputedBox, StyleProp, ViewportAdapter, ViewportError};

/// Height of the default header handle strip.
pub const DEFAULT_HANDLE_HEIGHT: f64 = 40.0;

/// One child of the in-memory container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNode {
    Item(ItemId),
    Placeholder,
}

#[derive(Debug, Clone, Default)]
struct MemoryItem {
    styles: BTreeMap<StyleProp, String>,
    aria_hidden: bool,
    /// Handle rect relative to the item's top-left corner.
    handle: Option<Rect>,
}

/// Deterministic viewport backed by plain data.
#[derive(Debug, Clone)]
pub struct MemoryViewport {
    container: Rect,
    nodes: Vec<MemoryNode>,
    items: BTreeMap<ItemId, MemoryItem>,
    columns: u32,
    cell_width: f64,
    cell_height: f64,
    gap: f64,
    placeholder: Option<PlaceholderStyle>,
    captured: Option<(ItemId, u32)>,
    capture_supported: bool,
    reject_style_writes: bool,
    /// Container `position` from stylesheets, used when no inline value is set.
    container_sheet_position: String,
    container_inline_position: String,
    user_select: String,
    /// `user-select` saved while selection is suppressed.
    saved_user_select: Option<String>,
    mutations: u64,
}

impl MemoryViewport {
    /// Empty container with the given bounds.
    #[must_use]
    pub fn new(container: Rect) -> Self {
        Self {
            container,
            nodes: Vec::new(),
            items: BTreeMap::new(),
            columns: 1,
            cell_width: 0.0,
            cell_height: 0.0,
            gap: 0.0,
            placeholder: None,
            captured: None,
            capture_supported: true,
            reject_style_writes: false,
            container_sheet_position: "static".to_owned(),
            container_inline_position: String::new(),
            user_select: String::new(),
            saved_user_select: None,
            mutations: 0,
        }
    }

    /// Container holding `ids` on a `columns`-wide grid of equal cells.
    ///
    /// The container is exactly wide enough for `columns` cells. Each item
    /// gets a full-width header handle [`DEFAULT_HANDLE_HEIGHT`] tall.
    #[must_use]
    pub fn grid<I, T>(ids: I, columns: u32, width: f64, height: f64, gap: f64) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let columns = columns.max(1);
        let container_width = f64::from(columns) * width + f64::from(columns - 1) * gap;
        let mut viewport = Self::new(Rect::new(0.0, 0.0, container_width, 4000.0));
        viewport.columns = columns;
        viewport.cell_width = width;
        viewport.cell_height = height;
        viewport.gap = gap;
        for id in ids {
            viewport.push_item(id);
        }
        viewport
    }

    /// Append an item (simulates content mounting after init).
    pub fn push_item(&mut self, raw: impl AsRef<str>) -> Option<ItemId> {
        let id = ItemId::new(raw)?;
        if self.items.contains_key(&id) {
            return None;
        }
        let handle = Rect::new(0.0, 0.0, self.cell_width, DEFAULT_HANDLE_HEIGHT);
        self.items.insert(
            id.clone(),
            MemoryItem {
                handle: Some(handle),
                ..MemoryItem::default()
            },
        );
        self.nodes.push(MemoryNode::Item(id.clone()));
        self.mutations += 1;
        Some(id)
    }

    /// Remove the designated handle so the whole item becomes draggable.
    pub fn clear_handle(&mut self, id: &ItemId) {
        if let Some(item) = self.items.get_mut(id) {
            item.handle = None;
        }
    }

    pub fn set_container_rect(&mut self, rect: Rect) {
        self.container = rect;
    }

    /// Make `capture_pointer` fail with [`ViewportError::CaptureUnsupported`].
    pub fn set_capture_supported(&mut self, supported: bool) {
        self.capture_supported = supported;
    }

    /// Stylesheet `position` of the container (defaults to `static`).
    pub fn set_container_sheet_position(&mut self, position: &str) {
        self.container_sheet_position = position.to_owned();
    }

    /// Document `user-select` value outside of a drag.
    pub fn set_user_select(&mut self, value: &str) {
        self.user_select = value.to_owned();
    }

    #[must_use]
    pub fn user_select(&self) -> &str {
        &self.user_select
    }

    #[must_use]
    pub const fn selection_suppressed(&self) -> bool {
        self.saved_user_select.is_some()
    }

    /// Make every `set_inline_style` call fail.
    pub fn set_reject_style_writes(&mut self, reject: bool) {
        self.reject_style_writes = reject;
    }

    /// Children in container order, placeholder included.
    #[must_use]
    pub fn nodes(&self) -> &[MemoryNode] {
        &self.nodes
    }

    /// Total number of mutating calls that touched the container.
    #[must_use]
    pub const fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Pointer currently captured, with its item.
    #[must_use]
    pub fn captured_pointer(&self) -> Option<(&ItemId, u32)> {
        self.captured.as_ref().map(|(id, pointer)| (id, *pointer))
    }

    /// Style the placeholder was last mounted with.
    #[must_use]
    pub fn placeholder_style(&self) -> Option<&PlaceholderStyle> {
        self.placeholder.as_ref()
    }

    /// Every inline style set on `id`.
    #[must_use]
    pub fn inline_styles(&self, id: &ItemId) -> BTreeMap<StyleProp, String> {
        self.items
            .get(id)
            .map(|item| item.styles.clone())
            .unwrap_or_default()
    }

    fn item_index(&self, id: &ItemId) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                MemoryNode::Item(item) => Some(item),
                MemoryNode::Placeholder => None,
            })
            .position(|item| item == id)
    }

    fn node_index(&self, id: &ItemId) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| matches!(node, MemoryNode::Item(item) if item == id))
    }

    fn anchor_index(&self, anchor: &Anchor) -> Result<usize, ViewportError> {
        match anchor {
            Anchor::End => Ok(self.nodes.len()),
            Anchor::Before(id) => self
                .node_index(id)
                .ok_or_else(|| ViewportError::UnknownItem(id.clone())),
        }
    }
}

impl ViewportAdapter for MemoryViewport {
    fn container_rect(&self) -> Rect {
        self.container
    }

    fn item_ids(&self) -> Vec<ItemId> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                MemoryNode::Item(id) => Some(id.clone()),
                MemoryNode::Placeholder => None,
            })
            .collect()
    }

    fn item_rect(&self, id: &ItemId) -> Option<Rect> {
        let index = u32::try_from(self.item_index(id)?).ok()?;
        let col = index % self.columns;
        let row = index / self.columns;
        Some(Rect::new(
            self.container.x + f64::from(col) * (self.cell_width + self.gap),
            self.container.y + f64::from(row) * (self.cell_height + self.gap),
            self.cell_width,
            self.cell_height,
        ))
    }

    fn handle_rect(&self, id: &ItemId) -> Option<Rect> {
        let item_rect = self.item_rect(id)?;
        let handle = self.items.get(id)?.handle?;
        Some(Rect::new(
            item_rect.x + handle.x,
            item_rect.y + handle.y,
            handle.width,
            handle.height,
        ))
    }

    fn computed_box(&self, id: &ItemId) -> Option<ComputedBox> {
        self.items.get(id)?;
        Some(ComputedBox {
            margin_right: Some(0.0),
            margin_bottom: Some(0.0),
            row_gap: Some(self.gap),
            column_gap: Some(self.gap),
            margin: "0px".to_owned(),
            border_radius: "12px".to_owned(),
        })
    }

    fn inline_style(&self, id: &ItemId, prop: StyleProp) -> String {
        self.items
            .get(id)
            .and_then(|item| item.styles.get(&prop).cloned())
            .unwrap_or_default()
    }

    fn set_inline_style(
        &mut self,
        id: &ItemId,
        prop: StyleProp,
        value: &str,
    ) -> Result<(), ViewportError> {
        if self.reject_style_writes {
            return Err(ViewportError::Host("style writes rejected".to_owned()));
        }
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| ViewportError::UnknownItem(id.clone()))?;
        if value.is_empty() {
            item.styles.remove(&prop);
        } else {
            item.styles.insert(prop, value.to_owned());
        }
        self.mutations += 1;
        Ok(())
    }

    fn move_item(&mut self, id: &ItemId, anchor: &Anchor) -> Result<(), ViewportError> {
        if matches!(anchor, Anchor::Before(before) if before == id) {
            return Ok(());
        }
        let from = self
            .node_index(id)
            .ok_or_else(|| ViewportError::UnknownItem(id.clone()))?;
        self.anchor_index(anchor)?;
        let node = self.nodes.remove(from);
        let to = self.anchor_index(anchor)?;
        self.nodes.insert(to, node);
        self.mutations += 1;
        Ok(())
    }

    fn mount_placeholder(
        &mut self,
        style: &PlaceholderStyle,
        anchor: &Anchor,
    ) -> Result<(), ViewportError> {
        self.anchor_index(anchor)?;
        self.nodes.retain(|node| *node != MemoryNode::Placeholder);
        let to = self.anchor_index(anchor)?;
        self.nodes.insert(to, MemoryNode::Placeholder);
        self.placeholder = Some(style.clone());
        self.mutations += 1;
        Ok(())
    }

    fn move_item_to_placeholder(&mut self, id: &ItemId) -> Result<(), ViewportError> {
        let from = self
            .node_index(id)
            .ok_or_else(|| ViewportError::UnknownItem(id.clone()))?;
        if !self.placeholder_mounted() {
            return Err(ViewportError::PlaceholderNotMounted);
        }
        let node = self.nodes.remove(from);
        let to = self
            .nodes
            .iter()
            .position(|node| *node == MemoryNode::Placeholder)
            .ok_or(ViewportError::PlaceholderNotMounted)?;
        self.nodes.insert(to, node);
        self.mutations += 1;
        Ok(())
    }

    fn unmount_placeholder(&mut self) {
        let before = self.nodes.len();
        self.nodes.retain(|node| *node != MemoryNode::Placeholder);
        if self.nodes.len() != before {
            self.mutations += 1;
        }
    }

    fn placeholder_mounted(&self) -> bool {
        self.nodes.contains(&MemoryNode::Placeholder)
    }

    fn capture_pointer(&mut self, id: &ItemId, pointer_id: u32) -> Result<(), ViewportError> {
        if !self.capture_supported {
            return Err(ViewportError::CaptureUnsupported);
        }
        if !self.items.contains_key(id) {
            return Err(ViewportError::UnknownItem(id.clone()));
        }
        self.captured = Some((id.clone(), pointer_id));
        Ok(())
    }

    fn release_pointer(&mut self, id: &ItemId, pointer_id: u32) -> Result<(), ViewportError> {
        match &self.captured {
            Some((captured, pointer)) if captured == id && *pointer == pointer_id => {
                self.captured = None;
                Ok(())
            }
            _ => Err(ViewportError::NotCaptured { pointer_id }),
        }
    }

    fn is_aria_hidden(&self, id: &ItemId) -> bool {
        self.items.get(id).is_some_and(|item| item.aria_hidden)
    }

    fn set_aria_hidden(&mut self, id: &ItemId, hidden: bool) -> Result<(), ViewportError> {
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| ViewportError::UnknownItem(id.clone()))?;
        item.aria_hidden = hidden;
        self.mutations += 1;
        Ok(())
    }

    fn container_position(&self) -> String {
        if self.container_inline_position.is_empty() {
            self.container_sheet_position.clone()
        } else {
            self.container_inline_position.clone()
        }
    }

    fn container_inline_position(&self) -> String {
        self.container_inline_position.clone()
    }

    fn set_container_position(&mut self, value: &str) -> Result<(), ViewportError> {
        if self.reject_style_writes {
            return Err(ViewportError::Host("style writes rejected".to_owned()));
        }
        self.container_inline_position = value.to_owned();
        self.mutations += 1;
        Ok(())
    }

    fn set_selection_suppressed(&mut self, suppressed: bool) -> Result<(), ViewportError> {
        if suppressed {
            if self.saved_user_select.is_none() {
                self.saved_user_select = Some(std::mem::replace(&mut self.user_select, "none".to_owned()));
            }
        } else if let Some(saved) = self.saved_user_select.take() {
            self.user_select = saved;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryNode, MemoryViewport};
    use crate::geometry::Rect;
    use crate::id::{ItemId, ids};
    use crate::placeholder::PlaceholderStyle;
    use crate::viewport::{Anchor, ViewportAdapter};

    fn id(raw: &str) -> ItemId {
        ItemId::new(raw).expect("non-blank")
    }

    #[test]
    fn rects_follow_document_order() {
        let mut viewport = MemoryViewport::grid(["a", "b", "c"], 2, 100.0, 50.0, 10.0);
        assert_eq!(viewport.item_rect(&id("c")), Some(Rect::new(0.0, 60.0, 100.0, 50.0)));
        viewport.move_item(&id("c"), &Anchor::Before(id("a"))).expect("move");
        assert_eq!(viewport.item_ids(), ids(["c", "a", "b"]));
        assert_eq!(viewport.item_rect(&id("c")), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn placeholder_is_excluded_from_item_order() {
        let mut viewport = MemoryViewport::grid(["a", "b"], 2, 100.0, 50.0, 0.0);
        viewport
            .mount_placeholder(&PlaceholderStyle::default(), &Anchor::Before(id("a")))
            .expect("mount");
        assert_eq!(viewport.nodes()[0], MemoryNode::Placeholder);
        assert_eq!(viewport.item_ids(), ids(["a", "b"]));
        viewport.move_item_to_placeholder(&id("b")).expect("move");
        viewport.unmount_placeholder();
        assert_eq!(viewport.item_ids(), ids(["b", "a"]));
    }
}
