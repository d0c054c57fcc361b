//! Capability surface of the windowed container edits are applied to.
use crate::adapter::Adapter;
use crate::errors::ReconcilerError;
use crate::types::{EditAnimation, IndexPath, InstanceId, Point, Position, ReuseKey, Size};

/// A virtualizing, recycling list host such as a table or grid view.
///
/// Edits arrive between [`begin_updates`](Container::begin_updates) and
/// [`end_updates`](Container::end_updates) in this order: section deletes, section
/// inserts, section reloads, section moves, then the same four for items. Deletes,
/// reloads and move sources use indices from before the batch; inserts and move
/// destinations use indices from after it.
///
/// `end_updates` commits the batch. Returning from it is the batch's completion
/// signal, so a container must not return before the adapter-visible state and its
/// own item counts agree. The adapter already holds the post-batch snapshot while
/// the edit calls are issued, so any index query made during the batch sees
/// post-edit identities.
pub trait Container {
    /// Whether the container is currently mounted and displayed.
    fn is_mounted(&self) -> bool;

    /// Whether the content is being interactively scrolled, including deceleration.
    fn is_scrolling(&self) -> bool;

    /// Whether the user is touching or dragging the container right now.
    fn is_interacting(&self) -> bool;

    /// Registers a visual class for `reuse_key`.
    fn register(&mut self, reuse_key: &ReuseKey);

    /// Produces a fresh or recycled instance registered for `reuse_key`.
    fn dequeue(&mut self, reuse_key: &ReuseKey, position: Position) -> InstanceId;

    /// Visible cells with the instances currently showing them.
    fn visible_cells(&self) -> Vec<(IndexPath, InstanceId)>;

    fn visible_headers(&self) -> Vec<(usize, InstanceId)>;

    fn visible_footers(&self) -> Vec<(usize, InstanceId)>;

    /// Rebuilds everything from the adapter without diffing or animation.
    fn reload_data(&mut self, adapter: &mut Adapter) -> Result<(), ReconcilerError>;

    fn begin_updates(&mut self, animated: bool);

    fn delete_sections(&mut self, sections: &[usize], animation: EditAnimation);

    fn insert_sections(&mut self, sections: &[usize], animation: EditAnimation);

    fn reload_sections(&mut self, sections: &[usize], animation: EditAnimation);

    fn move_section(&mut self, from: usize, to: usize);

    fn delete_items(&mut self, items: &[IndexPath], animation: EditAnimation);

    fn insert_items(&mut self, items: &[IndexPath], animation: EditAnimation);

    fn reload_items(&mut self, items: &[IndexPath], animation: EditAnimation);

    fn move_item(&mut self, from: IndexPath, to: IndexPath);

    fn end_updates(&mut self, adapter: &mut Adapter) -> Result<(), ReconcilerError>;

    fn content_offset(&self) -> Point;

    fn set_content_offset(&mut self, offset: Point);

    fn content_size(&self) -> Size;

    fn viewport_size(&self) -> Size;

    /// Largest offset that still keeps the viewport inside the content.
    fn max_content_offset(&self) -> Point {
        let content = self.content_size();
        let viewport = self.viewport_size();
        Point::new(
            (content.width - viewport.width).max(0.0),
            (content.height - viewport.height).max(0.0),
        )
    }
}
