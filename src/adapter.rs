//! Holder of the current snapshot and the bridge a container renders through
use crate::container::Container;
use crate::ensure_index;
use crate::errors::ReconcilerError;
use crate::render_state::{RenderCache, RenderOutcome};
use crate::section::{CellNode, Section, Snapshot, ViewNode};
use crate::types::{IndexPath, InstanceId, Position, ReuseKey, Size};
use indexmap::IndexSet;
use log::trace;

/// Owns the canonical snapshot. Every index a container or the updater reasons
/// about resolves through here, never through recycled visual instances.
#[derive(Debug, Default)]
pub struct Adapter {
    data: Snapshot,
    render_cache: RenderCache,
    registered: IndexSet<ReuseKey>,
}

impl Adapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: Snapshot) -> Self {
        Adapter {
            data,
            ..Self::default()
        }
    }

    pub fn data(&self) -> &Snapshot {
        &self.data
    }

    /// Replaces the snapshot wholesale and returns the previous one.
    pub fn set_data(&mut self, data: Snapshot) -> Snapshot {
        std::mem::replace(&mut self.data, data)
    }

    pub fn number_of_sections(&self) -> usize {
        self.data.len()
    }

    pub fn number_of_items(&self, section: usize) -> usize {
        self.data.section(section).map_or(0, |s| s.cells.len())
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.data.section(index)
    }

    pub fn cell(&self, index_path: IndexPath) -> Option<&CellNode> {
        self.data.cell(index_path)
    }

    pub fn header(&self, section: usize) -> Option<&ViewNode> {
        self.data.section(section).and_then(|s| s.header.as_ref())
    }

    pub fn footer(&self, section: usize) -> Option<&ViewNode> {
        self.data.section(section).and_then(|s| s.footer.as_ref())
    }

    pub fn try_section(&self, index: usize) -> Result<&Section, ReconcilerError> {
        section_at(&self.data, index)
    }

    pub fn try_cell(&self, index_path: IndexPath) -> Result<&CellNode, ReconcilerError> {
        cell_at(&self.data, index_path)
    }

    pub fn try_header(&self, section: usize) -> Result<&ViewNode, ReconcilerError> {
        header_at(&self.data, section)
    }

    pub fn try_footer(&self, section: usize) -> Result<&ViewNode, ReconcilerError> {
        footer_at(&self.data, section)
    }

    pub fn render_cache(&self) -> &RenderCache {
        &self.render_cache
    }

    pub fn render_cache_mut(&mut self) -> &mut RenderCache {
        &mut self.render_cache
    }

    /// Reuse keys registered with containers, in registration order.
    pub fn registered_reuse_keys(&self) -> impl Iterator<Item = &ReuseKey> + '_ {
        self.registered.iter()
    }

    /// Forgets registrations, e.g. when a different container is attached.
    pub fn reset_registrations(&mut self) {
        self.registered.clear();
    }

    fn dequeue(
        &mut self,
        container: &mut dyn Container,
        reuse_key: ReuseKey,
        position: Position,
    ) -> InstanceId {
        if !self.registered.contains(&reuse_key) {
            trace!("Adapter: registering reuse key '{}'", reuse_key);
            container.register(&reuse_key);
            self.registered.insert(reuse_key.clone());
        }
        container.dequeue(&reuse_key, position)
    }

    /// Dequeues an instance for the cell at `index_path` and renders it.
    pub fn dequeue_cell(
        &mut self,
        container: &mut dyn Container,
        index_path: IndexPath,
    ) -> Result<InstanceId, ReconcilerError> {
        let reuse_key = self.try_cell(index_path)?.component.reuse_key();
        let instance = self.dequeue(container, reuse_key, Position::Cell(index_path));
        self.render_cell(instance, index_path)?;
        Ok(instance)
    }

    pub fn dequeue_header(
        &mut self,
        container: &mut dyn Container,
        section: usize,
    ) -> Result<InstanceId, ReconcilerError> {
        let reuse_key = self.try_header(section)?.component.reuse_key();
        let instance = self.dequeue(container, reuse_key, Position::Header(section));
        self.render_header(instance, section)?;
        Ok(instance)
    }

    pub fn dequeue_footer(
        &mut self,
        container: &mut dyn Container,
        section: usize,
    ) -> Result<InstanceId, ReconcilerError> {
        let reuse_key = self.try_footer(section)?.component.reuse_key();
        let instance = self.dequeue(container, reuse_key, Position::Footer(section));
        self.render_footer(instance, section)?;
        Ok(instance)
    }

    /// Submits the cell at `index_path` to `instance` through the render cache.
    pub fn render_cell(
        &mut self,
        instance: InstanceId,
        index_path: IndexPath,
    ) -> Result<RenderOutcome, ReconcilerError> {
        let component = &cell_at(&self.data, index_path)?.component;
        self.render_cache.render(instance, component)
    }

    pub fn render_header(
        &mut self,
        instance: InstanceId,
        section: usize,
    ) -> Result<RenderOutcome, ReconcilerError> {
        let component = &header_at(&self.data, section)?.component;
        self.render_cache.render(instance, component)
    }

    pub fn render_footer(
        &mut self,
        instance: InstanceId,
        section: usize,
    ) -> Result<RenderOutcome, ReconcilerError> {
        let component = &footer_at(&self.data, section)?.component;
        self.render_cache.render(instance, component)
    }

    pub fn will_display(&mut self, instance: InstanceId) -> bool {
        self.render_cache.will_display(instance)
    }

    pub fn did_end_display(&mut self, instance: InstanceId) -> bool {
        self.render_cache.did_end_display(instance)
    }

    /// Tears down the render state of an instance the container discarded.
    pub fn release(&mut self, instance: InstanceId) {
        self.render_cache.release(instance);
    }

    pub fn size_for_cell(&self, index_path: IndexPath, bounds: Size) -> Option<Size> {
        self.cell(index_path)
            .and_then(|cell| cell.component.reference_size(bounds))
    }

    pub fn size_for_header(&self, section: usize, bounds: Size) -> Option<Size> {
        self.header(section)
            .and_then(|header| header.component.reference_size(bounds))
    }

    pub fn size_for_footer(&self, section: usize, bounds: Size) -> Option<Size> {
        self.footer(section)
            .and_then(|footer| footer.component.reference_size(bounds))
    }
}

fn section_at(data: &Snapshot, index: usize) -> Result<&Section, ReconcilerError> {
    Ok(ensure_index!(data.section(index), "section {} of {}", index, data.len()))
}

fn cell_at(data: &Snapshot, index_path: IndexPath) -> Result<&CellNode, ReconcilerError> {
    Ok(ensure_index!(
        data.cell(index_path),
        "cell {} in snapshot of {} sections",
        index_path,
        data.len()
    ))
}

fn header_at(data: &Snapshot, section: usize) -> Result<&ViewNode, ReconcilerError> {
    let section_node = section_at(data, section)?;
    Ok(ensure_index!(
        section_node.header.as_ref(),
        "no header in section {}",
        section
    ))
}

fn footer_at(data: &Snapshot, section: usize) -> Result<&ViewNode, ReconcilerError> {
    let section_node = section_at(data, section)?;
    Ok(ensure_index!(
        section_node.footer.as_ref(),
        "no footer in section {}",
        section
    ))
}
