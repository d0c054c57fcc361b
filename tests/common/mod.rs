//! Recording in-memory container shared by the integration tests.
//!
//! `MockContainer` keeps its own model of section and cell identities and replays
//! every batch against it with the same index rules a real list view enforces.
//! A batch whose result disagrees with the adapter's data fails `end_updates`.
//! Visible instances are keyed by identity, so a moved cell keeps its instance
//! while a reloaded one is recycled and dequeued again.
#![allow(dead_code)]

use list_reconciler::{
    Adapter, Component, Container, EditAnimation, Edits, Identity, IndexPath, InstanceId,
    Point, Position, ReconcilerError, Renderer, ReuseKey, Section, Size, Snapshot, Updater,
    UpdaterConfig,
};
use std::collections::{HashMap, HashSet};

pub type Model = Vec<(Identity, Vec<Identity>)>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn model_of(snapshot: &Snapshot) -> Model {
    snapshot
        .iter()
        .map(|section| (section.id.clone(), section.cell_ids().cloned().collect()))
        .collect()
}

/// Replays one batch of `edits` on `pre`. Inserted sections and cells are read from
/// `post`, the data the adapter exposes while the batch is applied.
pub fn apply_edits(pre: &Model, edits: &Edits, post: &Snapshot) -> Result<Model, String> {
    for &section in &edits.section_updated {
        if section >= pre.len() {
            return Err(format!("reload of missing section {section}"));
        }
    }
    for index_path in &edits.element_updated {
        if pre
            .get(index_path.section)
            .and_then(|(_, cells)| cells.get(index_path.item))
            .is_none()
        {
            return Err(format!("reload of missing item {index_path}"));
        }
    }

    let mut slots: Vec<(Identity, Vec<Option<Identity>>)> = pre
        .iter()
        .map(|(id, cells)| (id.clone(), cells.iter().cloned().map(Some).collect()))
        .collect();

    let mut take_cell = |index_path: &IndexPath| -> Result<Identity, String> {
        slots
            .get_mut(index_path.section)
            .and_then(|(_, cells)| cells.get_mut(index_path.item))
            .and_then(Option::take)
            .ok_or_else(|| format!("item {index_path} removed twice or out of range"))
    };
    for index_path in &edits.element_deleted {
        take_cell(index_path)?;
    }
    let mut moved_cells: HashMap<IndexPath, Identity> = HashMap::new();
    for (from, to) in &edits.element_moved {
        let id = take_cell(from)?;
        if moved_cells.insert(*to, id).is_some() {
            return Err(format!("two items moved to {to}"));
        }
    }

    let mut sections: Vec<Option<(Identity, Vec<Identity>)>> = slots
        .into_iter()
        .map(|(id, cells)| Some((id, cells.into_iter().flatten().collect())))
        .collect();
    let mut take_section = |index: usize| -> Result<(Identity, Vec<Identity>), String> {
        sections
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| format!("section {index} removed twice or out of range"))
    };
    for &index in &edits.section_deleted {
        take_section(index)?;
    }
    let mut moved_sections = HashMap::new();
    for &(from, to) in &edits.section_moved {
        let section = take_section(from)?;
        if moved_sections.insert(to, section).is_some() {
            return Err(format!("two sections moved to {to}"));
        }
    }

    let mut remaining = sections.into_iter().flatten().collect::<Vec<_>>().into_iter();
    let count = remaining.len() + moved_sections.len() + edits.section_inserted.len();
    let mut next = Vec::with_capacity(count);
    for index in 0..count {
        if edits.section_inserted.contains(&index) {
            let section = post
                .section(index)
                .ok_or_else(|| format!("inserted section {index} missing from data"))?;
            next.push((section.id.clone(), section.cell_ids().cloned().collect()));
        } else if let Some(section) = moved_sections.remove(&index) {
            next.push(section);
        } else {
            next.push(remaining.next().ok_or("ran out of sections")?);
        }
    }
    if !moved_sections.is_empty() {
        return Err(format!("section moves out of range: {moved_sections:?}"));
    }

    for (section_index, (_, cells)) in next.iter_mut().enumerate() {
        let inserted: Vec<usize> = edits
            .element_inserted
            .iter()
            .filter(|index_path| index_path.section == section_index)
            .map(|index_path| index_path.item)
            .collect();
        let arriving = moved_cells
            .keys()
            .filter(|index_path| index_path.section == section_index)
            .count();
        if inserted.is_empty() && arriving == 0 {
            continue;
        }
        let count = cells.len() + inserted.len() + arriving;
        let mut kept = std::mem::take(cells).into_iter();
        for item in 0..count {
            let index_path = IndexPath::new(section_index, item);
            let id = if inserted.contains(&item) {
                post.cell(index_path)
                    .map(|cell| cell.id.clone())
                    .ok_or_else(|| format!("inserted item {index_path} missing from data"))?
            } else if let Some(id) = moved_cells.remove(&index_path) {
                id
            } else {
                kept.next().ok_or_else(|| format!("ran out of items at {index_path}"))?
            };
            cells.push(id);
        }
    }
    if !moved_cells.is_empty() {
        return Err(format!("item moves out of range: {moved_cells:?}"));
    }
    Ok(next)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Register(ReuseKey),
    Reload,
    Begin { animated: bool },
    DeleteSections(Vec<usize>, EditAnimation),
    InsertSections(Vec<usize>, EditAnimation),
    ReloadSections(Vec<usize>, EditAnimation),
    MoveSection(usize, usize),
    DeleteItems(Vec<IndexPath>, EditAnimation),
    InsertItems(Vec<IndexPath>, EditAnimation),
    ReloadItems(Vec<IndexPath>, EditAnimation),
    MoveItem(IndexPath, IndexPath),
    End,
    SetOffset(Point),
}

impl Call {
    pub fn is_edit(&self) -> bool {
        !matches!(
            self,
            Call::Register(_) | Call::Reload | Call::Begin { .. } | Call::End | Call::SetOffset(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SlotKey {
    Cell(Identity, Identity),
    Header(Identity),
    Footer(Identity),
}

#[derive(Debug)]
struct Slot {
    position: Position,
    key: SlotKey,
    reuse_key: ReuseKey,
    instance: InstanceId,
}

#[derive(Debug)]
pub struct MockContainer {
    pub mounted: bool,
    pub scrolling: bool,
    pub interacting: bool,
    /// Number of cells laid out on screen, counted from the top.
    pub window: usize,
    pub row_height: f64,
    pub viewport: Size,
    pub offset: Point,
    pub model: Model,
    pub calls: Vec<Call>,
    pub fail_next_batch: bool,
    pending: Option<Edits>,
    visible: Vec<Slot>,
    pool: HashMap<ReuseKey, Vec<InstanceId>>,
}

impl Default for MockContainer {
    fn default() -> Self {
        MockContainer {
            mounted: true,
            scrolling: false,
            interacting: false,
            window: 10,
            row_height: 40.0,
            viewport: Size::new(320.0, 400.0),
            offset: Point::ZERO,
            model: Model::new(),
            calls: Vec::new(),
            fail_next_batch: false,
            pending: None,
            visible: Vec::new(),
            pool: HashMap::new(),
        }
    }
}

impl MockContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: usize) -> Self {
        MockContainer {
            window,
            ..Self::default()
        }
    }

    pub fn unmounted() -> Self {
        MockContainer {
            mounted: false,
            ..Self::default()
        }
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn reloads(&self) -> usize {
        self.count(|call| matches!(call, Call::Reload))
    }

    pub fn batches(&self) -> usize {
        self.count(|call| matches!(call, Call::Begin { .. }))
    }

    pub fn edits(&self) -> Vec<&Call> {
        self.calls.iter().filter(|call| call.is_edit()).collect()
    }

    pub fn cell_instance(
        &self,
        section: impl Into<Identity>,
        cell: impl Into<Identity>,
    ) -> Option<InstanceId> {
        let key = SlotKey::Cell(section.into(), cell.into());
        self.instance_for(&key)
    }

    pub fn header_instance(&self, section: impl Into<Identity>) -> Option<InstanceId> {
        self.instance_for(&SlotKey::Header(section.into()))
    }

    pub fn footer_instance(&self, section: impl Into<Identity>) -> Option<InstanceId> {
        self.instance_for(&SlotKey::Footer(section.into()))
    }

    pub fn visible_instances(&self) -> Vec<InstanceId> {
        self.visible.iter().map(|slot| slot.instance).collect()
    }

    fn instance_for(&self, key: &SlotKey) -> Option<InstanceId> {
        self.visible
            .iter()
            .find(|slot| &slot.key == key)
            .map(|slot| slot.instance)
    }

    fn batch(&mut self) -> &mut Edits {
        self.pending.as_mut().expect("edit issued outside of a batch")
    }

    fn recycle(&mut self, reuse_key: ReuseKey, instance: InstanceId) {
        self.pool.entry(reuse_key).or_default().push(instance);
    }

    /// Brings the visible slots in line with the adapter's data. Slots for which
    /// `reloaded` holds are recycled and dequeued again.
    fn layout(
        &mut self,
        adapter: &mut Adapter,
        reloaded: &dyn Fn(&SlotKey) -> bool,
    ) -> Result<(), ReconcilerError> {
        let wanted = wanted_slots(adapter.data(), self.window);
        let mut current: HashMap<SlotKey, Slot> = self
            .visible
            .drain(..)
            .map(|slot| (slot.key.clone(), slot))
            .collect();
        let mut next = Vec::with_capacity(wanted.len());

        for (position, key, reuse_key) in wanted {
            let instance = match current.remove(&key) {
                Some(slot) if slot.reuse_key == reuse_key && !reloaded(&key) => slot.instance,
                stale => {
                    if let Some(slot) = stale {
                        adapter.did_end_display(slot.instance);
                        self.recycle(slot.reuse_key, slot.instance);
                    }
                    let instance = match position {
                        Position::Cell(index_path) => adapter.dequeue_cell(&mut *self, index_path)?,
                        Position::Header(section) => adapter.dequeue_header(&mut *self, section)?,
                        Position::Footer(section) => adapter.dequeue_footer(&mut *self, section)?,
                    };
                    adapter.will_display(instance);
                    instance
                }
            };
            next.push(Slot {
                position,
                key,
                reuse_key,
                instance,
            });
        }

        for (_, slot) in current {
            adapter.did_end_display(slot.instance);
            self.recycle(slot.reuse_key, slot.instance);
        }
        self.visible = next;
        Ok(())
    }
}

fn wanted_slots(data: &Snapshot, window: usize) -> Vec<(Position, SlotKey, ReuseKey)> {
    let mut slots = Vec::new();
    let mut budget = window;
    for (index, section) in data.iter().enumerate() {
        if budget == 0 {
            break;
        }
        if let Some(header) = &section.header {
            slots.push((
                Position::Header(index),
                SlotKey::Header(section.id.clone()),
                header.component.reuse_key(),
            ));
        }
        for (item, cell) in section.cells.iter().take(budget).enumerate() {
            slots.push((
                Position::Cell(IndexPath::new(index, item)),
                SlotKey::Cell(section.id.clone(), cell.id.clone()),
                cell.component.reuse_key(),
            ));
        }
        budget -= section.cells.len().min(budget);
        if let Some(footer) = &section.footer {
            slots.push((
                Position::Footer(index),
                SlotKey::Footer(section.id.clone()),
                footer.component.reuse_key(),
            ));
        }
    }
    slots
}

impl Container for MockContainer {
    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    fn is_interacting(&self) -> bool {
        self.interacting
    }

    fn register(&mut self, reuse_key: &ReuseKey) {
        self.calls.push(Call::Register(reuse_key.clone()));
    }

    fn dequeue(&mut self, reuse_key: &ReuseKey, _position: Position) -> InstanceId {
        self.pool
            .get_mut(reuse_key)
            .and_then(Vec::pop)
            .unwrap_or_else(InstanceId::next)
    }

    fn visible_cells(&self) -> Vec<(IndexPath, InstanceId)> {
        self.visible
            .iter()
            .filter_map(|slot| match slot.position {
                Position::Cell(index_path) => Some((index_path, slot.instance)),
                _ => None,
            })
            .collect()
    }

    fn visible_headers(&self) -> Vec<(usize, InstanceId)> {
        self.visible
            .iter()
            .filter_map(|slot| match slot.position {
                Position::Header(section) => Some((section, slot.instance)),
                _ => None,
            })
            .collect()
    }

    fn visible_footers(&self) -> Vec<(usize, InstanceId)> {
        self.visible
            .iter()
            .filter_map(|slot| match slot.position {
                Position::Footer(section) => Some((section, slot.instance)),
                _ => None,
            })
            .collect()
    }

    fn reload_data(&mut self, adapter: &mut Adapter) -> Result<(), ReconcilerError> {
        self.calls.push(Call::Reload);
        self.model = model_of(adapter.data());
        self.layout(adapter, &|_| true)
    }

    fn begin_updates(&mut self, animated: bool) {
        assert!(self.pending.is_none(), "nested batch");
        self.calls.push(Call::Begin { animated });
        self.pending = Some(Edits::default());
    }

    fn delete_sections(&mut self, sections: &[usize], animation: EditAnimation) {
        self.calls.push(Call::DeleteSections(sections.to_vec(), animation));
        self.batch().section_deleted.extend_from_slice(sections);
    }

    fn insert_sections(&mut self, sections: &[usize], animation: EditAnimation) {
        self.calls.push(Call::InsertSections(sections.to_vec(), animation));
        self.batch().section_inserted.extend_from_slice(sections);
    }

    fn reload_sections(&mut self, sections: &[usize], animation: EditAnimation) {
        self.calls.push(Call::ReloadSections(sections.to_vec(), animation));
        self.batch().section_updated.extend_from_slice(sections);
    }

    fn move_section(&mut self, from: usize, to: usize) {
        self.calls.push(Call::MoveSection(from, to));
        self.batch().section_moved.push((from, to));
    }

    fn delete_items(&mut self, items: &[IndexPath], animation: EditAnimation) {
        self.calls.push(Call::DeleteItems(items.to_vec(), animation));
        self.batch().element_deleted.extend_from_slice(items);
    }

    fn insert_items(&mut self, items: &[IndexPath], animation: EditAnimation) {
        self.calls.push(Call::InsertItems(items.to_vec(), animation));
        self.batch().element_inserted.extend_from_slice(items);
    }

    fn reload_items(&mut self, items: &[IndexPath], animation: EditAnimation) {
        self.calls.push(Call::ReloadItems(items.to_vec(), animation));
        self.batch().element_updated.extend_from_slice(items);
    }

    fn move_item(&mut self, from: IndexPath, to: IndexPath) {
        self.calls.push(Call::MoveItem(from, to));
        self.batch().element_moved.push((from, to));
    }

    fn end_updates(&mut self, adapter: &mut Adapter) -> Result<(), ReconcilerError> {
        let edits = self
            .pending
            .take()
            .ok_or_else(|| ReconcilerError::Container("end_updates without a batch".into()))?;
        self.calls.push(Call::End);
        if self.fail_next_batch {
            self.fail_next_batch = false;
            return Err(ReconcilerError::Container("injected batch failure".into()));
        }

        let next = apply_edits(&self.model, &edits, adapter.data()).map_err(ReconcilerError::Container)?;
        let expected = model_of(adapter.data());
        if next != expected {
            return Err(ReconcilerError::Container(format!(
                "batch produced {next:?}, data holds {expected:?}"
            )));
        }

        let reloaded_cells: HashSet<(Identity, Identity)> = edits
            .element_updated
            .iter()
            .filter_map(|index_path| {
                let (section, cells) = self.model.get(index_path.section)?;
                Some((section.clone(), cells.get(index_path.item)?.clone()))
            })
            .collect();
        let reloaded_sections: HashSet<Identity> = edits
            .section_updated
            .iter()
            .filter_map(|&index| self.model.get(index).map(|(id, _)| id.clone()))
            .collect();
        self.model = next;

        self.layout(adapter, &|key| match key {
            SlotKey::Cell(section, cell) => {
                reloaded_sections.contains(section)
                    || reloaded_cells.contains(&(section.clone(), cell.clone()))
            }
            SlotKey::Header(section) | SlotKey::Footer(section) => {
                reloaded_sections.contains(section)
            }
        })
    }

    fn content_offset(&self) -> Point {
        self.offset
    }

    fn set_content_offset(&mut self, offset: Point) {
        self.calls.push(Call::SetOffset(offset));
        self.offset = offset;
    }

    fn content_size(&self) -> Size {
        let rows: usize = self.model.iter().map(|(_, cells)| cells.len()).sum();
        Size::new(self.viewport.width, rows as f64 * self.row_height)
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }
}

/// Text cell whose content refuses re-renders while it is being edited.
#[derive(Debug, Clone)]
pub struct Label {
    pub text: String,
}

#[derive(Debug, Default)]
pub struct LabelView {
    pub text: String,
    pub renders: usize,
    pub appearances: usize,
    pub disappearances: usize,
    pub editing: bool,
}

impl Component for Label {
    type Content = LabelView;

    fn render_content(&self) -> LabelView {
        LabelView::default()
    }

    fn render(&self, content: &mut LabelView) {
        content.text.clone_from(&self.text);
        content.renders += 1;
    }

    fn is_content_equal(&self, next: &Self) -> bool {
        self.text == next.text
    }

    fn should_render(&self, _next: &Self, content: &LabelView) -> bool {
        !content.editing
    }

    fn reference_size(&self, bounds: Size) -> Option<Size> {
        Some(Size::new(bounds.width, 40.0))
    }

    fn content_will_display(&self, content: &mut LabelView) {
        content.appearances += 1;
    }

    fn content_did_end_display(&self, content: &mut LabelView) {
        content.disappearances += 1;
    }
}

pub fn label(text: impl Into<String>) -> Label {
    Label { text: text.into() }
}

/// Section header or footer text.
#[derive(Debug, Clone)]
pub struct Caption(pub String);

impl Component for Caption {
    type Content = String;

    fn render_content(&self) -> String {
        String::new()
    }

    fn render(&self, content: &mut String) {
        content.clone_from(&self.0);
    }

    fn is_content_equal(&self, next: &Self) -> bool {
        self.0 == next.0
    }
}

pub fn caption(text: impl Into<String>) -> Caption {
    Caption(text.into())
}

/// Section whose cells are labels, given as `(id, text)` pairs.
pub fn section(id: impl Into<Identity>, cells: &[(&str, &str)]) -> Section {
    cells
        .iter()
        .fold(Section::new(id), |section, &(cell, text)| section.cell(cell, label(text)))
}

/// Section whose cells are labels showing their own id.
pub fn plain_section(id: impl Into<Identity>, cells: &[&str]) -> Section {
    cells
        .iter()
        .fold(Section::new(id), |section, &cell| section.cell(cell, label(cell)))
}

/// Renderer with `initial` already loaded into a mounted container and the
/// setup calls cleared.
pub fn mounted_renderer(
    initial: impl Into<Snapshot>,
    container: MockContainer,
    config: UpdaterConfig,
) -> Renderer<MockContainer> {
    init_logging();
    let mut renderer = Renderer::new(Updater::new(config));
    renderer.render(initial).expect("detached render");
    renderer.attach(container).expect("attach");
    renderer.target_mut().expect("attached").calls.clear();
    renderer
}

pub fn label_view(renderer: &Renderer<MockContainer>, instance: InstanceId) -> &LabelView {
    renderer
        .adapter()
        .render_cache()
        .content::<LabelView>(instance)
        .expect("label content")
}

/// Text shown by the visible cell `cell` of section `section`.
pub fn shown_text(
    renderer: &Renderer<MockContainer>,
    section: impl Into<Identity>,
    cell: impl Into<Identity>,
) -> Option<String> {
    let instance = renderer.target()?.cell_instance(section, cell)?;
    Some(label_view(renderer, instance).text.clone())
}
