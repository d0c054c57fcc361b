//! Two-level snapshot model: sections of header, cells and footer.
use crate::component::{AnyComponent, Component};
use crate::errors::ReconcilerError;
use crate::types::{Identity, IndexPath};
use std::collections::HashSet;

/// A positionally diffed cell element.
#[derive(Debug, Clone)]
pub struct CellNode {
    pub id: Identity,
    pub component: AnyComponent,
}

impl CellNode {
    pub fn new(id: impl Into<Identity>, component: impl Component) -> Self {
        CellNode {
            id: id.into(),
            component: AnyComponent::new(component),
        }
    }

    pub fn from_any(id: impl Into<Identity>, component: AnyComponent) -> Self {
        CellNode {
            id: id.into(),
            component,
        }
    }
}

/// A header or footer element. Compared by content only.
#[derive(Debug, Clone)]
pub struct ViewNode {
    pub component: AnyComponent,
}

impl ViewNode {
    pub fn new(component: impl Component) -> Self {
        ViewNode {
            component: AnyComponent::new(component),
        }
    }

    pub fn from_any(component: AnyComponent) -> Self {
        ViewNode { component }
    }

    pub fn is_content_equal(&self, other: &ViewNode) -> bool {
        self.component.is_content_equal(&other.component)
    }
}

fn optional_view_eq(a: Option<&ViewNode>, b: Option<&ViewNode>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.is_content_equal(b),
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    pub id: Identity,
    pub header: Option<ViewNode>,
    pub cells: Vec<CellNode>,
    pub footer: Option<ViewNode>,
}

impl Section {
    pub fn new(id: impl Into<Identity>) -> Self {
        Section {
            id: id.into(),
            header: None,
            cells: Vec::new(),
            footer: None,
        }
    }

    pub fn header(mut self, component: impl Component) -> Self {
        self.header = Some(ViewNode::new(component));
        self
    }

    pub fn footer(mut self, component: impl Component) -> Self {
        self.footer = Some(ViewNode::new(component));
        self
    }

    pub fn cell(mut self, id: impl Into<Identity>, component: impl Component) -> Self {
        self.cells.push(CellNode::new(id, component));
        self
    }

    pub fn cells(mut self, cells: impl IntoIterator<Item = CellNode>) -> Self {
        self.cells.extend(cells);
        self
    }

    /// Whether the section itself changed. Only header and footer take part;
    /// cells are diffed on their own.
    pub fn is_content_equal(&self, other: &Section) -> bool {
        optional_view_eq(self.header.as_ref(), other.header.as_ref())
            && optional_view_eq(self.footer.as_ref(), other.footer.as_ref())
    }

    pub fn cell_ids(&self) -> impl Iterator<Item = &Identity> + '_ {
        self.cells.iter().map(|cell| &cell.id)
    }
}

/// Ordered sections forming one diffable state. Build a new one for every desired
/// state instead of mutating the current one.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    sections: Vec<Section>,
}

impl Snapshot {
    pub fn new(sections: Vec<Section>) -> Self {
        Snapshot { sections }
    }

    pub fn empty() -> Self {
        Snapshot::default()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn cell(&self, index_path: IndexPath) -> Option<&CellNode> {
        self.sections
            .get(index_path.section)
            .and_then(|section| section.cells.get(index_path.item))
    }

    pub fn total_cells(&self) -> usize {
        self.sections.iter().map(|section| section.cells.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// Checks identity uniqueness: sections within the snapshot, cells within
    /// their section.
    pub fn validate(&self) -> Result<(), ReconcilerError> {
        let mut section_ids = HashSet::with_capacity(self.sections.len());
        for (index, section) in self.sections.iter().enumerate() {
            if !section_ids.insert(&section.id) {
                return Err(ReconcilerError::DuplicateSection {
                    id: section.id.clone(),
                    index,
                });
            }
            let mut cell_ids = HashSet::with_capacity(section.cells.len());
            for (item, cell) in section.cells.iter().enumerate() {
                if !cell_ids.insert(&cell.id) {
                    return Err(ReconcilerError::DuplicateCell {
                        section: index,
                        id: cell.id.clone(),
                        index: item,
                    });
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<Section> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        Snapshot::new(iter.into_iter().collect())
    }
}

impl From<Vec<Section>> for Snapshot {
    fn from(sections: Vec<Section>) -> Self {
        Snapshot::new(sections)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
