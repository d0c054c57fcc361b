//! Staged sectioned diffing with LIS-minimised moves
use crate::section::{CellNode, Section, Snapshot};
use crate::types::{EditKind, Identity, IndexPath};
use indexmap::IndexMap;
use lis::LisExt;
use log::{debug, trace};
use serde::Serialize;
use std::collections::HashSet;

/// Edits of one stage, each list expressed in the index space its operation
/// requires: deletes, updates and move sources against the state before the
/// stage, inserts and move destinations against the state after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Edits {
    pub section_deleted: Vec<usize>,
    pub section_inserted: Vec<usize>,
    pub section_updated: Vec<usize>,
    pub section_moved: Vec<(usize, usize)>,
    pub element_deleted: Vec<IndexPath>,
    pub element_inserted: Vec<IndexPath>,
    pub element_updated: Vec<IndexPath>,
    pub element_moved: Vec<(IndexPath, IndexPath)>,
}

impl Edits {
    pub fn change_count(&self) -> usize {
        self.section_deleted.len()
            + self.section_inserted.len()
            + self.section_updated.len()
            + self.section_moved.len()
            + self.element_deleted.len()
            + self.element_inserted.len()
            + self.element_updated.len()
            + self.element_moved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    /// Number of section and element edits of one kind.
    pub fn count(&self, kind: EditKind) -> usize {
        match kind {
            EditKind::Delete => self.section_deleted.len() + self.element_deleted.len(),
            EditKind::Insert => self.section_inserted.len() + self.element_inserted.len(),
            EditKind::Update => self.section_updated.len() + self.element_updated.len(),
            EditKind::Move => self.section_moved.len() + self.element_moved.len(),
        }
    }
}

/// One atomic batch of edits plus the snapshot it produces.
#[derive(Debug, Clone)]
pub struct ChangeStage {
    pub data: Snapshot,
    pub edits: Edits,
}

impl ChangeStage {
    pub fn change_count(&self) -> usize {
        self.edits.change_count()
    }
}

/// Stages that turn a source snapshot into a target snapshot when applied in order.
#[derive(Debug, Clone, Default)]
pub struct StagedChangeset {
    stages: Vec<ChangeStage>,
}

impl StagedChangeset {
    pub fn new(stages: Vec<ChangeStage>) -> Self {
        StagedChangeset { stages }
    }

    pub fn stages(&self) -> &[ChangeStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Total number of edits over all stages.
    pub fn change_count(&self) -> usize {
        self.stages.iter().map(ChangeStage::change_count).sum()
    }

    pub fn last(&self) -> Option<&ChangeStage> {
        self.stages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeStage> {
        self.stages.iter()
    }
}

impl IntoIterator for StagedChangeset {
    type Item = ChangeStage;
    type IntoIter = std::vec::IntoIter<ChangeStage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.into_iter()
    }
}

impl<'a> IntoIterator for &'a StagedChangeset {
    type Item = &'a ChangeStage;
    type IntoIter = std::slice::Iter<'a, ChangeStage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}

/// Computes the staged edits between two snapshots.
///
/// Implementations must guarantee that applying every stage in order turns
/// `source` into `target`, and that no stage references a position twice in a way
/// a container could not apply as one batch.
pub trait DiffProvider {
    fn diff(&self, source: &Snapshot, target: &Snapshot) -> StagedChangeset;
}

impl<F> DiffProvider for F
where
    F: Fn(&Snapshot, &Snapshot) -> StagedChangeset,
{
    fn diff(&self, source: &Snapshot, target: &Snapshot) -> StagedChangeset {
        self(source, target)
    }
}

/// Default diff provider.
///
/// Sections are matched by identity across the snapshot, cells by identity within
/// a section that survives. Up to five stages are produced, empty ones omitted:
///
/// 1. element updates
/// 2. section deletes and element deletes
/// 3. section inserts and section moves
/// 4. element inserts and element moves
/// 5. section updates (header or footer changed)
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    pub fn new() -> Self {
        DiffEngine
    }
}

impl DiffProvider for DiffEngine {
    fn diff(&self, source: &Snapshot, target: &Snapshot) -> StagedChangeset {
        debug_assert!(source.validate().is_ok(), "source snapshot: {:?}", source.validate());
        debug_assert!(target.validate().is_ok(), "target snapshot: {:?}", target.validate());

        let changeset = SectionedDiff::new(source, target).into_changeset();
        debug!(
            "DiffEngine: {} sections -> {} sections, {} stages, {} changes",
            source.len(),
            target.len(),
            changeset.len(),
            changeset.change_count()
        );
        changeset
    }
}

/// Cell matching inside one surviving section.
struct CellMatch {
    target_section: usize,
    /// For each source cell, the index of the same identity in the target section.
    source_to_target: Vec<Option<usize>>,
    /// For each target cell, the index of the same identity in the source section.
    target_to_source: Vec<Option<usize>>,
}

impl CellMatch {
    fn new(source: &Section, target_section: usize, target: &Section) -> Self {
        let target_ids: IndexMap<&Identity, usize> =
            target.cell_ids().enumerate().map(|(i, id)| (id, i)).collect();
        let source_ids: IndexMap<&Identity, usize> =
            source.cell_ids().enumerate().map(|(i, id)| (id, i)).collect();

        CellMatch {
            target_section,
            source_to_target: source.cell_ids().map(|id| target_ids.get(id).copied()).collect(),
            target_to_source: target.cell_ids().map(|id| source_ids.get(id).copied()).collect(),
        }
    }
}

struct SectionedDiff<'a> {
    source: &'a Snapshot,
    target: &'a Snapshot,
    /// For each source section, its index in the target.
    source_to_target: Vec<Option<usize>>,
    /// For each target section, its index in the source.
    target_to_source: Vec<Option<usize>>,
    /// Surviving sections keyed by source index, in source order.
    matches: IndexMap<usize, CellMatch>,
}

impl<'a> SectionedDiff<'a> {
    fn new(source: &'a Snapshot, target: &'a Snapshot) -> Self {
        let target_ids: IndexMap<&Identity, usize> =
            target.iter().enumerate().map(|(i, s)| (&s.id, i)).collect();
        let source_ids: IndexMap<&Identity, usize> =
            source.iter().enumerate().map(|(i, s)| (&s.id, i)).collect();

        let source_to_target: Vec<Option<usize>> =
            source.iter().map(|s| target_ids.get(&s.id).copied()).collect();
        let target_to_source: Vec<Option<usize>> =
            target.iter().map(|s| source_ids.get(&s.id).copied()).collect();

        let matches = source_to_target
            .iter()
            .enumerate()
            .filter_map(|(s, t)| t.map(|t| (s, t)))
            .map(|(s, t)| {
                let cells = CellMatch::new(&source.sections()[s], t, &target.sections()[t]);
                (s, cells)
            })
            .collect();

        SectionedDiff {
            source,
            target,
            source_to_target,
            target_to_source,
            matches,
        }
    }

    fn source_section(&self, index: usize) -> &'a Section {
        &self.source.sections()[index]
    }

    fn target_section(&self, index: usize) -> &'a Section {
        &self.target.sections()[index]
    }

    /// Surviving cells of a source section in source order, carrying the target's
    /// element for each identity.
    fn surviving_cells(&self, cells: &CellMatch) -> Vec<CellNode> {
        let target = self.target_section(cells.target_section);
        cells
            .source_to_target
            .iter()
            .filter_map(|t| t.map(|t| target.cells[t].clone()))
            .collect()
    }

    fn into_changeset(self) -> StagedChangeset {
        let mut stages = vec![
            self.update_stage(),
            self.delete_stage(),
            self.section_placement_stage(),
            self.element_placement_stage(),
            self.section_update_stage(),
        ];
        stages.retain(|stage| !stage.edits.is_empty());

        if let Some(last) = stages.last_mut() {
            last.data = self.target.clone();
        }
        for (i, stage) in stages.iter().enumerate() {
            trace!(
                "DiffEngine: stage {} {}={} {}={} {}={} {}={}",
                i,
                EditKind::Delete,
                stage.edits.count(EditKind::Delete),
                EditKind::Insert,
                stage.edits.count(EditKind::Insert),
                EditKind::Update,
                stage.edits.count(EditKind::Update),
                EditKind::Move,
                stage.edits.count(EditKind::Move),
            );
        }
        StagedChangeset::new(stages)
    }

    fn update_stage(&self) -> ChangeStage {
        let mut edits = Edits::default();
        let mut sections = Vec::with_capacity(self.source.len());

        for (s, section) in self.source.iter().enumerate() {
            let Some(cells) = self.matches.get(&s) else {
                sections.push(section.clone());
                continue;
            };
            let target = self.target_section(cells.target_section);
            let mut next = section.clone();
            for (i, t) in cells.source_to_target.iter().enumerate() {
                let Some(t) = *t else { continue };
                let replacement = &target.cells[t];
                if !section.cells[i].component.is_content_equal(&replacement.component) {
                    edits.element_updated.push(IndexPath::new(s, i));
                }
                next.cells[i] = replacement.clone();
            }
            sections.push(next);
        }

        ChangeStage {
            data: Snapshot::new(sections),
            edits,
        }
    }

    fn delete_stage(&self) -> ChangeStage {
        let mut edits = Edits::default();
        let mut sections = Vec::with_capacity(self.matches.len());

        for (s, t) in self.source_to_target.iter().enumerate() {
            if t.is_none() {
                edits.section_deleted.push(s);
            }
        }
        for (&s, cells) in &self.matches {
            for (i, t) in cells.source_to_target.iter().enumerate() {
                if t.is_none() {
                    edits.element_deleted.push(IndexPath::new(s, i));
                }
            }
            let mut section = self.source_section(s).clone();
            section.cells = self.surviving_cells(cells);
            sections.push(section);
        }

        ChangeStage {
            data: Snapshot::new(sections),
            edits,
        }
    }

    fn section_placement_stage(&self) -> ChangeStage {
        let mut edits = Edits::default();
        // Position of each surviving source section after the delete stage.
        let after_delete: IndexMap<usize, usize> = self
            .matches
            .keys()
            .enumerate()
            .map(|(position, &s)| (s, position))
            .collect();

        let sequence: Vec<usize> = self
            .target_to_source
            .iter()
            .filter_map(|s| s.map(|s| after_delete[&s]))
            .collect();
        let stable = stable_positions(&sequence);

        let mut sections = Vec::with_capacity(self.target.len());
        for (t, s) in self.target_to_source.iter().enumerate() {
            match *s {
                Some(s) => {
                    let from = after_delete[&s];
                    if !stable.contains(&from) {
                        edits.section_moved.push((from, t));
                    }
                    let mut section = self.source_section(s).clone();
                    section.cells = self.surviving_cells(&self.matches[&s]);
                    sections.push(section);
                }
                None => {
                    edits.section_inserted.push(t);
                    sections.push(self.target_section(t).clone());
                }
            }
        }

        ChangeStage {
            data: Snapshot::new(sections),
            edits,
        }
    }

    fn element_placement_stage(&self) -> ChangeStage {
        let mut edits = Edits::default();
        let mut sections = Vec::with_capacity(self.target.len());

        for (t, s) in self.target_to_source.iter().enumerate() {
            let target = self.target_section(t);
            let Some(s) = *s else {
                sections.push(target.clone());
                continue;
            };
            let cells = &self.matches[&s];

            // Position of each surviving source cell after the delete stage.
            let mut after_delete = vec![None; cells.source_to_target.len()];
            for (position, i) in cells
                .source_to_target
                .iter()
                .enumerate()
                .filter(|(_, t)| t.is_some())
                .map(|(i, _)| i)
                .enumerate()
            {
                after_delete[i] = Some(position);
            }

            let sequence: Vec<usize> = cells
                .target_to_source
                .iter()
                .filter_map(|i| i.and_then(|i| after_delete[i]))
                .collect();
            let stable = stable_positions(&sequence);

            for (j, i) in cells.target_to_source.iter().enumerate() {
                match i.and_then(|i| after_delete[i]) {
                    Some(from) if !stable.contains(&from) => edits
                        .element_moved
                        .push((IndexPath::new(t, from), IndexPath::new(t, j))),
                    Some(_) => {}
                    None => edits.element_inserted.push(IndexPath::new(t, j)),
                }
            }

            let mut section = self.source_section(s).clone();
            section.cells = target.cells.clone();
            sections.push(section);
        }

        ChangeStage {
            data: Snapshot::new(sections),
            edits,
        }
    }

    fn section_update_stage(&self) -> ChangeStage {
        let mut edits = Edits::default();
        for (t, s) in self.target_to_source.iter().enumerate() {
            if let Some(s) = *s {
                if !self.source_section(s).is_content_equal(self.target_section(t)) {
                    edits.section_updated.push(t);
                }
            }
        }
        ChangeStage {
            data: self.target.clone(),
            edits,
        }
    }
}

/// Values of `sequence` that stay put: a longest strictly increasing run of
/// positions. Everything else has to move.
fn stable_positions(sequence: &[usize]) -> HashSet<usize> {
    sequence
        .longest_increasing_subsequence()
        .into_iter()
        .map(|i| sequence[i])
        .collect()
}
