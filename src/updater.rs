//! Applies a desired snapshot to an adapter and its container.
//!
//! The updater picks between three paths: replace the data only (no container or
//! nothing changed), reload the container wholesale (unmounted, or too many edits
//! to animate), or apply each diff stage as one batch of container edits.
use crate::adapter::Adapter;
use crate::config::{EditAnimations, UpdaterConfig};
use crate::container::Container;
use crate::diff_engine::{ChangeStage, DiffEngine, DiffProvider};
use crate::errors::ReconcilerError;
use crate::section::Snapshot;
use crate::types::{EditKind, Point};
use log::{Level, debug, log_enabled, trace};

/// Called once an update has fully finished.
pub type Completion<'a> = Box<dyn FnOnce() + 'a>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// The container was not mounted.
    Unmounted,
    /// The diff held this many edits, more than the animatable ceiling.
    TooManyChanges(usize),
}

/// Which path an update took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No container attached; only the adapter's data was replaced.
    Detached,
    Reloaded(ReloadReason),
    /// The diff was empty.
    Unchanged,
    Applied {
        stages: usize,
        changes: usize,
        animated: bool,
    },
}

pub struct Updater {
    config: UpdaterConfig,
    differ: Box<dyn DiffProvider>,
}

impl Default for Updater {
    fn default() -> Self {
        Updater::new(UpdaterConfig::default())
    }
}

impl std::fmt::Debug for Updater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Updater {
    pub fn new(config: UpdaterConfig) -> Self {
        config.validate();
        Updater {
            config,
            differ: Box::new(DiffEngine),
        }
    }

    /// Swaps in another diff provider.
    pub fn with_diff_provider(mut self, differ: impl DiffProvider + 'static) -> Self {
        self.differ = Box::new(differ);
        self
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut UpdaterConfig {
        &mut self.config
    }

    /// Brings `adapter` and `target` to `data`. `completion` runs after every
    /// path once the work is done; it is dropped uncalled if an error propagates.
    pub fn perform_update(
        &self,
        target: Option<&mut dyn Container>,
        adapter: &mut Adapter,
        data: Snapshot,
        completion: Option<Completion<'_>>,
    ) -> Result<UpdateOutcome, ReconcilerError> {
        let outcome = self.update(target, adapter, data)?;
        debug!("Updater: update finished with {:?}", outcome);
        if let Some(completion) = completion {
            completion();
        }
        Ok(outcome)
    }

    fn update(
        &self,
        target: Option<&mut dyn Container>,
        adapter: &mut Adapter,
        data: Snapshot,
    ) -> Result<UpdateOutcome, ReconcilerError> {
        let Some(target) = target else {
            debug!("Updater: no container attached, replacing data");
            adapter.set_data(data);
            return Ok(UpdateOutcome::Detached);
        };

        if !target.is_mounted() {
            debug!("Updater: container not mounted, reloading");
            adapter.set_data(data);
            target.reload_data(adapter)?;
            return Ok(UpdateOutcome::Reloaded(ReloadReason::Unmounted));
        }

        let changeset = self.differ.diff(adapter.data(), &data);

        if changeset.is_empty() {
            adapter.set_data(data);
            if self.config.always_render_visible_components {
                self.render_visible_components(target, adapter)?;
            }
            return Ok(UpdateOutcome::Unchanged);
        }

        let offset = target.content_offset();
        let changes = changeset.change_count();

        if changes > self.config.animatable_change_count {
            debug!(
                "Updater: {} changes exceed the animatable ceiling of {}, reloading",
                changes, self.config.animatable_change_count
            );
            adapter.set_data(data);
            // No refresh pass: reloading renders every visible instance.
            target.reload_data(adapter)?;
            if self.config.keeps_content_offset {
                restore_content_offset(target, offset);
            }
            return Ok(UpdateOutcome::Reloaded(ReloadReason::TooManyChanges(changes)));
        }

        let animated = self.config.animation_enabled
            && (self.config.animation_enabled_while_scrolling || !target.is_scrolling());
        let stages = changeset.len();
        for (index, stage) in changeset.into_iter().enumerate() {
            trace!("Updater: applying stage {}/{}", index + 1, stages);
            self.apply_stage(target, adapter, stage, animated)?;
        }

        if self.config.keeps_content_offset {
            restore_content_offset(target, offset);
        }
        if self.config.always_render_visible_components {
            self.render_visible_components(target, adapter)?;
        }
        Ok(UpdateOutcome::Applied {
            stages,
            changes,
            animated,
        })
    }

    /// Issues one stage as a single container batch.
    fn apply_stage(
        &self,
        target: &mut dyn Container,
        adapter: &mut Adapter,
        stage: ChangeStage,
        animated: bool,
    ) -> Result<(), ReconcilerError> {
        let ChangeStage { data, edits } = stage;
        let animations = if animated {
            self.config.animations
        } else {
            EditAnimations::NONE
        };
        if log_enabled!(Level::Trace) {
            if let Ok(json) = serde_json::to_string(&edits) {
                trace!("Updater: edits {}", json);
            }
        }

        target.begin_updates(animated);
        // Index queries issued during the batch must already see the new identities.
        adapter.set_data(data);

        if !edits.section_deleted.is_empty() {
            target.delete_sections(&edits.section_deleted, animations.delete_sections);
        }
        if !edits.section_inserted.is_empty() {
            target.insert_sections(&edits.section_inserted, animations.insert_sections);
        }
        if !edits.section_updated.is_empty() {
            target.reload_sections(&edits.section_updated, animations.reload_sections);
        }
        for &(from, to) in &edits.section_moved {
            target.move_section(from, to);
        }

        if !edits.element_deleted.is_empty() {
            target.delete_items(&edits.element_deleted, animations.delete_items);
        }
        if !edits.element_inserted.is_empty() {
            target.insert_items(&edits.element_inserted, animations.insert_items);
        }
        if !edits.element_updated.is_empty() {
            if self.config.skip_reload_components {
                trace!(
                    "Updater: skipping {} item {} edits",
                    edits.element_updated.len(),
                    EditKind::Update
                );
            } else {
                target.reload_items(&edits.element_updated, animations.reload_items);
            }
        }
        for &(from, to) in &edits.element_moved {
            target.move_item(from, to);
        }

        target.end_updates(adapter)
    }

    /// Re-submits every visible header, footer and cell to the render cache.
    pub fn render_visible_components(
        &self,
        target: &mut dyn Container,
        adapter: &mut Adapter,
    ) -> Result<(), ReconcilerError> {
        for (section, instance) in target.visible_headers() {
            adapter.render_header(instance, section)?;
        }
        for (section, instance) in target.visible_footers() {
            adapter.render_footer(instance, section)?;
        }
        for (index_path, instance) in target.visible_cells() {
            adapter.render_cell(instance, index_path)?;
        }
        Ok(())
    }
}

fn restore_content_offset(target: &mut dyn Container, offset: Point) {
    if target.is_interacting() {
        debug!("Updater: container is being manipulated, leaving the offset alone");
        return;
    }
    let restored = offset.clamped(Point::ZERO, target.max_content_offset());
    trace!("Updater: restoring content offset to {:?}", restored);
    target.set_content_offset(restored);
}
