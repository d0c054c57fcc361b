//! Entry point tying a container, an adapter and an updater together
use crate::adapter::Adapter;
use crate::container::Container;
use crate::errors::ReconcilerError;
use crate::section::Snapshot;
use crate::updater::{Completion, UpdateOutcome, Updater};
use log::debug;

/// Renders successive snapshots into an optional container.
///
/// Updates are serial: each call runs to completion before returning. Callers that
/// produce snapshots faster than they can be applied can [`schedule`](Self::schedule)
/// them; only the latest pending snapshot survives until [`flush`](Self::flush).
#[derive(Debug)]
pub struct Renderer<C> {
    target: Option<C>,
    adapter: Adapter,
    updater: Updater,
    pending: Option<Snapshot>,
}

impl<C: Container> Default for Renderer<C> {
    fn default() -> Self {
        Renderer::new(Updater::default())
    }
}

impl<C: Container> Renderer<C> {
    pub fn new(updater: Updater) -> Self {
        Renderer {
            target: None,
            adapter: Adapter::new(),
            updater,
            pending: None,
        }
    }

    /// Attaches a container, reloading it from the current data when mounted.
    /// Returns the previously attached container, whose instances end display and
    /// lose their render state.
    pub fn attach(&mut self, mut target: C) -> Result<Option<C>, ReconcilerError> {
        let previous = self.detach();
        self.adapter.reset_registrations();
        if target.is_mounted() {
            target.reload_data(&mut self.adapter)?;
        }
        self.target = Some(target);
        Ok(previous)
    }

    /// Detaches the container. Later updates only replace the data.
    pub fn detach(&mut self) -> Option<C> {
        let target = self.target.take();
        if let Some(target) = &target {
            let visible = target
                .visible_headers()
                .into_iter()
                .chain(target.visible_footers())
                .map(|(_, instance)| instance)
                .chain(target.visible_cells().into_iter().map(|(_, instance)| instance));
            for instance in visible {
                self.adapter.did_end_display(instance);
            }
        }
        let released = self.adapter.render_cache().len();
        self.adapter.render_cache_mut().clear();
        if released > 0 {
            debug!("Renderer: released {} render states", released);
        }
        target
    }

    pub fn target(&self) -> Option<&C> {
        self.target.as_ref()
    }

    pub fn target_mut(&mut self) -> Option<&mut C> {
        self.target.as_mut()
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut Adapter {
        &mut self.adapter
    }

    pub fn updater(&self) -> &Updater {
        &self.updater
    }

    pub fn updater_mut(&mut self) -> &mut Updater {
        &mut self.updater
    }

    /// Snapshot currently applied.
    pub fn data(&self) -> &Snapshot {
        self.adapter.data()
    }

    pub fn render(&mut self, data: impl Into<Snapshot>) -> Result<UpdateOutcome, ReconcilerError> {
        self.perform_update(data.into(), None)
    }

    pub fn perform_update(
        &mut self,
        data: Snapshot,
        completion: Option<Completion<'_>>,
    ) -> Result<UpdateOutcome, ReconcilerError> {
        let target = self.target.as_mut().map(|t| t as &mut dyn Container);
        self.updater
            .perform_update(target, &mut self.adapter, data, completion)
    }

    /// Queues `data`, replacing any snapshot still waiting. Returns the replaced one.
    pub fn schedule(&mut self, data: impl Into<Snapshot>) -> Option<Snapshot> {
        let replaced = self.pending.replace(data.into());
        if replaced.is_some() {
            debug!("Renderer: coalesced a pending snapshot");
        }
        replaced
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Applies the pending snapshot, if any.
    pub fn flush(&mut self) -> Result<Option<UpdateOutcome>, ReconcilerError> {
        match self.pending.take() {
            Some(data) => self.perform_update(data, None).map(Some),
            None => Ok(None),
        }
    }
}
