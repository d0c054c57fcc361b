//! Per-instance render bookkeeping.
//!
//! Every live visual instance the container hands out is tracked here by its
//! [`InstanceId`]. An instance starts out empty; the first element submitted builds
//! its content and renders unconditionally. Later submissions go through the
//! previously rendered element's `should_render` veto, independently of whatever
//! the diff decided.
use crate::component::AnyComponent;
use crate::errors::ReconcilerError;
use crate::types::InstanceId;
use log::trace;
use std::any::Any;
use std::collections::HashMap;

/// What happened when an element was submitted to an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Content was built and rendered for the first time.
    Created,
    /// Existing content was re-rendered with the new element.
    Rendered,
    /// The previously rendered element vetoed the update.
    Suppressed,
}

pub struct RenderState {
    component: AnyComponent,
    content: Box<dyn Any>,
    visible: bool,
}

impl RenderState {
    /// Element most recently applied into the content.
    pub fn component(&self) -> &AnyComponent {
        &self.component
    }

    pub fn content(&self) -> &dyn Any {
        self.content.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl std::fmt::Debug for RenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderState")
            .field("component", &self.component)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

/// Side table from live instance handles to their render state.
#[derive(Debug, Default)]
pub struct RenderCache {
    states: HashMap<InstanceId, RenderState>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submits `next` for rendering into `instance`.
    pub fn render(
        &mut self,
        instance: InstanceId,
        next: &AnyComponent,
    ) -> Result<RenderOutcome, ReconcilerError> {
        let Some(state) = self.states.get_mut(&instance) else {
            let mut content = next.render_content();
            next.render(content.as_mut())?;
            trace!("RenderCache: {} created for {}", instance, next.type_name());
            self.states.insert(
                instance,
                RenderState {
                    component: next.clone(),
                    content,
                    visible: false,
                },
            );
            return Ok(RenderOutcome::Created);
        };

        if state.component.kind() != next.kind() {
            return Err(ReconcilerError::KindMismatch {
                expected: state.component.type_name(),
                actual: next.type_name(),
            });
        }

        if !state.component.should_render(next, state.content.as_ref()) {
            // Keep the old element so later comparisons start from what is on screen.
            trace!("RenderCache: {} suppressed re-render", instance);
            return Ok(RenderOutcome::Suppressed);
        }

        next.render(state.content.as_mut())?;
        state.component = next.clone();
        trace!("RenderCache: {} re-rendered", instance);
        Ok(RenderOutcome::Rendered)
    }

    /// Forwards a "will become visible" notification. Fires the element hook only
    /// on an invisible-to-visible transition. Returns whether the hook fired.
    pub fn will_display(&mut self, instance: InstanceId) -> bool {
        match self.states.get_mut(&instance) {
            Some(state) if !state.visible => {
                state.visible = true;
                state.component.will_display(state.content.as_mut());
                true
            }
            _ => false,
        }
    }

    /// Forwards a "did become invisible" notification, once per transition.
    pub fn did_end_display(&mut self, instance: InstanceId) -> bool {
        match self.states.get_mut(&instance) {
            Some(state) if state.visible => {
                state.visible = false;
                state.component.did_end_display(state.content.as_mut());
                true
            }
            _ => false,
        }
    }

    /// Drops the state of an instance the container discarded.
    pub fn release(&mut self, instance: InstanceId) -> Option<RenderState> {
        self.states.remove(&instance)
    }

    pub fn state(&self, instance: InstanceId) -> Option<&RenderState> {
        self.states.get(&instance)
    }

    pub fn rendered_component(&self, instance: InstanceId) -> Option<&AnyComponent> {
        self.states.get(&instance).map(|state| &state.component)
    }

    /// Rendered content of `instance`, if it is of type `T`.
    pub fn content<T: 'static>(&self, instance: InstanceId) -> Option<&T> {
        self.states
            .get(&instance)
            .and_then(|state| state.content.downcast_ref::<T>())
    }

    pub fn content_mut<T: 'static>(&mut self, instance: InstanceId) -> Option<&mut T> {
        self.states
            .get_mut(&instance)
            .and_then(|state| state.content.downcast_mut::<T>())
    }

    pub fn contains(&self, instance: InstanceId) -> bool {
        self.states.contains_key(&instance)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
