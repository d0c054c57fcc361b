//! Reconciliation engine for virtualized, sectioned list containers.
//!
//! Application code describes the desired state as a [`Snapshot`] of [`Section`]s,
//! each holding an optional header, cells and an optional footer built from
//! [`Component`]s. A [`Renderer`] diffs it against the applied state and drives a
//! [`Container`] with the minimal, order-safe batches of edits, falling back to a
//! full reload when incremental edits are unsafe or too many. Every element that
//! reaches the screen goes through the [`RenderCache`], which lets an element veto
//! a re-render of its already rendered content.
pub mod adapter;
pub mod component;
pub mod config;
pub mod container;
pub mod diff_engine;
pub mod errors;
pub mod render_state;
pub mod renderer;
pub mod section;
pub mod types;
pub mod updater;

pub use adapter::Adapter;
pub use component::{AnyComponent, Component};
pub use config::{ConfigWarning, EditAnimations, UpdaterConfig};
pub use container::Container;
pub use diff_engine::{ChangeStage, DiffEngine, DiffProvider, Edits, StagedChangeset};
pub use errors::ReconcilerError;
pub use render_state::{RenderCache, RenderOutcome, RenderState};
pub use renderer::Renderer;
pub use section::{CellNode, Section, Snapshot, ViewNode};
pub use types::{EditAnimation, EditKind, Identity, IndexPath, InstanceId, Point, Position, ReuseKey, Size};
pub use updater::{Completion, ReloadReason, UpdateOutcome, Updater};
