//! Updater policy flags, loadable from JSON
use crate::errors::ReconcilerError;
use crate::types::EditAnimation;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Animation used for each kind of container edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditAnimations {
    pub delete_sections: EditAnimation,
    pub insert_sections: EditAnimation,
    pub reload_sections: EditAnimation,
    pub delete_items: EditAnimation,
    pub insert_items: EditAnimation,
    pub reload_items: EditAnimation,
}

impl EditAnimations {
    /// Every edit kind without animation.
    pub const NONE: EditAnimations = EditAnimations {
        delete_sections: EditAnimation::None,
        insert_sections: EditAnimation::None,
        reload_sections: EditAnimation::None,
        delete_items: EditAnimation::None,
        insert_items: EditAnimation::None,
        reload_items: EditAnimation::None,
    };

    pub fn uniform(animation: EditAnimation) -> Self {
        EditAnimations {
            delete_sections: animation,
            insert_sections: animation,
            reload_sections: animation,
            delete_items: animation,
            insert_items: animation,
            reload_items: animation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Apply staged edits with animation.
    pub animation_enabled: bool,
    /// Keep animating while the user scrolls; otherwise batches apply instantly.
    pub animation_enabled_while_scrolling: bool,
    /// Re-submit every visible element to the render cache after each update.
    pub always_render_visible_components: bool,
    /// Do not issue item reloads; rely on the visible refresh pass instead.
    pub skip_reload_components: bool,
    /// Above this many edits the container is reloaded instead of animated.
    pub animatable_change_count: usize,
    /// Restore the pre-update scroll offset, clamped to the new content.
    pub keeps_content_offset: bool,
    pub animations: EditAnimations,
}

pub const DEFAULT_ANIMATABLE_CHANGE_COUNT: usize = 300;

impl Default for UpdaterConfig {
    fn default() -> Self {
        UpdaterConfig {
            animation_enabled: true,
            animation_enabled_while_scrolling: true,
            always_render_visible_components: true,
            skip_reload_components: false,
            animatable_change_count: DEFAULT_ANIMATABLE_CHANGE_COUNT,
            keeps_content_offset: false,
            animations: EditAnimations::default(),
        }
    }
}

/// Flag combinations that are accepted but worth a second look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Item reloads are skipped and no refresh pass runs afterwards, so content
    /// changes reach only cells that get re-dequeued.
    SkippedReloadsWithoutRefresh,
    /// A zero ceiling turns every non-empty diff into a full reload.
    AnimationCeilingIsZero,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::SkippedReloadsWithoutRefresh => f.write_str(
                "skip_reload_components without always_render_visible_components can drop content updates",
            ),
            ConfigWarning::AnimationCeilingIsZero => {
                f.write_str("animatable_change_count is 0, every change reloads the container")
            }
        }
    }
}

impl UpdaterConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ReconcilerError> {
        let config: UpdaterConfig = serde_json::from_str(json)?;
        config.validate();
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ReconcilerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reports questionable flag combinations and logs each of them.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.skip_reload_components && !self.always_render_visible_components {
            warnings.push(ConfigWarning::SkippedReloadsWithoutRefresh);
        }
        if self.animatable_change_count == 0 {
            warnings.push(ConfigWarning::AnimationCeilingIsZero);
        }
        for warning in &warnings {
            warn!("UpdaterConfig: {}", warning);
        }
        warnings
    }
}
