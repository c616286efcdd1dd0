use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::dataset::{Dataset, ModeData};
use crate::period::{PeriodLabels, SliderBounds};

/// Value of the synthetic entity option meaning "no focus".
pub const ALL_ENTITIES: &str = "all";
pub const ALL_ENTITIES_LABEL: &str = "All countries";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("mode not found in chord data: {0}")]
    UnknownMode(String),

    #[error("chord data has no modes")]
    NoModes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FocalEntity {
    #[default]
    All,
    Entity(String),
}

impl FocalEntity {
    /// `"all"` and the empty string select everything, anything else names an entity.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_ENTITIES {
            Self::All
        } else {
            Self::Entity(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_ENTITIES,
            Self::Entity(name) => name,
        }
    }

    /// Index of the focused node, `None` for "all" or names absent from `nodes`.
    pub fn index_in(&self, nodes: &[String]) -> Option<usize> {
        match self {
            Self::All => None,
            Self::Entity(name) => nodes.iter().position(|node| node == name),
        }
    }

    fn is_valid_for(&self, mode: &ModeData) -> bool {
        match self {
            Self::All => true,
            Self::Entity(name) => mode.node_index(name).is_some(),
        }
    }
}

impl Serialize for FocalEntity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for FocalEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityOption {
    pub value: FocalEntity,
    pub label: String,
}

/// The entity dropdown: "all" first, then every node sorted by name.
pub fn entity_options(mode: &ModeData) -> Vec<EntityOption> {
    let mut names: Vec<&String> = mode.nodes.iter().collect();
    names.sort();

    std::iter::once(EntityOption {
        value: FocalEntity::All,
        label: ALL_ENTITIES_LABEL.to_string(),
    })
    .chain(names.into_iter().map(|name| EntityOption {
        value: FocalEntity::Entity(name.clone()),
        label: name.clone(),
    }))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub mode: String,
    pub focal_entity: FocalEntity,
    pub period_index: usize,
}

/// Selection after switching to `new_mode`.
///
/// A focused entity carries over when the new mode knows it; otherwise
/// `remembered` (the entity last chosen in that mode) is restored when still
/// valid; otherwise focus resets to all. Callers pass `remembered` only when
/// the current "all" was not picked by the user. The period index is clamped
/// into the new mode's range.
pub fn selection_after_mode_change(
    current: &Selection,
    new_mode: &str,
    mode_data: &ModeData,
    remembered: Option<&FocalEntity>,
) -> Selection {
    let carried = matches!(current.focal_entity, FocalEntity::Entity(_))
        && current.focal_entity.is_valid_for(mode_data);

    let focal_entity = if carried {
        current.focal_entity.clone()
    } else {
        remembered
            .filter(|entity| entity.is_valid_for(mode_data))
            .cloned()
            .unwrap_or_default()
    };

    Selection {
        mode: new_mode.to_string(),
        focal_entity,
        period_index: SliderBounds::for_mode(mode_data).clamp(current.period_index),
    }
}

/// Mode, entity and period controls kept consistent with the active mode.
#[derive(Debug, Clone)]
pub struct Controls {
    selection: Selection,
    bounds: SliderBounds,
    options: Vec<EntityOption>,
    remembered: HashMap<String, FocalEntity>,
    /// Focus is "all" because a mode change dropped the entity, not by choice.
    auto_reset: bool,
}

impl Controls {
    /// Opens `preferred_mode`, or the first mode when it is absent, at its latest period.
    pub fn new(dataset: &Dataset, preferred_mode: &str) -> Result<Self, SelectionError> {
        let (mode, data) = dataset
            .modes
            .get_key_value(preferred_mode)
            .or_else(|| dataset.modes.iter().next())
            .ok_or(SelectionError::NoModes)?;

        Ok(Self {
            selection: Selection {
                mode: mode.clone(),
                focal_entity: FocalEntity::All,
                period_index: data.last_period_index(),
            },
            bounds: SliderBounds::for_mode(data),
            options: entity_options(data),
            remembered: HashMap::new(),
            auto_reset: false,
        })
    }

    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> &str {
        &self.selection.mode
    }

    pub const fn bounds(&self) -> SliderBounds {
        self.bounds
    }

    pub fn entity_options(&self) -> &[EntityOption] {
        &self.options
    }

    /// Position of the current entity in [`Self::entity_options`].
    pub fn entity_option_index(&self) -> usize {
        self.options
            .iter()
            .position(|option| option.value == self.selection.focal_entity)
            .unwrap_or(0)
    }

    pub fn period_labels(&self, dataset: &Dataset) -> PeriodLabels {
        dataset
            .mode(&self.selection.mode)
            .map(|data| PeriodLabels::for_index(data, self.selection.period_index))
            .unwrap_or_default()
    }

    /// Switches mode. Unknown modes are rejected and leave the controls untouched.
    pub fn change_mode(&mut self, dataset: &Dataset, mode: &str) -> Result<(), SelectionError> {
        let data = dataset
            .mode(mode)
            .ok_or_else(|| SelectionError::UnknownMode(mode.to_string()))?;

        self.remember_entity();
        let had_entity = matches!(self.selection.focal_entity, FocalEntity::Entity(_));
        let remembered = if had_entity || self.auto_reset {
            self.remembered.get(mode)
        } else {
            None
        };
        self.selection = selection_after_mode_change(&self.selection, mode, data, remembered);
        self.auto_reset =
            self.selection.focal_entity == FocalEntity::All && (had_entity || self.auto_reset);
        self.bounds = SliderBounds::for_mode(data);
        self.options = entity_options(data);
        Ok(())
    }

    /// The mode after (or before) the current one in name order, wrapping around.
    pub fn neighbour_mode(
        &self,
        dataset: &Dataset,
        forward: bool,
    ) -> Result<String, SelectionError> {
        let names: Vec<&str> = dataset.mode_names().collect();
        if names.is_empty() {
            return Err(SelectionError::NoModes);
        }

        let current = names
            .iter()
            .position(|name| *name == self.selection.mode)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % names.len()
        } else {
            (current + names.len() - 1) % names.len()
        };
        Ok(names[next].to_string())
    }

    pub fn cycle_mode(&mut self, dataset: &Dataset, forward: bool) -> Result<(), SelectionError> {
        let mode = self.neighbour_mode(dataset, forward)?;
        self.change_mode(dataset, &mode)
    }

    /// Focuses `entity`; names outside the current option list mean all.
    pub fn select_entity(&mut self, entity: FocalEntity) {
        self.auto_reset = false;
        self.selection.focal_entity = if self.options.iter().any(|o| o.value == entity) {
            entity
        } else {
            FocalEntity::All
        };
    }

    pub fn cycle_entity(&mut self, forward: bool) {
        let len = self.options.len();
        if len == 0 {
            return;
        }

        let current = self.entity_option_index();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.auto_reset = false;
        self.selection.focal_entity = self.options[next].value.clone();
    }

    pub fn set_period(&mut self, index: usize) {
        self.selection.period_index = self.bounds.clamp(index);
    }

    pub fn step_period(&mut self, delta: isize) {
        self.selection.period_index = self.bounds.step(self.selection.period_index, delta);
    }

    /// One playback tick: forward by one period, back to the first after the last.
    pub fn advance_playback(&mut self) {
        self.selection.period_index = self.bounds.wrap_next(self.selection.period_index);
    }

    fn remember_entity(&mut self) {
        self.remembered.insert(
            self.selection.mode.clone(),
            self.selection.focal_entity.clone(),
        );
    }
}
