//! Shared model for the cross-border flows dashboards: the dataset document,
//! the selection controls, the directed chord layout and the chart scene that
//! both the terminal and the web front ends draw.

pub mod dataset;
pub mod geometry;
pub mod layout;
pub mod palette;
pub mod period;
pub mod playback;
pub mod scene;
pub mod selection;
pub mod tooltip;

pub use dataset::{Dataset, DatasetError, DatasetMeta, LoadError, ModeData, DEFAULT_MODE};
pub use period::{period_label, PeriodLabels, SliderBounds};
pub use playback::{PlaybackClock, PlaybackMode, DEFAULT_PLAY_INTERVAL};
pub use scene::{ChartScene, RenderError};
pub use selection::{entity_options, Controls, FocalEntity, Selection, SelectionError};
