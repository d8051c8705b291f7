//! Undo/redo over committed parameter snapshots.
//!
//! History is command-level: the owner calls [`ParameterHistory::commit`] once
//! a gesture settles (a slider released, a checkbox toggled), not on every
//! intermediate value.

use std::collections::VecDeque;
use std::fmt;

use log::debug;

use crate::image_pipeline::source::ImageHandle;
use crate::params::ParameterSet;

/// Undo entries kept before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 50;

/// Everything a history entry restores. The image is tracked by handle only;
/// its pixels are never copied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub params: ParameterSet,
    pub image: Option<ImageHandle>,
}

impl Snapshot {
    pub fn new(params: ParameterSet, image: Option<ImageHandle>) -> Self {
        Self { params, image }
    }
}

/// A user-visible field that differs between two snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Change {
    Resolution,
    Contrast,
    Brightness,
    ColorMode,
    Tint,
    Highlight,
    Shadow,
    Background,
    Invert,
    AspectRatio,
    Scale,
    Rotation,
    Position,
    Characters,
    Image,
}

impl Change {
    pub fn label(self) -> &'static str {
        match self {
            Change::Resolution => "Resolution",
            Change::Contrast => "Contrast",
            Change::Brightness => "Brightness",
            Change::ColorMode => "Color Mode",
            Change::Tint => "Tint",
            Change::Highlight => "Highlight",
            Change::Shadow => "Shadow",
            Change::Background => "Background",
            Change::Invert => "Invert",
            Change::AspectRatio => "Aspect Ratio",
            Change::Scale => "Scale",
            Change::Rotation => "Rotation",
            Change::Position => "Position",
            Change::Characters => "Characters",
            Change::Image => "Image",
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields that differ from `old` to `new`, in display order. Informational only.
pub fn get_changes(old: &Snapshot, new: &Snapshot) -> Vec<Change> {
    let (a, b) = (&old.params, &new.params);
    let checks = [
        (a.resolution != b.resolution, Change::Resolution),
        (a.contrast != b.contrast, Change::Contrast),
        (a.brightness != b.brightness, Change::Brightness),
        (a.color_mode != b.color_mode, Change::ColorMode),
        (a.custom_tint != b.custom_tint, Change::Tint),
        (a.highlight_color != b.highlight_color, Change::Highlight),
        (a.shadow_color != b.shadow_color, Change::Shadow),
        (a.background_color != b.background_color, Change::Background),
        (a.invert != b.invert, Change::Invert),
        (a.aspect_ratio != b.aspect_ratio, Change::AspectRatio),
        (a.scale != b.scale, Change::Scale),
        (a.rotation != b.rotation, Change::Rotation),
        (a.offset_x != b.offset_x || a.offset_y != b.offset_y, Change::Position),
        (a.glyph_ramp != b.glyph_ramp, Change::Characters),
        (old.image != new.image, Change::Image),
    ];

    checks.into_iter().filter_map(|(changed, change)| changed.then_some(change)).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Undo => "Undo",
            Direction::Redo => "Redo",
        }
    }
}

/// Result of a successful undo or redo.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryStep {
    pub direction: Direction,
    pub snapshot: Snapshot,
    pub changes: Vec<Change>,
}

impl HistoryStep {
    /// Toast text, e.g. `Undo: Resolution, Contrast`.
    pub fn summary(&self) -> String {
        if self.changes.is_empty() {
            return self.direction.label().to_string();
        }

        let labels: Vec<&str> = self.changes.iter().map(|change| change.label()).collect();
        format!("{}: {}", self.direction.label(), labels.join(", "))
    }
}

#[derive(Clone, Debug)]
pub struct ParameterHistory {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    last_committed: Snapshot,
    capacity: usize,
}

impl ParameterHistory {
    pub fn new(initial: Snapshot) -> Self {
        Self::with_capacity(initial, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(initial: Snapshot, capacity: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY) + 1),
            redo: Vec::new(),
            last_committed: initial,
            capacity: capacity.max(1),
        }
    }

    /// Checkpoint `current`. The previous checkpoint becomes undoable and any
    /// redo entries are dropped.
    pub fn commit(&mut self, current: &Snapshot) {
        let previous = std::mem::replace(&mut self.last_committed, current.clone());
        self.push_undo(previous);
        self.redo.clear();
        debug!("history commit: {} undo entries", self.undo.len());
    }

    pub fn undo(&mut self) -> Option<HistoryStep> {
        let target = self.undo.pop_back()?;
        let current = std::mem::replace(&mut self.last_committed, target.clone());
        let changes = get_changes(&current, &target);
        self.redo.push(current);
        debug!("history undo: {} undo / {} redo entries", self.undo.len(), self.redo.len());

        Some(HistoryStep { direction: Direction::Undo, snapshot: target, changes })
    }

    pub fn redo(&mut self) -> Option<HistoryStep> {
        let target = self.redo.pop()?;
        let current = std::mem::replace(&mut self.last_committed, target.clone());
        let changes = get_changes(&current, &target);
        self.push_undo(current);
        debug!("history redo: {} undo / {} redo entries", self.undo.len(), self.redo.len());

        Some(HistoryStep { direction: Direction::Redo, snapshot: target, changes })
    }

    /// Drop both stacks and start over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.undo.clear();
        self.redo.clear();
        self.last_committed = initial;
    }

    pub fn last_committed(&self) -> &Snapshot {
        &self.last_committed
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }
}
