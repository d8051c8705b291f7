//! Editing session: the one owner of live parameters, history and the last
//! rendered grid.

use std::fmt;

use log::{debug, warn};

use crate::ascii::grid::RenderGrid;
use crate::history::{Change, HistoryStep, ParameterHistory, Snapshot};
use crate::image_pipeline::source::ImageHandle;
use crate::params::{ParamChange, ParameterSet};
use crate::RenderPipeline;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    /// No image loaded; nothing to do.
    NoImage,
    /// Render failed; the previous grid is still current.
    Failed,
}

/// Message for a toast or status line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub changes: Vec<Change>,
}

impl Notice {
    fn plain(text: &str) -> Self {
        Self { text: text.to_string(), changes: Vec::new() }
    }
}

impl From<&HistoryStep> for Notice {
    fn from(step: &HistoryStep) -> Self {
        Self { text: step.summary(), changes: step.changes.clone() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug)]
pub struct Session {
    params: ParameterSet,
    image: Option<ImageHandle>,
    history: ParameterHistory,
    pipeline: RenderPipeline,
    grid: Option<RenderGrid>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RenderPipeline::default())
    }
}

impl Session {
    pub fn new(pipeline: RenderPipeline) -> Self {
        Self::with_params(ParameterSet::default(), pipeline)
    }

    /// Start from `params` as the first committed state.
    pub fn with_params(params: ParameterSet, pipeline: RenderPipeline) -> Self {
        let history = ParameterHistory::new(Snapshot::new(params.clone(), None));
        Self { params, image: None, history, pipeline, grid: None }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    /// Last successfully rendered grid.
    pub fn grid(&self) -> Option<&RenderGrid> {
        self.grid.as_ref()
    }

    pub fn history(&self) -> &ParameterHistory {
        &self.history
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.params.clone(), self.image.clone())
    }

    pub fn set_image(&mut self, image: ImageHandle) -> RenderOutcome {
        debug!("session image set to {}x{}", image.width(), image.height());
        self.image = Some(image);
        self.render()
    }

    pub fn clear_image(&mut self) {
        self.image = None;
        self.grid = None;
    }

    /// Preview an edit without recording it in history.
    pub fn apply_live_change(&mut self, change: ParamChange) -> RenderOutcome {
        self.params.apply(change);
        self.render()
    }

    /// Swap the whole live parameter set, e.g. after loading a preset.
    pub fn replace_params(&mut self, params: ParameterSet) -> RenderOutcome {
        self.params = params;
        self.render()
    }

    /// Record the live state as a checkpoint once a gesture completes.
    pub fn commit_change(&mut self) {
        let snapshot = self.snapshot();
        self.history.commit(&snapshot);
    }

    pub fn undo(&mut self) -> Option<Notice> {
        let step = self.history.undo()?;
        Some(self.restore(step))
    }

    pub fn redo(&mut self) -> Option<Notice> {
        let step = self.history.redo()?;
        Some(self.restore(step))
    }

    /// Back to defaults with no image and empty history.
    pub fn reset(&mut self) -> Notice {
        self.params = ParameterSet::default();
        self.image = None;
        self.grid = None;
        self.history.reset(self.snapshot());
        debug!("session reset");
        Notice::plain("Reset")
    }

    pub fn render(&mut self) -> RenderOutcome {
        let Some(image) = self.image.as_ref() else {
            return RenderOutcome::NoImage;
        };

        match self.pipeline.render(image, &self.params) {
            Ok(grid) => {
                self.grid = Some(grid);
                RenderOutcome::Rendered
            },
            Err(err) => {
                warn!("render failed, keeping previous frame: {err}");
                RenderOutcome::Failed
            },
        }
    }

    fn restore(&mut self, step: HistoryStep) -> Notice {
        let notice = Notice::from(&step);
        self.params = step.snapshot.params;
        self.image = step.snapshot.image;
        if self.image.is_none() {
            self.grid = None;
        }
        self.render();
        notice
    }
}
