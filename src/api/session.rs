use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::core::bounds::{AxisRange, ViewBounds};
use crate::core::history::same_values;
use crate::core::reconcile::{Reconciled, reconcile};
use crate::core::series::{ParameterId, ParameterSeries, RadiusAxis, SeriesData};
use crate::core::units::RADIUS_KEY;
use crate::def_file::{self, DefDocument, DefMetadata, ParsedDef, serialize};
use crate::error::{DefError, DefResult};
use crate::fit::{FitOptions, FitRequest, PolynomialFitter};
use crate::interaction::{
    EditCommand, EditController, EditOutcome, EditState, NoPrompt, ValuePrompt,
};

use super::config::EditorConfig;
use super::fit_coordinator::FitCoordinator;
use super::session_snapshot::{SeriesSnapshot, SessionSnapshot, finite_or_none};
use super::snapshot_watch::SnapshotWatcher;

const PROGRESS_FILE_NAME: &str = "progress";

/// One working-set entry: the series and the pointer state of its plot.
#[derive(Debug, Clone)]
struct Plot {
    series: ParameterSeries,
    controller: EditController,
}

/// Files involved in a prepared modeling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub def_path: PathBuf,
    pub inset_path: PathBuf,
    /// Where the modeling tool reports progress.
    pub progress_path: PathBuf,
}

/// Owns a loaded document and the series being edited.
///
/// Every mutating call either completes or leaves the session as it was.
#[derive(Debug)]
pub struct Session {
    config: EditorConfig,
    source: Option<PathBuf>,
    document: DefDocument,
    ring_count: usize,
    metadata: DefMetadata,
    parsed: IndexMap<String, SeriesData>,
    radius: RadiusAxis,
    working: IndexMap<ParameterId, Plot>,
    selection: Option<ParameterId>,
    ambiguities: Vec<DefError>,
    fits: FitCoordinator,
    snapshot_watcher: Option<SnapshotWatcher>,
}

impl Session {
    /// Creates an empty session.
    pub fn new(config: EditorConfig) -> DefResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source: None,
            document: DefDocument::default(),
            ring_count: 0,
            metadata: DefMetadata::default(),
            parsed: IndexMap::new(),
            radius: Arc::from(Vec::new()),
            working: IndexMap::new(),
            selection: None,
            ambiguities: Vec::new(),
            fits: FitCoordinator::default(),
            snapshot_watcher: None,
        })
    }

    #[must_use]
    pub fn with_fitter(mut self, fitter: Arc<dyn PolynomialFitter>) -> Self {
        self.fits.set_fitter(fitter);
        self
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn document(&self) -> &DefDocument {
        &self.document
    }

    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.ring_count
    }

    #[must_use]
    pub fn metadata(&self) -> &DefMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn radius(&self) -> &[f64] {
        &self.radius
    }

    /// Series that were longer than the declared ring count at load.
    #[must_use]
    pub fn ambiguities(&self) -> &[DefError] {
        &self.ambiguities
    }

    /// Names of every parsed series, in document order.
    pub fn available_parameters(&self) -> impl Iterator<Item = &str> {
        self.parsed.keys().map(String::as_str)
    }

    /// Working-set series in display order.
    pub fn working_set(&self) -> impl Iterator<Item = &ParameterSeries> {
        self.working.values().map(|plot| &plot.series)
    }

    #[must_use]
    pub fn series(&self, id: &ParameterId) -> Option<&ParameterSeries> {
        self.working.get(id).map(|plot| &plot.series)
    }

    #[must_use]
    pub fn edit_state(&self, id: &ParameterId) -> Option<EditState> {
        self.working.get(id).map(|plot| plot.controller.state())
    }

    #[must_use]
    pub fn selection(&self) -> Option<&ParameterId> {
        self.selection.as_ref()
    }

    pub fn select(&mut self, id: &ParameterId) -> DefResult<()> {
        if !self.working.contains_key(id) {
            return Err(DefError::UnknownParameter(id.to_string()));
        }
        self.selection = Some(id.clone());
        Ok(())
    }

    pub fn load_path(&mut self, path: impl AsRef<Path>) -> DefResult<()> {
        let path = path.as_ref();
        let parsed = def_file::load_path(path)?;
        self.install(parsed, Some(path.to_path_buf()))?;
        info!(path = %path.display(), series = self.working.len(), "loaded def file");
        Ok(())
    }

    /// Loads from text; the session has no source path afterwards.
    pub fn load_str(&mut self, text: &str) -> DefResult<()> {
        let parsed = def_file::parse(text)?;
        self.install(parsed, None)
    }

    fn install(&mut self, parsed: ParsedDef, source: Option<PathBuf>) -> DefResult<()> {
        let ParsedDef {
            document,
            series,
            ring_count,
            metadata,
        } = parsed;
        let Reconciled {
            series,
            ambiguities,
        } = reconcile(series, ring_count, self.config.ring_spacing);
        let radius = radius_axis(&series)?;

        let mut working = IndexMap::new();
        for name in &self.config.default_working_set {
            let id = ParameterId::new(name);
            if let Some(data) = series.get(id.as_str()) {
                let plot = self.build_plot(id.as_str(), data.clone(), &radius, "");
                working.insert(id, plot);
            }
        }

        self.fits.cancel_all();
        self.snapshot_watcher = None;
        self.selection = None;
        self.source = source;
        self.document = document;
        self.ring_count = ring_count;
        self.metadata = metadata;
        self.parsed = series;
        self.radius = radius;
        self.working = working;
        self.ambiguities = ambiguities;
        debug!(
            rings = self.ring_count,
            parsed = self.parsed.len(),
            working = self.working.len(),
            "session installed"
        );
        Ok(())
    }

    fn build_plot(
        &self,
        name: &str,
        data: SeriesData,
        radius: &RadiusAxis,
        unit: &str,
    ) -> Plot {
        let bounds = ViewBounds::framing(radius, &data.values, self.config.view_margin);
        let series = ParameterSeries::from_data(name, data, Arc::clone(radius))
            .with_unit(unit)
            .with_view_bounds(bounds);
        Plot {
            series,
            controller: EditController::new(self.config.edit),
        }
    }

    /// Routes a command to the plot of `target`.
    ///
    /// A pointer-down selects `target` whether or not it grabs a ring.
    pub fn dispatch(
        &mut self,
        target: &ParameterId,
        command: EditCommand,
        prompt: &mut dyn ValuePrompt,
    ) -> DefResult<EditOutcome> {
        let plot = self
            .working
            .get_mut(target)
            .ok_or_else(|| DefError::UnknownParameter(target.to_string()))?;
        if matches!(command, EditCommand::PointerDown { .. }) {
            self.selection = Some(target.clone());
        }
        let outcome = plot.controller.handle(&mut plot.series, command, prompt)?;

        let mutated = !matches!(
            outcome,
            EditOutcome::Ignored | EditOutcome::DragStarted { .. } | EditOutcome::PromptDismissed
        );
        if mutated && target.as_str() == RADIUS_KEY {
            self.sync_radius();
        }
        Ok(outcome)
    }

    pub fn undo_selected(&mut self) -> DefResult<EditOutcome> {
        let target = self.selected()?;
        self.dispatch(&target, EditCommand::Undo, &mut NoPrompt)
    }

    pub fn redo_selected(&mut self) -> DefResult<EditOutcome> {
        let target = self.selected()?;
        self.dispatch(&target, EditCommand::Redo, &mut NoPrompt)
    }

    fn selected(&self) -> DefResult<ParameterId> {
        self.selection
            .clone()
            .ok_or_else(|| DefError::InvalidData("no parameter is selected".to_owned()))
    }

    /// Shares the `RADI` values with every series as their new radius axis.
    fn sync_radius(&mut self) {
        let Some(plot) = self.working.get(RADIUS_KEY) else {
            return;
        };
        let radius: RadiusAxis = Arc::from(plot.series.values());
        for plot in self.working.values_mut() {
            plot.series.set_radius(Arc::clone(&radius));
        }
        self.radius = radius;
        debug!(rings = self.radius.len(), "radius axis rebuilt");
    }

    /// Adds a parsed parameter to the working set.
    ///
    /// An empty `unit` falls back to the well-known unit table. With `after`
    /// the series is placed right behind that parameter, else at the end.
    pub fn add_parameter(
        &mut self,
        name: &str,
        unit: &str,
        after: Option<&ParameterId>,
    ) -> DefResult<&ParameterSeries> {
        let id = ParameterId::new(name);
        if self.working.contains_key(&id) {
            return Err(DefError::DuplicateParameter(id.to_string()));
        }
        let data = self
            .parsed
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| DefError::UnknownParameter(id.to_string()))?;
        let index = match after {
            Some(anchor) => {
                self.working
                    .get_index_of(anchor)
                    .ok_or_else(|| DefError::UnknownParameter(anchor.to_string()))?
                    + 1
            }
            None => self.working.len(),
        };

        let plot = self.build_plot(id.as_str(), data, &self.radius, unit);
        self.working.shift_insert(index, id.clone(), plot);
        debug!(parameter = %id, index, "parameter added");
        self.working
            .get(&id)
            .map(|plot| &plot.series)
            .ok_or(DefError::UnknownParameter(id.to_string()))
    }

    /// Swaps `old` for `new` at the same working-set position.
    pub fn replace_parameter(
        &mut self,
        old: &ParameterId,
        new: &str,
        unit: &str,
    ) -> DefResult<()> {
        let index = self
            .working
            .get_index_of(old)
            .ok_or_else(|| DefError::UnknownParameter(old.to_string()))?;
        let id = ParameterId::new(new);
        if self.working.contains_key(&id) {
            return Err(DefError::DuplicateParameter(id.to_string()));
        }
        let data = self
            .parsed
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| DefError::UnknownParameter(id.to_string()))?;

        let plot = self.build_plot(id.as_str(), data, &self.radius, unit);
        self.fits.cancel(old);
        self.working.shift_remove(old);
        self.working.shift_insert(index, id.clone(), plot);
        if self.selection.as_ref() == Some(old) {
            self.selection = Some(id.clone());
        }
        debug!(old = %old, new = %id, "parameter replaced");
        Ok(())
    }

    /// Drops a series and its history from the working set.
    pub fn remove_parameter(&mut self, id: &ParameterId) -> DefResult<ParameterSeries> {
        let plot = self
            .working
            .shift_remove(id)
            .ok_or_else(|| DefError::UnknownParameter(id.to_string()))?;
        self.fits.cancel(id);
        if self.selection.as_ref() == Some(id) {
            self.selection = None;
        }
        debug!(parameter = %id, "parameter removed");
        Ok(plot.series)
    }

    /// Sets the radius axis range of every plot.
    pub fn set_x_bounds(&mut self, range: AxisRange) -> DefResult<()> {
        let range = AxisRange::new(range.min, range.max)?;
        for plot in self.working.values_mut() {
            plot.series.set_x_bounds(range);
        }
        Ok(())
    }

    pub fn set_y_bounds(&mut self, id: &ParameterId, range: AxisRange) -> DefResult<()> {
        let range = AxisRange::new(range.min, range.max)?;
        self.working
            .get_mut(id)
            .ok_or_else(|| DefError::UnknownParameter(id.to_string()))?
            .series
            .set_y_bounds(range);
        Ok(())
    }

    /// Document text with the working set merged in. Storage is untouched.
    #[must_use]
    pub fn render(&self) -> String {
        serialize(&self.document, self.working_set())
    }

    /// Writes back to the file the session was loaded from.
    pub fn save(&mut self) -> DefResult<PathBuf> {
        let path = self.source.clone().ok_or_else(|| {
            DefError::InvalidData("session has no source file; use save_as".to_owned())
        })?;
        self.write_merged(&path)?;
        Ok(path)
    }

    /// Writes to `path`, which becomes the session's source.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> DefResult<()> {
        let path = path.as_ref();
        self.write_merged(path)?;
        self.source = Some(path.to_path_buf());
        Ok(())
    }

    fn write_merged(&mut self, path: &Path) -> DefResult<()> {
        let mut document = self.document.clone();
        document.merge_series(self.working.values().map(|plot| &plot.series));
        def_file::write_path(path, &document.render())?;
        self.document = document;
        Ok(())
    }

    /// Writes the merged text for an external editor and watches it.
    pub fn write_editor_snapshot(&mut self, path: impl AsRef<Path>) -> DefResult<()> {
        let path = path.as_ref();
        def_file::write_path(path, &self.render())?;
        self.snapshot_watcher = Some(SnapshotWatcher::arm(
            path,
            self.config.snapshot_poll_interval(),
        )?);
        debug!(path = %path.display(), "editor snapshot armed");
        Ok(())
    }

    /// Pulls edits made in the external editor.
    ///
    /// Working-set series whose values changed are committed to history and
    /// reframed; their ids are returned. Series whose ring count changed in
    /// the editor are skipped.
    pub fn poll_editor_snapshot(&mut self, now: Instant) -> DefResult<Vec<ParameterId>> {
        let Some(watcher) = self.snapshot_watcher.as_mut() else {
            return Ok(Vec::new());
        };
        if !watcher.poll(now)? {
            return Ok(Vec::new());
        }
        let parsed = def_file::load_path(watcher.path())?;
        let Reconciled { series, .. } =
            reconcile(parsed.series, parsed.ring_count, self.config.ring_spacing);

        let mut changed = Vec::new();
        for (id, plot) in &mut self.working {
            let Some(data) = series.get(id.as_str()) else {
                continue;
            };
            if data.values.len() != plot.series.ring_count() {
                warn!(
                    parameter = %id,
                    rings = data.values.len(),
                    expected = plot.series.ring_count(),
                    "editor changed the ring count; series not reloaded"
                );
                continue;
            }
            plot.controller.finish_drag(&mut plot.series);
            if same_values(plot.series.values(), &data.values) {
                continue;
            }
            plot.series.commit(data.values.clone())?;
            let bounds = ViewBounds::framing(
                plot.series.radius(),
                plot.series.values(),
                self.config.view_margin,
            );
            plot.series.set_y_bounds(bounds.y);
            changed.push(id.clone());
        }

        if changed.iter().any(|id| id.as_str() == RADIUS_KEY) {
            self.sync_radius();
        }
        for (name, data) in series {
            if let Some(entry) = self.parsed.get_mut(&name) {
                *entry = data;
            }
        }
        debug!(changed = changed.len(), "editor snapshot reloaded");
        Ok(changed)
    }

    /// Saves to `path` rewritten for an unattended modeling run.
    ///
    /// Fails before writing anything when the `INSET` data cube is missing
    /// from the directory of `path`.
    pub fn prepare_run(&mut self, path: impl AsRef<Path>) -> DefResult<RunPlan> {
        let path = path.as_ref();
        let directory = path.parent().unwrap_or_else(|| Path::new(""));
        let inset = self.metadata.inset.as_deref().ok_or_else(|| {
            DefError::InvalidData("document names no INSET data cube".to_owned())
        })?;
        let inset_path = directory.join(inset);
        if !inset_path.is_file() {
            return Err(DefError::io(
                inset_path,
                io::Error::new(io::ErrorKind::NotFound, "data cube not found"),
            ));
        }

        let mut document = self.document.clone();
        document.merge_series(self.working.values().map(|plot| &plot.series));
        document.prepare_for_run();
        def_file::write_path(path, &document.render())?;
        self.document = document;
        self.source = Some(path.to_path_buf());

        info!(path = %path.display(), "prepared def file for modeling run");
        Ok(RunPlan {
            def_path: path.to_path_buf(),
            inset_path,
            progress_path: directory.join(PROGRESS_FILE_NAME),
        })
    }

    /// Starts a background fit of `id`; `options` default to the config.
    pub fn start_fit(&mut self, id: &ParameterId, options: Option<FitOptions>) -> DefResult<()> {
        let series = self
            .series(id)
            .ok_or_else(|| DefError::UnknownParameter(id.to_string()))?;
        let request = FitRequest::from_series(series, options.unwrap_or(self.config.fit))?;
        self.fits.start(request)
    }

    /// Commits finished fits to their series.
    ///
    /// Returns the degree used per finished job; failures leave the series
    /// untouched.
    pub fn poll_fits(&mut self) -> Vec<(ParameterId, DefResult<u8>)> {
        let mut reports = Vec::new();
        let mut radius_changed = false;
        for (id, result) in self.fits.poll() {
            let report = result.and_then(|response| {
                let plot = self
                    .working
                    .get_mut(&id)
                    .ok_or_else(|| DefError::FitFailure(format!("series `{id}` was removed")))?;
                plot.controller.finish_drag(&mut plot.series);
                plot.series
                    .commit(response.values)
                    .map_err(|e| DefError::FitFailure(e.to_string()))?;
                let current = plot.series.view_bounds().y;
                if let Some(y) = self.config.edit.rescale.rescale(current, plot.series.values()) {
                    plot.series.set_y_bounds(y);
                }
                radius_changed |= id.as_str() == RADIUS_KEY;
                debug!(parameter = %id, degree = response.degree, "fit committed");
                Ok(response.degree)
            });
            reports.push((id, report));
        }
        if radius_changed {
            self.sync_radius();
        }
        reports
    }

    pub fn cancel_fit(&mut self, id: &ParameterId) -> bool {
        self.fits.cancel(id)
    }

    #[must_use]
    pub fn fit_in_flight(&self, id: &ParameterId) -> bool {
        self.fits.in_flight(id)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            source: self.source.clone(),
            ring_count: self.ring_count,
            radius: finite_or_none(&self.radius),
            metadata: self.metadata.clone(),
            selection: self.selection.clone(),
            available_parameters: self.parsed.keys().cloned().collect(),
            series: self
                .working
                .iter()
                .map(|(id, plot)| {
                    SeriesSnapshot::capture(
                        &plot.series,
                        plot.controller.state(),
                        self.fits.in_flight(id),
                    )
                })
                .collect(),
        }
    }
}

fn radius_axis(series: &IndexMap<String, SeriesData>) -> DefResult<RadiusAxis> {
    series
        .get(RADIUS_KEY)
        .map(|data| Arc::from(data.values.as_slice()))
        .ok_or(DefError::MissingRadiusAxis)
}
