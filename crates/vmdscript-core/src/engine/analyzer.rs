use super::config::{AnalyzerConfig, ConfigError};
use super::container::{FrameContainer, FrameWindow};
use super::dataset::{Dataset, DatasetObserver};
use super::error::{AnalysisError, BoxError};
use super::observer::{BoundObserver, FrameObserver};
use super::progress::{Progress, ProgressReporter};
use super::step::Step;
use tracing::{debug, info, instrument};

/// Counters of a finished analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub frames_analyzed: usize,
    pub files_processed: usize,
    pub windows_loaded: usize,
}

/// Streams trajectory files through a container one window at a time.
///
/// For every file, windows of `sampling_step * window_size` source frames are
/// loaded, every resident frame is handed to the registered observers in
/// registration order, and the window is dropped again before the next one is
/// loaded. At most `window_size` frames are resident at any time.
pub struct Analyzer<'a, C: FrameContainer> {
    container: C,
    config: AnalyzerConfig,
    observers: Vec<Box<dyn FrameObserver<C> + 'a>>,
    reporter: ProgressReporter<'a>,
}

impl<'a, C: FrameContainer> Analyzer<'a, C> {
    /// # Errors
    ///
    /// [`ConfigError::InvalidArgument`] for a zero step or window size and
    /// [`ConfigError::InvalidContainer`] when the container fails validation.
    pub fn new(container: C, config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        container.validate().map_err(ConfigError::InvalidContainer)?;
        Ok(Self {
            container,
            config,
            observers: Vec::new(),
            reporter: ProgressReporter::new(),
        })
    }

    pub fn with_progress(mut self, reporter: ProgressReporter<'a>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn num_observers(&self) -> usize {
        self.observers.len()
    }

    pub fn register_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Step<'_, C>) -> Result<(), BoxError> + 'a,
    {
        self.observers.push(Box::new(callback));
    }

    /// Registers a callback that also receives `context` on every frame.
    pub fn register_callback_with<T, F>(&mut self, context: T, callback: F)
    where
        T: 'a,
        F: FnMut(&Step<'_, C>, &mut T) -> Result<(), BoxError> + 'a,
    {
        self.observers
            .push(Box::new(BoundObserver::new(context, callback)));
    }

    pub fn register_observer<O>(&mut self, observer: O)
    where
        O: FrameObserver<C> + 'a,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn register_dataset<D>(&mut self, dataset: &'a mut D)
    where
        D: Dataset<C> + ?Sized,
    {
        self.observers.push(Box::new(DatasetObserver(dataset)));
    }

    /// Runs the analysis over every input file.
    ///
    /// # Errors
    ///
    /// Host failures while loading, counting, discarding or moving between
    /// frames are returned as [`AnalysisError::Host`]; the first observer
    /// failure stops the run with [`AnalysisError::Observer`]. Frames of the
    /// failing window stay resident in either case.
    #[instrument(skip_all, name = "trajectory_analysis")]
    pub fn analyze(&mut self) -> Result<AnalysisSummary, AnalysisError> {
        let container = &self.container;
        let observers = &mut self.observers;
        let reporter = &self.reporter;
        let config = &self.config;
        let span = config.window_span();

        container.discard_resident()?;
        let mut step = Step::new(container);
        let mut summary = AnalysisSummary::default();

        for path in &config.input_files {
            reporter.report(Progress::FileStart { path: path.clone() });
            let mut offset = 0;
            loop {
                let window = FrameWindow::at(offset, config.sampling_step, config.window_size);
                debug!(
                    "Loading frames from {} (start {}, stop {}, step {})",
                    path.display(),
                    window.start,
                    window.stop,
                    window.step
                );
                container.load_window(path, config.format_hint.as_ref(), &window)?;
                summary.windows_loaded += 1;

                let loaded = container.resident_count()?;
                if loaded == 0 {
                    break;
                }
                reporter.report(Progress::WindowLoaded { frames: loaded });

                step.start_new_window();
                for _ in 0..loaded {
                    step.advance()?;
                    info!("Analyzing frame {}", step.frame());
                    for observer in observers.iter_mut() {
                        observer
                            .on_frame(&step)
                            .map_err(|source| AnalysisError::Observer {
                                frame: step.frame() as usize,
                                source,
                            })?;
                    }
                    reporter.report(Progress::FrameAnalyzed);
                }

                container.discard_resident()?;
                if loaded < config.window_size {
                    break;
                }
                offset += span;
            }
            summary.files_processed += 1;
            reporter.report(Progress::FileFinish);
        }

        summary.frames_analyzed = (step.frame() + 1) as usize;
        info!("Analyzed {} frames.", summary.frames_analyzed);
        Ok(summary)
    }
}
