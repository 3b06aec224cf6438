//! Host-side form pipeline.
//!
//! Steps implement [`FormProcessingStep`] and are registered with a
//! [`FormPipeline`] together with their own [`Settings`]. The pipeline runs
//! them in order, handing each step the parameters returned by the previous
//! one, and stops at the first redirect or error.

use serde_json::{Map, Value};

use crate::error::{Error, PipelineError};
use crate::logging::StepLog;
use crate::params::ParameterSet;
use crate::settings::Settings;

/// A terminal redirect requested by a step.
///
/// The host performs the redirect and ends the request.
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    /// Target page id or URL
    pub page: String,
    /// Passed through from the `correctRedirectUrl` setting
    pub correct_redirect_url: bool,
    /// Passed through from the `additionalParams` setting
    pub additional_params: Map<String, Value>,
}

impl Redirect {
    /// Builds a redirect to `page` using the redirect modifiers in `settings`.
    pub fn to(page: impl Into<String>, settings: &Settings) -> Self {
        Self {
            page: page.into(),
            correct_redirect_url: settings.correct_redirect_url,
            additional_params: settings.additional_params.clone(),
        }
    }
}

/// What a step hands back to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Continue with the (possibly updated) parameters.
    Continue(ParameterSet),
    /// Stop processing and redirect.
    Redirect(Redirect),
}

impl StepOutcome {
    /// Returns the parameters if processing continues.
    pub fn into_parameters(self) -> Option<ParameterSet> {
        match self {
            StepOutcome::Continue(params) => Some(params),
            StepOutcome::Redirect(_) => None,
        }
    }

    /// Returns the redirect if processing stopped.
    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            StepOutcome::Continue(_) => None,
            StepOutcome::Redirect(redirect) => Some(redirect),
        }
    }
}

/// A unit of form processing the host can run.
pub trait FormProcessingStep {
    /// Stable name used in log events and pipeline errors.
    fn name(&self) -> &'static str;

    /// Processes the submitted parameters.
    fn process(&self, params: ParameterSet, settings: &Settings) -> Result<StepOutcome, Error>;
}

/// Ordered list of registered steps.
///
/// # Examples
///
/// ```
/// use authcode_step::{FormPipeline, FormProcessingStep, ParameterSet, Settings, StepOutcome};
/// use serde_json::json;
///
/// struct Stamp;
///
/// impl FormProcessingStep for Stamp {
///     fn name(&self) -> &'static str {
///         "stamp"
///     }
///
///     fn process(
///         &self,
///         mut params: ParameterSet,
///         _settings: &Settings,
///     ) -> Result<StepOutcome, authcode_step::Error> {
///         params.insert("stamped", json!(true));
///         Ok(StepOutcome::Continue(params))
///     }
/// }
///
/// let pipeline = FormPipeline::new().register(Stamp, Settings::default());
/// let outcome = pipeline.run(ParameterSet::new()).unwrap();
///
/// assert_eq!(
///     outcome.into_parameters().unwrap().get("stamped"),
///     Some(&json!(true))
/// );
/// ```
#[derive(Default)]
pub struct FormPipeline<'a> {
    steps: Vec<(Box<dyn FormProcessingStep + 'a>, Settings)>,
}

impl<'a> FormPipeline<'a> {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends `step`, run with `settings`.
    pub fn register(mut self, step: impl FormProcessingStep + 'a, settings: Settings) -> Self {
        self.steps.push((Box::new(step), settings));
        self
    }

    /// Appends `step`, validating its raw host options first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Settings`] if `options` cannot be interpreted.
    pub fn configure(self, step: impl FormProcessingStep + 'a, options: Value) -> Result<Self, Error> {
        let settings = Settings::from_value(options)?;
        Ok(self.register(step, settings))
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if no step is registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first step error, tagged with the failing step's name.
    pub fn run(&self, mut params: ParameterSet) -> Result<StepOutcome, PipelineError> {
        for (step, settings) in &self.steps {
            let log = StepLog::new(step.name());
            match step.process(params, settings) {
                Ok(StepOutcome::Continue(next)) => params = next,
                Ok(StepOutcome::Redirect(redirect)) => {
                    log.debug(format_args!("redirecting to {}", redirect.page));
                    return Ok(StepOutcome::Redirect(redirect));
                }
                Err(source) => {
                    log.debug(format_args!("step failed: {}", source));
                    return Err(PipelineError {
                        step: step.name(),
                        source,
                    });
                }
            }
        }
        Ok(StepOutcome::Continue(params))
    }
}
