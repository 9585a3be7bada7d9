//! Config extraction errors.

use figment::providers::{Format, Toml};
use std::{error::Error, fmt};

/// The first line of every extraction error.
pub const FAILED_TO_EXTRACT_CONFIG_MSG: &str = "failed to extract certify config:";

/// A `Config` that could not be extracted from its figment.
///
/// Displays every distinct problem on its own line, naming the setting it concerns.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfigError {
    error: figment::Error,
}

impl ExtractConfigError {
    pub fn new(error: figment::Error) -> Self {
        Self { error }
    }

    /// The distinct problems, in the order figment reported them.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::with_capacity(self.error.count());
        for err in self.error.clone() {
            let problem = describe(&err);
            if !problems.contains(&problem) {
                problems.push(problem);
            }
        }
        problems
    }
}

fn describe(err: &figment::Error) -> String {
    let from_file = err.metadata.as_ref().is_some_and(|meta| meta.name.contains(Toml::NAME));
    let origin = if from_file { "certify.toml" } else { "config" };
    if err.path.is_empty() {
        format!("{origin}: {err}")
    } else {
        format!("{origin}: {err} for setting `{}`", err.path.join("."))
    }
}

impl fmt::Display for ExtractConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(FAILED_TO_EXTRACT_CONFIG_MSG)?;
        for problem in self.problems() {
            write!(f, "\n  {problem}")?;
        }
        Ok(())
    }
}

impl Error for ExtractConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}
