use crate::errors::dedup_chain;
use eyre::EyreHandler;
use itertools::Itertools;
use std::{error::Error, fmt, panic::Location};

/// Renders reports for people running `certify`, not for people debugging it.
///
/// Repeated messages in the cause chain are printed once. With a `verbose` handler set, `Debug`
/// output is delegated to it instead.
#[derive(Default)]
pub struct Handler {
    verbose: Option<Box<dyn EyreHandler>>,
}

impl Handler {
    pub fn new(verbose: Option<Box<dyn EyreHandler>>) -> Self {
        Self { verbose }
    }
}

impl EyreHandler for Handler {
    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", dedup_chain(error).into_iter().format("; "))
    }

    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(verbose) = &self.verbose {
            return verbose.debug(error, f);
        }
        if f.alternate() {
            return fmt::Debug::fmt(error, f);
        }

        let chain = dedup_chain(error);
        let Some((error, causes)) = chain.split_first() else { return Ok(()) };
        write!(f, "{error}")?;
        match causes {
            [] => {}
            [cause] => write!(f, "\n\nCaused by: {cause}")?,
            causes => {
                write!(f, "\n\nCaused by:")?;
                for (n, cause) in causes.iter().enumerate() {
                    write!(f, "\n  {n}: {cause}")?;
                }
            }
        }
        Ok(())
    }

    fn track_caller(&mut self, location: &'static Location<'static>) {
        if let Some(verbose) = &mut self.verbose {
            verbose.track_caller(location);
        }
    }
}

/// Installs the global [`eyre`] and panic hooks.
///
/// Errors are reported through [`Handler`]; setting `CERTIFY_DEBUG` switches to color-eyre's
/// verbose report with span traces and locations. Panics always get the verbose report.
pub fn install() {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section("This is a bug. Please report it along with the command you ran.")
        .into_hooks();
    panic_hook.install();

    let eyre_hook = eyre_hook.into_eyre_hook();
    let verbose = std::env::var_os("CERTIFY_DEBUG").is_some();
    let installed = eyre::set_hook(Box::new(move |err| {
        Box::new(Handler::new(verbose.then(|| eyre_hook(err))))
    }));
    if let Err(err) = installed {
        debug!("eyre hook already installed: {err}");
    }
}
