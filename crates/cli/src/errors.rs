//! Error chain helpers.

mod sealed {
    use eyre::Chain;
    use std::error::Error;

    /// Anything whose cause chain can be walked.
    pub trait Causes {
        fn causes(&self) -> Chain<'_>;
    }

    impl Causes for dyn Error + 'static {
        fn causes(&self) -> Chain<'_> {
            Chain::new(self)
        }
    }

    impl Causes for eyre::Report {
        fn causes(&self) -> Chain<'_> {
            self.chain()
        }
    }
}

/// Renders an error and its causes on one line.
pub fn display_chain<E: sealed::Causes + ?Sized>(error: &E) -> String {
    dedup_chain(error).join("; ")
}

/// The messages of an error and its causes, minus causes already quoted by their parent.
///
/// Wrappers like `request failed: {0}` repeat their source; `a: b; b` renders as `a: b`.
pub fn dedup_chain<E: sealed::Causes + ?Sized>(error: &E) -> Vec<String> {
    let mut messages = all_sources(error);
    messages.dedup_by(|cause, parent| parent.contains(cause.as_str()));
    messages
}

fn all_sources<E: sealed::Causes + ?Sized>(error: &E) -> Vec<String> {
    error.causes().map(|cause| cause.to_string().trim().to_string()).collect()
}
