pub mod probe;
pub mod result;

pub mod prelude {
    pub use super::probe::{ProbeSettings, probe, probe_candidate};
    pub use super::result::{ProbeOutcome, ProbeReport, ProbeResult};
}

use std::fmt::Write;

/// Flatten an error and its chain of sources into a single line.
pub(crate) fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "request failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_report_walks_sources() {
        let err = Outer(std::io::Error::other("connection refused"));
        assert_eq!(report(&err), "request failed: connection refused");
    }
}
