// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logging facade.
//!
//! `log_trace!`, `log_debug!` and `log_warn!` forward to the `tracing` macros when
//! the `tracing` feature is enabled and expand to `()` otherwise, so call sites
//! never need `cfg` and also work in expression position. The `log_` prefix keeps
//! them clear of the built-in `warn` attribute.

#[cfg(feature = "tracing")]
mod imp {
    macro_rules! log_trace {
        ($($arg:tt)*) => {
            ::tracing::trace!($($arg)*)
        };
    }

    macro_rules! log_debug {
        ($($arg:tt)*) => {
            ::tracing::debug!($($arg)*)
        };
    }

    macro_rules! log_warn {
        ($($arg:tt)*) => {
            ::tracing::warn!($($arg)*)
        };
    }

    pub(crate) use {log_debug, log_trace, log_warn};
}

#[cfg(not(feature = "tracing"))]
mod imp {
    macro_rules! log_trace {
        ($($arg:tt)*) => {
            ()
        };
    }

    macro_rules! log_debug {
        ($($arg:tt)*) => {
            ()
        };
    }

    macro_rules! log_warn {
        ($($arg:tt)*) => {
            ()
        };
    }

    pub(crate) use {log_debug, log_trace, log_warn};
}

pub(crate) use imp::{log_debug, log_trace, log_warn};

#[cfg(test)]
mod tests {
    use super::{log_debug, log_trace, log_warn};

    #[test]
    fn macros_work_in_statement_and_expression_position() {
        let value = 3;
        log_trace!(value, "trace");
        log_debug!(?value, "debug");
        match value {
            3 => log_warn!(value, "warn"),
            _ => unreachable!("value is fixed"),
        }
    }
}
