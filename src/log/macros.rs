//! Shorthand for templated calls with inline operands.
//!
//! ```ignore
//! infof!(log, "served %s in %dms", path, elapsed);
//! // expands to
//! log.info("served %s in %dms", &[&path, &elapsed]);
//! ```

#[macro_export]
macro_rules! debugf {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.debug($template, &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

#[macro_export]
macro_rules! infof {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.info($template, &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

#[macro_export]
macro_rules! warnf {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.warn($template, &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.error($template, &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}
