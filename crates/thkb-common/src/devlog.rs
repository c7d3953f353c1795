// Each level is only compiled in when its feature is enabled. Disabled
// levels still type-check their arguments so call sites don't rot.

#[macro_export]
#[cfg(feature = "__dev_log_enable_level_error")]
macro_rules! dev_error {
    ($($arg:tt)+) => {
        $crate::__log::error!($($arg)+)
    };
}

#[macro_export]
#[cfg(not(feature = "__dev_log_enable_level_error"))]
macro_rules! dev_error {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

#[macro_export]
#[cfg(feature = "__dev_log_enable_level_warn")]
macro_rules! dev_warn {
    ($($arg:tt)+) => {
        $crate::__log::warn!($($arg)+)
    };
}

#[macro_export]
#[cfg(not(feature = "__dev_log_enable_level_warn"))]
macro_rules! dev_warn {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

#[macro_export]
#[cfg(feature = "__dev_log_enable_level_info")]
macro_rules! dev_info {
    ($($arg:tt)+) => {
        $crate::__log::info!($($arg)+)
    };
}

#[macro_export]
#[cfg(not(feature = "__dev_log_enable_level_info"))]
macro_rules! dev_info {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

#[macro_export]
#[cfg(feature = "__dev_log_enable_level_debug")]
macro_rules! dev_debug {
    ($($arg:tt)+) => {
        $crate::__log::debug!($($arg)+)
    };
}

#[macro_export]
#[cfg(not(feature = "__dev_log_enable_level_debug"))]
macro_rules! dev_debug {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

#[macro_export]
#[cfg(feature = "__dev_log_enable_level_trace")]
macro_rules! dev_trace {
    ($($arg:tt)+) => {
        $crate::__log::trace!($($arg)+)
    };
}

#[macro_export]
#[cfg(not(feature = "__dev_log_enable_level_trace"))]
macro_rules! dev_trace {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

/// Most verbose level compiled in through the `dev-log-level-*` features.
pub const DEV_LOG_LEVEL: log::LevelFilter = if cfg!(feature = "__dev_log_enable_level_trace") {
    log::LevelFilter::Trace
} else if cfg!(feature = "__dev_log_enable_level_debug") {
    log::LevelFilter::Debug
} else if cfg!(feature = "__dev_log_enable_level_info") {
    log::LevelFilter::Info
} else if cfg!(feature = "__dev_log_enable_level_warn") {
    log::LevelFilter::Warn
} else if cfg!(feature = "__dev_log_enable_level_error") {
    log::LevelFilter::Error
} else {
    log::LevelFilter::Off
};

#[cfg(test)]
mod tests {
    use super::DEV_LOG_LEVEL;
    use log::LevelFilter;

    #[test]
    #[cfg(not(any(
        feature = "dev-log-level-error",
        feature = "dev-log-level-warn",
        feature = "dev-log-level-info",
        feature = "dev-log-level-debug",
        feature = "dev-log-level-trace"
    )))]
    fn test_nothing_logged_unless_requested() {
        assert_eq!(DEV_LOG_LEVEL, LevelFilter::Off);
        dev_error!("Compiled out: {}", 1);
    }

    #[test]
    fn test_levels_include_less_verbose_ones() {
        if DEV_LOG_LEVEL >= LevelFilter::Trace {
            assert!(cfg!(feature = "__dev_log_enable_level_debug"));
        }
        if DEV_LOG_LEVEL >= LevelFilter::Info {
            assert!(cfg!(feature = "__dev_log_enable_level_warn"));
        }
        if DEV_LOG_LEVEL >= LevelFilter::Error {
            assert!(cfg!(feature = "__dev_log_enable_level_error"));
        }
    }
}
