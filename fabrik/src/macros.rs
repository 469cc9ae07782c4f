/// Emits an `info` event when diagnostics are enabled in the injector config
macro_rules! progress {
    ($config:expr, $($arg:tt)+) => {
        if $config.diagnostics {
            tracing::info!($($arg)+);
        }
    };
}
