/// Priority of factories declared without an explicit one
pub const DEFAULT_PRIORITY: i32 = 10;

/// Priority of instances registered without an explicit one
pub const PREPARED_PRIORITY: i32 = 0;

/// Config for an injector
/// ## Fields
/// - `diagnostics`:
///   If `true`, progress of each injection pass is reported with `info` events.
///
///   Errors and internal `debug` events are emitted regardless of this flag.
/// - `build_unconsumed`:
///   If `true`, dependencies that no import is waiting for are still built and then dropped,
///   so side effects of their factories happen.
///
///   By default such dependencies are skipped.
#[derive(Clone, Copy, Default)]
pub struct Config {
    pub diagnostics: bool,
    pub build_unconsumed: bool,
}
