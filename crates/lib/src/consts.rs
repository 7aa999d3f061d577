//! Crate-wide constants.

/// Application name used in log output and file names.
pub const APP_NAME: &str = "forge";

/// Default build directory, relative to the content root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Environment variable overriding the build directory.
pub const BUILD_DIR_ENV: &str = "FORGE_BUILD_DIR";

/// Ignore file at the content root. One folder per line, relative to the root.
pub const IGNORE_FILE: &str = ".forgeignore";

/// Incremental build state, stored inside the build directory.
pub const STATE_FILE: &str = ".forge-state.json";

/// Infix used for resources materialized from embedded payloads.
pub const GENERATED_INFIX: &str = "_generated_";

/// Return code of a successful task.
pub const RC_OK: i32 = 0;

/// Return code of a reported compile error or a skipped task.
pub const RC_COMPILE_ERROR: i32 = 1;

/// Return code of an unexpected failure inside the pipeline.
pub const RC_INTERNAL_ERROR: i32 = 2;
