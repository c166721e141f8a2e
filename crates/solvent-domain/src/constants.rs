//! Domain constants

// ============================================================================
// Dependency descriptor defaults
// ============================================================================

/// Dependencies share one result per top-level call unless told otherwise
pub const DEFAULT_USE_CACHE: bool = true;

/// Dependency results are validated against the consumer's annotation
pub const DEFAULT_CAST: bool = true;

/// Dependency return values are not cast against their own return hint
pub const DEFAULT_DEPENDANT_CAST_RESULT: bool = false;

// ============================================================================
// Injection defaults
// ============================================================================

/// Injected roots cast their result against the return hint
pub const DEFAULT_INJECT_CAST_RESULT: bool = true;

/// Upper bound on synchronous bodies running at once on the blocking pool
pub const DEFAULT_MAX_BLOCKING_WORKERS: usize = 16;
