//! Wire markers and tuning defaults.
//!
//! The marker bytes are the compatibility-bearing part of the format; any
//! change here breaks every existing encoding.

// ============================================================================
// Scalar markers
// ============================================================================

/// Marker for the null value.
pub const NULL: u8 = b'n';

/// Marker for boolean `true`.
pub const TRUE: u8 = b't';

/// Marker for boolean `false`.
pub const FALSE: u8 = b'f';

/// Opens an integer; the digit run is closed by [`END`].
pub const INTEGER: u8 = b'i';

/// Prefixes the length of a text value (`u<len>:<utf-8>`).
pub const TEXT: u8 = b'u';

/// Separates a decimal length from its payload.
pub const LENGTH_SEPARATOR: u8 = b':';

// ============================================================================
// Container markers
// ============================================================================

/// Opens a list.
pub const LIST: u8 = b'l';

/// Opens a dictionary.
pub const DICTIONARY: u8 = b'd';

/// Closes an integer, list or dictionary.
pub const END: u8 = b'e';

/// Prefixes the fingerprint of an offloaded value (`*<len>:<fingerprint>`).
pub const REFERENCE: u8 = b'*';

// ============================================================================
// Defaults
// ============================================================================

/// Maximum container nesting accepted by the decoder unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Largest chunk read at once when a stream payload's length cannot be
/// checked against the remaining input.
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Size of the fixed fingerprint header: kind byte plus big-endian encoding length.
pub const FINGERPRINT_HEADER_LEN: usize = 9;
