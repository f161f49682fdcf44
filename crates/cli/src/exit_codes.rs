//! CLI exit codes.
//!
//! Scripts rely on these; keep them stable.
//!
//! | Code | Meaning                                      |
//! |------|----------------------------------------------|
//! | 0    | Success                                      |
//! | 2    | Usage error (bad arguments)                  |
//! | 3    | Config file unreadable, malformed or invalid |
//! | 4    | Event file unreadable or malformed           |
//! | 5    | Runtime or output failure                    |

/// Command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Bad arguments. Also what clap exits with on parse failure.
pub const EXIT_USAGE: u8 = 2;

pub const EXIT_INVALID_CONFIG: u8 = 3;

pub const EXIT_EVENTS: u8 = 4;

/// Output could not be serialized or written.
pub const EXIT_RUNTIME: u8 = 5;
