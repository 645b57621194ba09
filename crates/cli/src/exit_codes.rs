//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `rgrid` exit codes.
//! Scripts rely on them, so treat the values as a contract.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad args, unknown row/column)         |
//! | 3    | I/O error (file missing, unreadable, unwritable)   |
//! | 4    | Parse error (not a chart document)                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, no such row or column, refusing to clobber.
pub const EXIT_USAGE: u8 = 2;

/// A chart file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// A file was read but is not a chart document.
pub const EXIT_PARSE: u8 = 4;
