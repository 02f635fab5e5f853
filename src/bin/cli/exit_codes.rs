//! Exit codes for the CLI tool.

use varc::Error;

/// Operation completed successfully.
pub const SUCCESS: i32 = 0;
/// Usage or I/O error.
pub const FAILURE: i32 = 1;
/// Archive verification failed.
pub const VERIFY_FAILED: i32 = 2;

/// Maps an error raised while checking entry integrity to an exit code:
/// integrity failures report 2, everything else (bad arguments, missing
/// files, wrong passwords) reports 1.
pub fn verification_exit_code(error: &Error) -> i32 {
    match error {
        Error::ChecksumMismatch { .. } | Error::Decompress(_) | Error::BadPadding => VERIFY_FAILED,
        _ => FAILURE,
    }
}
