// ABOUTME: POSIX shell quoting for values interpolated into remote commands.
// ABOUTME: Every path, project name, and branch goes through escape() before use.

/// Quote a value for a POSIX shell using single quotes.
///
/// Embedded single quotes are closed, escaped, and reopened (`'\''`), so the
/// result is always exactly one shell word with no expansion.
pub fn escape(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
