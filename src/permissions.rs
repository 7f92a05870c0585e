//! Restricting the permissions of log files.
use std::fs::File;
use std::io;

/// Sets the mode of `file` to `600`, so the log is not world-readable.
#[cfg(unix)]
pub fn restrict_file_permissions(file: File) -> io::Result<File> {
    use std::os::unix::fs::PermissionsExt;
    let mut perm = file.metadata()?.permissions();
    perm.set_mode(0o600);
    file.set_permissions(perm)?;

    Ok(file)
}

/// Leaves `file` unchanged; owner-only permissions are only applied on unix.
#[cfg(not(unix))]
pub fn restrict_file_permissions(file: File) -> io::Result<File> {
    Ok(file)
}
