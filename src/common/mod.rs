pub mod io;

/// Reset SIGPIPE to default behavior (SIG_DFL).
/// Rust sets SIGPIPE to SIG_IGN by default, so a closed downstream pipe
/// would otherwise surface as a BrokenPipe write error on every chunk.
/// This must be called at the start of main().
#[inline]
pub fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

/// Format an IO error message without the "(os error N)" suffix.
/// e.g. "No such file or directory" instead of
/// "No such file or directory (os error 2)".
pub fn io_error_msg(e: &std::io::Error) -> String {
    if let Some(raw) = e.raw_os_error() {
        let os_err = std::io::Error::from_raw_os_error(raw);
        let msg = format!("{}", os_err);
        msg.replace(&format!(" (os error {})", raw), "")
    } else {
        format!("{}", e)
    }
}

#[cfg(test)]
mod tests {
    use super::io_error_msg;
    use std::io;

    #[test]
    fn test_io_error_msg_strips_os_suffix() {
        let e = io::Error::from_raw_os_error(libc::ENOENT);
        let msg = io_error_msg(&e);
        assert!(!msg.contains("os error"), "got {:?}", msg);
        assert!(!msg.is_empty());
    }

    #[test]
    fn test_io_error_msg_custom() {
        let e = io::Error::other("disk on fire");
        assert_eq!(io_error_msg(&e), "disk on fire");
    }
}
