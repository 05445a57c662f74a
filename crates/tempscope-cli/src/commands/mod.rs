pub mod list;
pub mod monitor;

use std::fs::OpenOptions;

/// Initialise `env_logger`.
///
/// `RUST_LOG` always wins. Otherwise warnings go to stderr, except while the
/// full-screen chart owns the terminal, where logging is off unless a log file
/// was given.
pub fn init_logging(log_file: Option<&str>, full_screen: bool) -> std::io::Result<()> {
    let default_filter = if full_screen && log_file.is_none() {
        "off"
    } else {
        "warn"
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // A second init (tests) is harmless.
    let _ = builder.try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tempscope.log");
        init_logging(Some(path.to_str().unwrap()), true).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unwritable_log_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing").join("tempscope.log");
        assert!(init_logging(Some(path.to_str().unwrap()), false).is_err());
    }
}
