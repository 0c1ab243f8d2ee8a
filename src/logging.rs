use flexi_logger::{
    colored_default_format, detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger,
    LoggerHandle, Naming,
};

use crate::Result;

/// Console logging, plus rotated files when `log_dir` is given.
///
/// Level comes from `RUST_LOG`, falling back to `info`. Files rotate at 10 MB and
/// the last 7 are kept. The returned handle must stay alive for file output to flush.
pub fn setup_logging(log_dir: Option<&str>) -> Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str("info")?;

    let handle = match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename("proposal_cards"))
            .format_for_files(detailed_format)
            .format_for_stderr(colored_default_format)
            .duplicate_to_stderr(Duplicate::All)
            .rotate(
                Criterion::Size(10 * 1024 * 1024),
                Naming::Numbers,
                Cleanup::KeepLogFiles(7),
            )
            .start()?,
        None => logger.format(colored_default_format).start()?,
    };

    Ok(handle)
}
