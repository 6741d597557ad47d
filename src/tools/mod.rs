mod file_size;
mod path_validator;
mod process_runner;
mod stale_file_sweeper;
mod url_validator;

pub use file_size::format_file_size;
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
pub use process_runner::{ProcessOutcome, ProcessOutput, run_with_timeout};
pub use stale_file_sweeper::sweep_stale_files;
pub use url_validator::is_youtube_url;
