pub mod load;
pub mod save;
pub mod types;
pub mod validate;

pub use load::{SETTINGS_FILE, apply_env_overrides, parse_user_ids};
pub use save::save_settings;
pub use types::{
    CaptureSettings, ChatSettings, Config, Language, PLACEHOLDER_LIVE_URL, UserSettings,
};
pub use validate::{validate_capture_settings, validate_settings};
