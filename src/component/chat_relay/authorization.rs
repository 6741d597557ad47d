use crate::config::ChatSettings;
use std::collections::HashSet;

/// 使用者允許名單
///
/// 名單為空時的行為由 `allow_all_when_empty` 明確決定。
#[derive(Debug, Clone)]
pub struct AllowList {
    user_ids: HashSet<i64>,
    allow_all_when_empty: bool,
}

impl AllowList {
    pub fn new(user_ids: impl IntoIterator<Item = i64>, allow_all_when_empty: bool) -> Self {
        Self {
            user_ids: user_ids.into_iter().collect(),
            allow_all_when_empty,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self::new(
            settings.allowed_user_ids.iter().copied(),
            settings.allow_all_when_empty,
        )
    }

    #[must_use]
    pub fn is_authorized(&self, user_id: i64) -> bool {
        if self.user_ids.is_empty() {
            return self.allow_all_when_empty;
        }
        self.user_ids.contains(&user_id)
    }
}
