#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    Help,
    Capture,
    Ignored,
}

/// 將訊息文字對應到指令
#[derive(Debug, Clone)]
pub struct CommandRouter {
    triggers: Vec<String>,
}

impl CommandRouter {
    pub fn new<S: AsRef<str>>(triggers: &[S]) -> Self {
        Self {
            triggers: triggers
                .iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// 觸發詞不分大小寫、需完全相符；未知的斜線指令一律忽略
    #[must_use]
    pub fn route(&self, text: &str) -> ChatCommand {
        let text = text.trim().to_lowercase();

        if let Some(command) = text.strip_prefix('/') {
            // Telegram 群組中指令可能帶 @botname
            let name = command
                .split(|c: char| c == '@' || c.is_whitespace())
                .next()
                .unwrap_or_default();
            return match name {
                "start" => ChatCommand::Start,
                "help" => ChatCommand::Help,
                _ => ChatCommand::Ignored,
            };
        }

        if self.triggers.iter().any(|t| *t == text) {
            ChatCommand::Capture
        } else {
            ChatCommand::Ignored
        }
    }
}
