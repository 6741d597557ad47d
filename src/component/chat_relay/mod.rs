//! 聊天指令轉接元件
//!
//! 收到觸發詞後擷取直播畫面，以圖片回覆；失敗時回覆原因。

mod authorization;
mod command_router;
mod main;
mod transport;

pub use authorization::AllowList;
pub use command_router::{ChatCommand, CommandRouter};
pub use main::ChatRelay;
pub use transport::{ChatTransport, ConsoleTransport, IncomingMessage};
