use url::Url;

const YOUTUBE_HOSTS: [&str; 4] = ["youtube.com", "www.youtube.com", "youtu.be", "m.youtube.com"];

/// 判斷是否為 YouTube 網址（只比對主機名稱）
#[must_use]
pub fn is_youtube_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| YOUTUBE_HOSTS.contains(&host.as_str()))
}
