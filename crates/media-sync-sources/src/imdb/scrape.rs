use regex::Regex;
use std::sync::OnceLock;

fn list_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"href="/list/(ls\d+)"#).expect("valid regex"))
}

fn page_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"property="pageId"\s+content="(ls\d+)"|"listId"\s*:\s*"(ls\d+)""#)
            .expect("valid regex")
    })
}

fn user_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/user/(ur\d+)").expect("valid regex"))
}

fn filename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"filename\*?=(?:UTF-8'')?"?([^";]+)"?"#).expect("valid regex")
    })
}

/// List ids linked from a user's lists page, in page order without repeats
pub fn extract_list_ids(html: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for caps in list_link_re().captures_iter(html) {
        let id = &caps[1];
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// The list id backing the watchlist page
pub fn extract_watchlist_id(html: &str) -> Option<String> {
    page_id_re()
        .captures(html)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
}

/// `urNNN` from a profile URL such as `https://www.imdb.com/user/ur1234567/`
pub fn extract_user_id(url: &str) -> Option<String> {
    user_id_re().captures(url).map(|caps| caps[1].to_string())
}

/// Display name carried by an export's `Content-Disposition` header
pub fn list_name_from_content_disposition(header: &str) -> Option<String> {
    let raw = filename_re().captures(header)?.get(1)?.as_str();
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let name = decoded.strip_suffix(".csv").unwrap_or(&decoded).trim();
    (!name.is_empty()).then(|| name.to_string())
}
