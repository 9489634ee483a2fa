use chrono::Duration;

pub const SESSION_COOKIE: &str = "todo_sid";

/// Value of cookie `name` in a `Cookie` request header.
pub fn find<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name)
            .then(|| value.trim().trim_matches('"'))
            .filter(|v| !v.is_empty())
    })
}

pub fn session_cookie(token: &str, ttl: Duration, secure: bool) -> String {
    build(token, ttl.num_seconds().max(0), secure)
}

pub fn clear_session_cookie(secure: bool) -> String {
    build("", 0, secure)
}

fn build(value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
