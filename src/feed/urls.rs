//! Link targets for the feed chrome (edit pages, users, rooms).

use url::form_urlencoded::byte_serialize;
use url::Url;

/// URL builder bound to the repository that stores the update logs.
#[derive(Debug, Clone)]
pub struct FeedUrls {
    base_repo: String,
}

impl FeedUrls {
    /// `base_repo` is `owner/name` on GitHub.
    pub fn new(base_repo: impl Into<String>) -> Self {
        Self {
            base_repo: base_repo.into(),
        }
    }

    /// GitHub web editor for one user's log in one era.
    pub fn edit(&self, user: &str, era: i64) -> String {
        let host = "https://github.com/";
        let Ok(mut url) = Url::parse(host) else {
            return host.to_string();
        };
        let file = format!("{}.{}.txt", user, era);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(self.base_repo.split('/'))
                .extend(["edit", "master", "users", user, file.as_str()]);
        }
        url.into()
    }
}

/// Matrix permalink for a room.
pub fn matrix_to(channel: &str) -> String {
    format!("https://matrix.to/#/{}", channel)
}

/// In-app route showing one room, optionally pinned to a `(start, end)` window.
pub fn room_route(channel: &str, window: Option<(i64, i64)>) -> String {
    let channel: String = byte_serialize(channel.as_bytes()).collect();
    with_window(format!("#room={}", channel), window)
}

/// In-app route showing one or more users (comma separated), optionally pinned to a window.
pub fn user_route(user: &str, window: Option<(i64, i64)>) -> String {
    with_window(format!("#user={}", user), window)
}

fn with_window(route: String, window: Option<(i64, i64)>) -> String {
    match window {
        Some((start, end)) => format!("{}&start={}&end={}", route, start, end),
        None => route,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_url() {
        let urls = FeedUrls::new("robotzilla/histoire");
        assert_eq!(
            urls.edit("bob", 1540000000),
            "https://github.com/robotzilla/histoire/edit/master/users/bob/bob.1540000000.txt"
        );
    }

    #[test]
    fn test_edit_url_encodes_user() {
        let urls = FeedUrls::new("robotzilla/histoire");
        assert_eq!(
            urls.edit("a b", 7),
            "https://github.com/robotzilla/histoire/edit/master/users/a%20b/a%20b.7.txt"
        );
    }

    #[test]
    fn test_routes() {
        assert_eq!(room_route("#jsparagus", None), "#room=%23jsparagus");
        assert_eq!(user_route("bob", None), "#user=bob");
        assert_eq!(matrix_to("#jsparagus"), "https://matrix.to/#/#jsparagus");
    }

    #[test]
    fn test_routes_carry_window() {
        assert_eq!(
            user_route("bob,alice", Some((1_538_000_000, 1_541_000_000))),
            "#user=bob,alice&start=1538000000&end=1541000000"
        );
        assert_eq!(
            room_route("#jsparagus", Some((1, 2))),
            "#room=%23jsparagus&start=1&end=2"
        );
    }
}
