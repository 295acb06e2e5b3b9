//! Display names for Matrix users.

use std::collections::HashMap;

/// Map each full user id to the name shown in the feed.
///
/// Ids look like `name:server`. A user is shown as the part before the last `:` when no other
/// listed user shares that part. Users whose short name collides, and ids without a server,
/// keep their full id.
pub fn display_names(users: &[String]) -> HashMap<String, String> {
    let mut by_prefix: HashMap<&str, Vec<&str>> = HashMap::new();
    for user in users {
        if let Some((prefix, _server)) = user.rsplit_once(':') {
            by_prefix.entry(prefix).or_default().push(user);
        }
    }

    let mut names: HashMap<String, String> = users
        .iter()
        .map(|user| (user.clone(), user.clone()))
        .collect();
    for (prefix, holders) in by_prefix {
        if let [only] = holders.as_slice() {
            names.insert(only.to_string(), prefix.to_string());
        }
    }
    names
}
