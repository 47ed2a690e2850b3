//! Remote file naming.

/// Derives the remote-safe name for a local file: every space becomes `_`.
///
/// The local file itself is never renamed.
pub fn remote_name(local_name: &str) -> String {
    local_name.replace(' ', "_")
}

/// Builds the upload target `base/<remote name>` with exactly one separator.
pub fn target_url(dest_location: &str, local_name: &str) -> String {
    format!(
        "{}/{}",
        dest_location.trim_end_matches('/'),
        remote_name(local_name)
    )
}
