//! Filename template expansion.
//!
//! Placeholders are substituted in a fixed order: `{id}`, `{author}`,
//! `{random}`, `{no}`. The order matters because `{no}` disambiguates by the
//! literal prefix in front of it, which must already contain the earlier
//! substitutions.

use std::path::Path;

use crate::error::TweetshotError;
use crate::utils::random_token;

pub const RANDOM_TOKEN_LEN: usize = 8;

/// Expand `template` into a concrete file name. `{no}` is 1-based: the count
/// of existing entries in `dest_dir` whose name starts with the substituted
/// prefix before the placeholder, plus one. The file itself is not created.
pub fn resolve_filename(
    template: &str,
    author: &str,
    id: &str,
    dest_dir: &Path,
) -> Result<String, TweetshotError> {
    let mut filename = template.to_string();

    if filename.contains("{id}") {
        filename = filename.replace("{id}", id);
    }
    if filename.contains("{author}") {
        filename = filename.replace("{author}", author);
    }
    if filename.contains("{random}") {
        filename = filename.replace("{random}", &random_token(RANDOM_TOKEN_LEN));
    }
    if let Some((prefix, _)) = filename.split_once("{no}") {
        let prefix = prefix.to_string();
        let mut count = 0usize;
        for entry in std::fs::read_dir(dest_dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                count += 1;
            }
        }
        filename = filename.replace("{no}", &(count + 1).to_string());
    }

    Ok(filename)
}
