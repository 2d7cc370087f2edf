//! Line codes for multi-line diff comments.
//!
//! GitLab identifies a line inside a merge request diff as
//! `<sha1 of the file path>_<old line>_<new line>`. Callers only send the line
//! numbers; the code is derived here.

use sha1::{Digest, Sha1};

/// Build the line code for `file_name` at the given old/new line pair.
pub fn line_code(file_name: &str, old_line: u32, new_line: u32) -> String {
    let digest = Sha1::digest(file_name.as_bytes());
    format!("{:x}_{}_{}", digest, old_line, new_line)
}
