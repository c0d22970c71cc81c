//! Emacs Lisp rendering for engine requests.
//!
//! # Responsibility
//! - Turn `EngineRequest` values into single `emacsclient --eval` forms.
//! - Own string quoting so user text can never escape its literal.
//!
//! # Invariants
//! - Every user-controlled value is emitted through `quote`.
//! - `AppendEntry` performs exactly one `insert` call, so heading and content
//!   land as one buffer change.

use super::EngineRequest;
use crate::model::note::render_front_matter;
use std::path::Path;

/// Result string returned by `CreateNote` when the file was written.
pub const CREATED: &str = "created";
/// Result string returned by `CreateNote` when the file already existed.
pub const EXISTS: &str = "exists";
/// Result string returned by `AppendEntry` after the buffer was saved.
pub const APPENDED: &str = "appended";

/// Renders one request as a self-contained Emacs Lisp expression.
pub fn render(request: &EngineRequest) -> String {
    match request {
        EngineRequest::Ping => "(progn t)".to_string(),
        EngineRequest::CreateNote { path, id, title } => format!(
            "(let ((path {path})) \
               (if (file-exists-p path) {exists} \
                 (make-directory (file-name-directory path) t) \
                 (with-temp-file path (insert {header})) \
                 {created}))",
            path = quote_path(path),
            header = quote(&render_front_matter(*id, title)),
            exists = quote(EXISTS),
            created = quote(CREATED),
        ),
        EngineRequest::AppendEntry { path, block } => format!(
            "(with-current-buffer (find-file-noselect {path}) \
               (save-excursion \
                 (save-restriction \
                   (widen) \
                   (goto-char (point-max)) \
                   (insert (if (bolp) \"\" \"\\n\") {block}))) \
               (save-buffer) \
               {appended})",
            path = quote_path(path),
            block = quote(block),
            appended = quote(APPENDED),
        ),
    }
}

/// Quotes `value` as an Emacs Lisp string literal.
///
/// Only `\` and `"` need escaping; newlines are legal inside literals.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}
