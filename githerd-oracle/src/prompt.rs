//! Prompt builders for the commit-message and advice oracles.
//!
//! Prompts carry a bounded, privacy-conscious summary of the change — file
//! names and diff statistics, never full diff content. Caps bound process
//! argument size and keep a slow oracle from drowning in input.

/// At most this many changed file names appear in a commit prompt.
pub const MAX_PROMPT_FILES: usize = 10;

/// At most this many characters of diff-stat text appear in a commit prompt.
pub const MAX_DIFFSTAT_CHARS: usize = 500;

/// At most this many characters of raw git error text appear in an advice
/// prompt.
pub const MAX_ERROR_CHARS: usize = 400;

/// Build the commit-message prompt from porcelain-status file names and
/// `diff --stat` text, both truncated.
pub fn commit_message(changed_files: &[String], diff_stat: &str) -> String {
    let total = changed_files.len();
    let shown: Vec<&str> = changed_files
        .iter()
        .take(MAX_PROMPT_FILES)
        .map(String::as_str)
        .collect();
    let mut files = shown.join(", ");
    if total > MAX_PROMPT_FILES {
        files.push_str(&format!(" (+{} more)", total - MAX_PROMPT_FILES));
    }

    let stat = truncate(diff_stat.trim(), MAX_DIFFSTAT_CHARS);

    format!(
        "Write a single-line git commit message (max 72 characters, imperative \
         mood, no quotes) for a change touching {total} file(s): {files}. \
         Diff stat:\n{stat}\nRespond with the message only."
    )
}

/// Build the push-failure advice prompt from raw (truncated) git error text.
pub fn push_advice(error_text: &str) -> String {
    let error = truncate(error_text.trim(), MAX_ERROR_CHARS);
    format!(
        "A `git push` failed with the error below. Reply with one short \
         sentence suggesting a fix (a single git command if possible).\n\
         Error:\n{error}"
    )
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
