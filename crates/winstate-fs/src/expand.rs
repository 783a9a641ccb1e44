//! Environment placeholder expansion for system paths
//!
//! Restore targets are written portably, e.g. `%APPDATA%\Code\User` or
//! `~/.gitconfig`, and expanded against the current machine at use time.
//! Supported forms:
//!
//! - `%NAME%` (cmd style)
//! - `$env:NAME` (PowerShell style)
//! - `${NAME}`
//! - a leading `~` followed by a separator or end of input
//!
//! Unknown variables are left untouched so the resulting path simply does
//! not exist instead of silently pointing somewhere else.

/// Expand placeholders against the process environment.
pub fn expand_placeholders(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Expand placeholders using a caller-supplied variable lookup.
pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    if let Some(after) = rest.strip_prefix('~')
        && (after.is_empty() || after.starts_with('/') || after.starts_with('\\'))
        && let Some(home) = lookup("USERPROFILE").or_else(|| lookup("HOME"))
    {
        out.push_str(&home);
        rest = after;
    }

    while let Some(ch) = rest.chars().next() {
        match ch {
            '%' => {
                let body = &rest[1..];
                match body.find('%') {
                    Some(end) if end > 0 && is_var_name(&body[..end]) => {
                        let name = &body[..end];
                        match lookup(name) {
                            Some(value) => out.push_str(&value),
                            None => {
                                out.push('%');
                                out.push_str(name);
                                out.push('%');
                            }
                        }
                        rest = &body[end + 1..];
                    }
                    _ => {
                        out.push('%');
                        rest = body;
                    }
                }
            }
            '$' if rest.starts_with("${") => {
                let body = &rest[2..];
                match body.find('}') {
                    Some(end) if end > 0 && is_var_name(&body[..end]) => {
                        let name = &body[..end];
                        match lookup(name) {
                            Some(value) => out.push_str(&value),
                            None => out.push_str(&rest[..end + 3]),
                        }
                        rest = &body[end + 1..];
                    }
                    _ => {
                        out.push('$');
                        rest = &rest[1..];
                    }
                }
            }
            '$' if starts_with_ignore_case(rest, "$env:") => {
                let body = &rest[5..];
                let len = body
                    .char_indices()
                    .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
                    .map(|(i, _)| i)
                    .unwrap_or(body.len());
                if len == 0 {
                    out.push('$');
                    rest = &rest[1..];
                    continue;
                }
                let name = &body[..len];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[..5 + len]),
                }
                rest = &body[len..];
            }
            _ => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    out
}

fn is_var_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '(' | ')'))
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.is_char_boundary(prefix.len())
        && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}
