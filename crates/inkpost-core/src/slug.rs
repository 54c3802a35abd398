// Slug derivation
//
// Called explicitly by the service layer when a post or category is created.
// Uniqueness against the store is the caller's job; this function is pure.

/// Derive a URL slug from a title or name.
///
/// Lowercases, drops punctuation, turns whitespace runs into single hyphens
/// and collapses hyphen runs.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_hyphen = true; // suppress a leading hyphen
    for c in input.to_lowercase().chars() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
            prev_hyphen = false;
        } else if (c.is_whitespace() || c == '-') && !prev_hyphen {
            out.push('-');
            prev_hyphen = true;
        }
        // any other character is dropped
    }
    if out.ends_with('-') {
        out.pop();
    }
    out
}
