use uuid::Uuid;

/// Base name used when sanitization leaves nothing of the original stem.
const FALLBACK_STEM: &str = "image";

/// Reduce arbitrary input to a flat, filesystem-safe filename.
///
/// Non-ASCII characters are dropped, path separators and whitespace runs
/// become `_`, anything outside `[A-Za-z0-9_.-]` is removed, and leading or
/// trailing `.`/`_` are trimmed. The result may be empty.
pub fn sanitize_filename(input: &str) -> String {
    let separated: String = input
        .chars()
        .filter(char::is_ascii)
        .map(|c| if matches!(c, '/' | '\\') { ' ' } else { c })
        .collect();

    let joined = separated.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(['.', '_'])
        .to_string()
}

/// Split a filename into stem and extension at the last `.` of its final
/// path component. Leading dots belong to the stem, so `.png` has no extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    let component_start = name.rfind(['/', '\\']).map_or(0, |pos| pos + 1);
    let Some(dot) = name.rfind('.') else {
        return (name, None);
    };
    if dot < component_start || name[component_start..dot].chars().all(|c| c == '.') {
        return (name, None);
    }
    (&name[..dot], Some(&name[dot + 1..]))
}

/// Check the extension of `name` against a lowercase allow-list.
pub fn has_allowed_extension(name: &str, allowed: &[String]) -> bool {
    match split_extension(name) {
        (_, Some(ext)) if !ext.is_empty() => {
            let ext = ext.to_lowercase();
            allowed.iter().any(|candidate| *candidate == ext)
        }
        _ => false,
    }
}

/// Sanitize `name` and splice a fresh random token before its extension:
/// `{stem}.{token}.{ext}`.
///
/// Stem and extension are sanitized separately so an extension that passed
/// validation survives even when the stem is reduced to nothing.
pub fn make_unique_filename(name: &str) -> String {
    let token = Uuid::new_v4();
    let (stem, ext) = split_extension(name);

    let mut stem = sanitize_filename(stem);
    if stem.is_empty() {
        stem = FALLBACK_STEM.to_string();
    }

    match ext.map(sanitize_filename).filter(|ext| !ext.is_empty()) {
        Some(ext) => format!("{stem}.{token}.{ext}"),
        None => format!("{stem}.{token}"),
    }
}
