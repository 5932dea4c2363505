use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const LABEL_ELLIPSIS: &str = "...";

/// Truncates `id` to `max_chars` characters, appending an ellipsis when cut.
pub fn truncate_label(id: &str, max_chars: usize) -> String {
    match id.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{LABEL_ELLIPSIS}", &id[..byte_index]),
        None => id.to_owned(),
    }
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
