use crate::naming::domain::name_resolver::{NameLookup, NameResolver};
use crate::shared::constants::SEQUENCE_SEPARATOR;
use crate::shared::file_name::split_extension;

/// Keeps the declared name when free, otherwise probes `{base}_1{ext}`,
/// `{base}_2{ext}`, … until one is free.
///
/// Probing always restarts at 1, so a gap left by a failed upload is reused
/// by the next upload with the same declared name.
pub struct SequentialSuffixResolver;

impl SequentialSuffixResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SequentialSuffixResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NameResolver for SequentialSuffixResolver {
    fn resolve(&self, requested_name: &str, namespace: &dyn NameLookup) -> String {
        if !namespace.is_taken(requested_name) {
            return requested_name.to_string();
        }

        let (base, ext) = split_extension(requested_name);
        let mut counter: u64 = 1;
        loop {
            let candidate = format!("{base}{SEQUENCE_SEPARATOR}{counter}{ext}");
            if !namespace.is_taken(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}
