use uuid::Uuid;

use crate::naming::domain::name_resolver::{NameLookup, NameResolver};
use crate::shared::file_name::{last_segment, split_extension};

/// Names each upload `{uuid}.{ext}` using a fresh v4 UUID.
///
/// The namespace is not consulted. A repeat is left to the writer's
/// no-clobber commit to reject. Uploads without an extension are stored under
/// the bare UUID, with no trailing dot.
pub struct RandomIdentifierResolver;

impl RandomIdentifierResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomIdentifierResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NameResolver for RandomIdentifierResolver {
    fn resolve(&self, requested_name: &str, _namespace: &dyn NameLookup) -> String {
        let (_, ext) = split_extension(last_segment(requested_name));
        let token = Uuid::new_v4();
        match ext.trim_start_matches('.') {
            "" => token.to_string(),
            ext => format!("{token}.{ext}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn stem(name: &str) -> &str {
        name.split('.').next().unwrap()
    }

    #[test]
    fn test_extension_is_preserved() {
        let resolver = RandomIdentifierResolver::new();
        let name = resolver.resolve("a.mov", &HashSet::new());
        assert!(name.ends_with(".mov"), "got {name}");
        assert!(Uuid::parse_str(stem(&name)).is_ok(), "got {name}");
    }

    #[test]
    fn test_token_is_version_4() {
        let resolver = RandomIdentifierResolver::new();
        let name = resolver.resolve("a.mov", &HashSet::new());
        let token = Uuid::parse_str(stem(&name)).unwrap();
        assert_eq!(token.get_version_num(), 4);
    }

    #[test]
    fn test_only_last_extension_is_kept() {
        let resolver = RandomIdentifierResolver::new();
        let name = resolver.resolve("backup.tar.gz", &HashSet::new());
        assert!(name.ends_with(".gz"));
        assert!(!name.contains("tar"));
    }

    #[test]
    fn test_no_extension_has_no_trailing_dot() {
        let resolver = RandomIdentifierResolver::new();
        let name = resolver.resolve("README", &HashSet::new());
        assert!(!name.contains('.'));
        assert!(Uuid::parse_str(&name).is_ok());
    }

    #[test]
    fn test_names_are_distinct() {
        let resolver = RandomIdentifierResolver::new();
        let names: HashSet<String> = (0..100)
            .map(|_| resolver.resolve("a.mov", &HashSet::new()))
            .collect();
        assert_eq!(names.len(), 100);
    }

    #[test]
    fn test_taken_names_are_not_consulted() {
        let resolver = RandomIdentifierResolver::new();
        let taken: HashSet<String> = ["a.mov".to_string()].into_iter().collect();
        let name = resolver.resolve("a.mov", &taken);
        assert_ne!(name, "a.mov");
    }
}
