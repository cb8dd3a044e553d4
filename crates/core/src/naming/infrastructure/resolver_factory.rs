use crate::naming::domain::name_resolver::NameResolver;
use crate::naming::domain::naming_strategy::NamingStrategy;

use super::random_identifier_resolver::RandomIdentifierResolver;
use super::sequential_suffix_resolver::SequentialSuffixResolver;

/// Creates the resolver for the configured naming strategy.
pub fn create_resolver(strategy: NamingStrategy) -> Box<dyn NameResolver> {
    log::info!("Using {strategy} naming for stored uploads");
    match strategy {
        NamingStrategy::Sequential => Box::new(SequentialSuffixResolver::new()),
        NamingStrategy::Random => Box::new(RandomIdentifierResolver::new()),
    }
}
