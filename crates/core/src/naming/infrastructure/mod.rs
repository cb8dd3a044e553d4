pub mod random_identifier_resolver;
pub mod resolver_factory;
pub mod sequential_suffix_resolver;
