pub mod name_resolver;
pub mod naming_strategy;
