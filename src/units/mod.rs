// Units of measure: per-business catalog, conversion edges and default seeding.

pub mod bootstrap;
pub mod catalog;
pub mod converter;
pub mod model;

pub use bootstrap::{seed_default_units, seed_for_new_business, BestEffort, BootstrapError, SeedFailure, SeedReport};
pub use converter::{Conversion, ConversionDirection, UnavailableReason, UnitConverter, UnitError};
pub use model::{Unit, UnitConversion, UnitGroup};
