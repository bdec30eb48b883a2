//! Products domain module.
//!
//! Products, product templates and their purchase packages. A package is a
//! fixed multiplier (units per box, crate, pallet, ...) at which a product may
//! be purchased; packages can be declared on a template or overridden on a
//! specific product, and one of them may be flagged as the default choice.

pub mod product;

pub use product::{
    Package, PackageId, Product, ProductId, ProductTemplate, TemplateId,
};
