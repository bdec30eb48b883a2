//! Package-aware purchasing domain module.
//!
//! This crate contains the recomputation rules that keep a purchase line's
//! `quantity`, `product_package`, `package_quantity`, `amount` and
//! `delivery_date` fields mutually consistent while a user edits the line,
//! plus the pre-save validation that rejects quantities which are not whole
//! multiples of the selected package. Everything is deterministic domain
//! logic (no IO, no HTTP, no storage): the host application writes the
//! edited field, invokes the matching `*_changed` rule and applies the
//! returned [`LinePatch`].

pub mod exception;
pub mod line;
pub mod purchase;
pub mod request;

pub use exception::{handle_invoice_exception, handle_shipment_exception};
pub use line::{LineError, LinePatch, PurchaseLine, Update, ValidationOptions};
pub use purchase::{Purchase, PurchaseState};
pub use request::PurchaseRequest;
