//! Shipment and invoice discrepancy resolution.
//!
//! Lines regenerated while resolving a discrepancy may temporarily violate
//! the whole-package invariant until a human reconciles them, so package
//! validation is switched off for the duration of the operation.

use tracing::debug;

use crate::line::{LineError, PurchaseLine, ValidationOptions};
use crate::purchase::Purchase;

/// Resolve a shipment discrepancy by appending regenerated lines and
/// re-validating the document with package validation disabled.
pub fn handle_shipment_exception(
    purchase: &mut Purchase,
    regenerated: Vec<PurchaseLine>,
) -> Result<(), LineError> {
    debug!(
        lines = regenerated.len(),
        "package validation disabled while resolving shipment exception"
    );
    resolve(purchase, regenerated)
}

/// Resolve an invoice discrepancy. Same override as the shipment variant.
pub fn handle_invoice_exception(
    purchase: &mut Purchase,
    regenerated: Vec<PurchaseLine>,
) -> Result<(), LineError> {
    debug!(
        lines = regenerated.len(),
        "package validation disabled while resolving invoice exception"
    );
    resolve(purchase, regenerated)
}

fn resolve(purchase: &mut Purchase, regenerated: Vec<PurchaseLine>) -> Result<(), LineError> {
    purchase.lines_mut().extend(regenerated);
    purchase.pre_validate(ValidationOptions::skip_package())
}

#[cfg(test)]
mod tests {
    use super::*;
    use packerp_core::EntityId;
    use packerp_products::{Package, PackageId, Product, ProductId, ProductTemplate, TemplateId};
    use rust_decimal::Decimal;

    fn boxed_product() -> Product {
        let mut template =
            ProductTemplate::new(TemplateId::new(EntityId::new()), "product").unwrap();
        template
            .add_package(Package::new(PackageId::new(EntityId::new()), "Box", 6.0, true).unwrap());
        Product::new(
            ProductId::new(EntityId::new()),
            template,
            "product",
            Decimal::new(500, 2),
        )
        .unwrap()
    }

    fn inconsistent_line() -> PurchaseLine {
        let mut line = PurchaseLine::default();
        line.product = Some(boxed_product());
        let patch = line.product_changed();
        line.apply(patch);
        line.quantity = Some(13.0);
        line.package_quantity = Some(2);
        line
    }

    #[test]
    fn shipment_exception_accepts_inconsistent_lines() {
        let mut purchase = Purchase::new(None);
        assert!(handle_shipment_exception(&mut purchase, vec![inconsistent_line()]).is_ok());
        assert_eq!(purchase.lines().len(), 1);
        // The regular save path still rejects the document.
        assert!(purchase.pre_validate(ValidationOptions::default()).is_err());
    }

    #[test]
    fn invoice_exception_accepts_inconsistent_lines() {
        let mut purchase = Purchase::new(None);
        assert!(handle_invoice_exception(&mut purchase, vec![inconsistent_line()]).is_ok());
        assert_eq!(purchase.lines().len(), 1);
    }
}
