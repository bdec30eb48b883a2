use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use packerp_core::{DomainError, DomainResult};
use packerp_products::Product;

use crate::line::PurchaseLine;

/// Upstream demand record convertible into a purchase line.
///
/// Requests model demand, so their quantity is non-negative by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    product: Product,
    quantity: f64,
    unit_price: Option<Decimal>,
    purchase_date: Option<NaiveDate>,
}

impl PurchaseRequest {
    pub fn new(product: Product, quantity: f64) -> DomainResult<Self> {
        if quantity < 0.0 {
            return Err(DomainError::validation(
                "requested quantity cannot be negative",
            ));
        }
        Ok(Self {
            product,
            quantity,
            unit_price: None,
            purchase_date: None,
        })
    }

    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub fn with_purchase_date(mut self, purchase_date: NaiveDate) -> Self {
        self.purchase_date = Some(purchase_date);
        self
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Convert the request into a purchase line.
    ///
    /// One-directional batch transform, not part of the interactive edit
    /// loop: when the product has a default package, the requested quantity
    /// is rounded **up** to the next whole multiple of the package size and
    /// the package count derived from it; amount and delivery date then flow
    /// through the standard rules.
    pub fn into_line(self) -> PurchaseLine {
        let Self {
            product,
            quantity,
            unit_price,
            purchase_date,
        } = self;

        let mut line = PurchaseLine {
            product: Some(product),
            quantity: Some(quantity),
            unit_price,
            purchase_date,
            ..PurchaseLine::default()
        };
        let patch = line.product_changed();
        line.apply(patch);

        if let Some(package) = &line.product_package {
            line.package_quantity = Some((quantity / package.quantity()).ceil() as i64);
            let patch = line.package_quantity_changed();
            line.apply(patch);
        } else {
            let patch = line.quantity_changed();
            line.apply(patch);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packerp_core::EntityId;
    use packerp_products::{Package, PackageId, ProductId, ProductTemplate, TemplateId};

    fn product(package_size: Option<f64>) -> Product {
        let mut template =
            ProductTemplate::new(TemplateId::new(EntityId::new()), "product").unwrap();
        if let Some(size) = package_size {
            template.add_package(
                Package::new(PackageId::new(EntityId::new()), "Box", size, true).unwrap(),
            );
        }
        Product::new(
            ProductId::new(EntityId::new()),
            template,
            "product",
            Decimal::new(500, 2),
        )
        .unwrap()
    }

    #[test]
    fn conversion_rounds_quantity_up_to_whole_packages() {
        let request = PurchaseRequest::new(product(Some(6.0)), 13.0)
            .unwrap()
            .with_unit_price(Decimal::new(500, 2));
        let line = request.into_line();

        assert_eq!(line.package_quantity, Some(3));
        assert_eq!(line.quantity, Some(18.0));
        assert_eq!(line.amount, Some(Decimal::new(9000, 2)));
    }

    #[test]
    fn exact_multiples_are_not_rounded_further() {
        let line = PurchaseRequest::new(product(Some(6.0)), 12.0)
            .unwrap()
            .into_line();
        assert_eq!(line.package_quantity, Some(2));
        assert_eq!(line.quantity, Some(12.0));
    }

    #[test]
    fn products_without_packages_keep_requested_quantity() {
        let line = PurchaseRequest::new(product(None), 13.0)
            .unwrap()
            .with_unit_price(Decimal::new(500, 2))
            .into_line();
        assert!(line.product_package.is_none());
        assert_eq!(line.quantity, Some(13.0));
        assert_eq!(line.amount, Some(Decimal::new(6500, 2)));
    }

    #[test]
    fn negative_demand_is_rejected() {
        assert!(matches!(
            PurchaseRequest::new(product(Some(6.0)), -1.0),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn converted_lines_pass_pre_validation() {
        use crate::line::ValidationOptions;

        let line = PurchaseRequest::new(product(Some(6.0)), 13.0)
            .unwrap()
            .into_line();
        assert!(line.pre_validate(ValidationOptions::default()).is_ok());
    }
}
