use chrono::{Days, NaiveDate};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use packerp_core::ValueObject;
use packerp_products::{Package, Product, TemplateId};

use crate::purchase::PurchaseState;

/// Scale applied before comparing the quantity/package ratio against the
/// stored package count at validation time (8 decimal digits).
const RATIO_SCALE: f64 = 1e8;

/// User-facing purchase-line validation error.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum LineError {
    /// Stored quantity is not a whole number of the selected package.
    ///
    /// Non-retryable: the user must correct `quantity` or
    /// `package_quantity` and resubmit.
    #[error(
        "quantity {quantity} of product \"{product}\" does not match package \
         \"{package}\" of {package_size} units"
    )]
    PackageQuantityMismatch {
        quantity: f64,
        product: String,
        package: String,
        package_size: f64,
    },
}

/// Explicit validation switches threaded through `pre_validate`.
///
/// Replaces the ambient transaction flag of older implementations: callers
/// that need to persist temporarily inconsistent lines (exception handling)
/// pass [`ValidationOptions::skip_package`] instead of toggling context
/// state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    pub validate_package: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            validate_package: true,
        }
    }
}

impl ValidationOptions {
    pub fn skip_package() -> Self {
        Self {
            validate_package: false,
        }
    }
}

impl ValueObject for ValidationOptions {}

/// Pending update for a single optional field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Update<T> {
    /// Leave the field untouched.
    Keep,
    /// Empty the field.
    Clear,
    /// Write a new value.
    Set(T),
}

impl<T> Default for Update<T> {
    fn default() -> Self {
        Update::Keep
    }
}

impl<T> Update<T> {
    fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Update::Keep => {}
            Update::Clear => *slot = None,
            Update::Set(value) => *slot = Some(value),
        }
    }
}

/// Field updates produced by one recomputation rule.
///
/// A patch only ever touches derived fields; the edited field itself is
/// written by the host before the rule runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinePatch {
    pub product_package: Update<Package>,
    pub package_quantity: Update<i64>,
    pub quantity: Update<f64>,
    pub amount: Update<Decimal>,
    pub delivery_date: Update<NaiveDate>,
}

impl LinePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ValueObject for LinePatch {}

/// Editing buffer for one purchase-order line.
///
/// Each `*_changed` rule is a pure function of the current line state and
/// returns a [`LinePatch`]; the host applies it with [`PurchaseLine::apply`].
/// On-change semantics: when a rule runs, the edited field already holds its
/// new value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub product: Option<Product>,
    pub quantity: Option<f64>,
    pub unit_price: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub product_package: Option<Package>,
    pub package_quantity: Option<i64>,
    pub purchase_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
}

impl PurchaseLine {
    /// Fold a patch into the line.
    pub fn apply(&mut self, patch: LinePatch) {
        let LinePatch {
            product_package,
            package_quantity,
            quantity,
            amount,
            delivery_date,
        } = patch;
        product_package.apply_to(&mut self.product_package);
        package_quantity.apply_to(&mut self.package_quantity);
        quantity.apply_to(&mut self.quantity);
        amount.apply_to(&mut self.amount);
        delivery_date.apply_to(&mut self.delivery_date);
    }

    /// Rule: `product` edited — reselect the package.
    ///
    /// The previous package never survives a product change. The new
    /// product's default package is looked up at specific-product scope
    /// first, then template scope.
    pub fn product_changed(&self) -> LinePatch {
        LinePatch {
            product_package: match self.product.as_ref().and_then(Product::default_package) {
                Some(package) => Update::Set(package.clone()),
                None => Update::Clear,
            },
            ..LinePatch::default()
        }
    }

    /// True iff the product exists and declares at least one package at
    /// either scope. Drives the package-field metadata predicates.
    pub fn product_has_packages(&self) -> bool {
        self.product.as_ref().is_some_and(Product::has_packages)
    }

    /// Template identity of the product, if any. Hosts use it to scope the
    /// package selection widget; no business rule depends on it.
    pub fn product_template(&self) -> Option<TemplateId> {
        self.product.as_ref().map(Product::template_id)
    }

    /// Rule: `product_package` edited.
    ///
    /// Clearing the package empties both quantities. Setting one does
    /// nothing here; population happens through the quantity rules.
    pub fn package_changed(&self) -> LinePatch {
        if self.product_package.is_some() {
            return LinePatch::default();
        }
        LinePatch {
            quantity: Update::Clear,
            package_quantity: Update::Clear,
            ..LinePatch::default()
        }
    }

    /// Rule: `package_quantity` edited — derive the raw quantity, then
    /// cascade amount and delivery date.
    ///
    /// With either the package or the package count missing the patch is
    /// empty and the existing quantity is left as-is.
    pub fn package_quantity_changed(&self) -> LinePatch {
        let (Some(package), Some(package_quantity)) =
            (&self.product_package, self.package_quantity)
        else {
            return LinePatch::default();
        };
        let quantity = package_quantity as f64 * package.quantity();
        LinePatch {
            quantity: Update::Set(quantity),
            amount: self.compute_amount(Some(quantity)),
            delivery_date: self.compute_delivery_date(),
            ..LinePatch::default()
        }
    }

    /// Rule: `quantity` edited — standard cascade first, then re-derive the
    /// package count.
    ///
    /// The package count is truncated toward zero: quantity 13 in a package
    /// of 6 yields 2 whole packages, not 3. A zero quantity leaves the
    /// stored package count untouched.
    pub fn quantity_changed(&self) -> LinePatch {
        let package_quantity = match (&self.product_package, self.quantity) {
            (Some(package), Some(quantity)) if quantity != 0.0 => {
                Update::Set((quantity / package.quantity()) as i64)
            }
            _ => Update::Keep,
        };
        LinePatch {
            package_quantity,
            amount: self.compute_amount(self.quantity),
            delivery_date: self.compute_delivery_date(),
            ..LinePatch::default()
        }
    }

    /// Standard line pricing rule: amount = unit price × quantity, rounded
    /// to 2 decimal places.
    fn compute_amount(&self, quantity: Option<f64>) -> Update<Decimal> {
        let (Some(unit_price), Some(quantity)) = (self.unit_price, quantity) else {
            return Update::Keep;
        };
        match Decimal::from_f64(quantity) {
            Some(quantity) => Update::Set((unit_price * quantity).round_dp(2)),
            None => Update::Keep,
        }
    }

    /// Standard scheduling rule: purchase date plus the template's supplier
    /// lead time, when both are known.
    fn compute_delivery_date(&self) -> Update<NaiveDate> {
        let (Some(product), Some(purchase_date)) = (&self.product, self.purchase_date) else {
            return Update::Keep;
        };
        let Some(days) = product.template().purchase_lead_time() else {
            return Update::Keep;
        };
        match purchase_date.checked_add_days(Days::new(days)) {
            Some(date) => Update::Set(date),
            None => Update::Keep,
        }
    }

    /// Pre-save validation.
    ///
    /// With a package selected (and package validation not switched off),
    /// the quantity/package ratio rounded to 8 decimal digits must match the
    /// stored package count. Absolute values are compared, so return-type
    /// lines with matching magnitudes pass.
    pub fn pre_validate(&self, opts: ValidationOptions) -> Result<(), LineError> {
        if !opts.validate_package {
            return Ok(());
        }
        let Some(package) = &self.product_package else {
            return Ok(());
        };
        let quantity = self.quantity.unwrap_or(0.0);
        let ratio = quantity / package.quantity();
        let rounded = (ratio * RATIO_SCALE).round() / RATIO_SCALE;
        let stored = self.package_quantity.unwrap_or(0) as f64;
        if rounded.abs() != stored.abs() {
            return Err(LineError::PackageQuantityMismatch {
                quantity,
                product: self
                    .product
                    .as_ref()
                    .map(|p| p.name().to_owned())
                    .unwrap_or_default(),
                package: package.name().to_owned(),
                package_size: package.quantity(),
            });
        }
        Ok(())
    }

    /// Field metadata: the package fields only show up for products that
    /// declare packages.
    pub fn package_fields_visible(&self) -> bool {
        self.product_has_packages()
    }

    /// Field metadata: required exactly when visible.
    pub fn package_fields_required(&self) -> bool {
        self.product_has_packages()
    }

    /// Field metadata: package fields freeze once the document leaves draft.
    pub fn package_fields_readonly(&self, state: PurchaseState) -> bool {
        state != PurchaseState::Draft
    }
}
