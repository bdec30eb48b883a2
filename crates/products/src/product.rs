use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use packerp_core::{DomainError, DomainResult, Entity, EntityId};

/// Package identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(pub EntityId);

/// Product template identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub EntityId);

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub EntityId);

macro_rules! impl_id_newtype {
    ($t:ty) => {
        impl $t {
            pub fn new(id: EntityId) -> Self {
                Self(id)
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

impl_id_newtype!(PackageId);
impl_id_newtype!(TemplateId);
impl_id_newtype!(ProductId);

/// A fixed multiplier at which a product may be purchased (e.g. "Box" of 6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    id: PackageId,
    name: String,
    quantity: f64,
    is_default: bool,
}

impl Package {
    /// Build a package definition.
    ///
    /// `quantity` is the number of raw units per package and must be strictly
    /// positive, which keeps the purchase-line recomputation rules free of
    /// division by zero.
    pub fn new(
        id: PackageId,
        name: impl Into<String>,
        quantity: f64,
        is_default: bool,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("package name cannot be empty"));
        }
        if !(quantity > 0.0) {
            return Err(DomainError::validation(
                "package quantity must be strictly positive",
            ));
        }
        Ok(Self {
            id,
            name,
            quantity,
            is_default,
        })
    }

    pub fn id_typed(&self) -> PackageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw units per package.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

impl Entity for Package {
    type Id = PackageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Product template: shared configuration for a family of products.
///
/// Packages declared here apply to every product of the template unless a
/// specific product declares its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTemplate {
    id: TemplateId,
    name: String,
    packages: Vec<Package>,
    purchase_lead_time: Option<u64>,
}

impl ProductTemplate {
    pub fn new(id: TemplateId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("template name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            packages: Vec::new(),
            purchase_lead_time: None,
        })
    }

    /// Supplier lead time in days, used by delivery-date scheduling.
    pub fn with_purchase_lead_time(mut self, days: u64) -> Self {
        self.purchase_lead_time = Some(days);
        self
    }

    /// Declare a package at template scope. Declaration order is preserved
    /// and breaks ties between packages flagged as default.
    pub fn add_package(&mut self, package: Package) {
        self.packages.push(package);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn purchase_lead_time(&self) -> Option<u64> {
        self.purchase_lead_time
    }
}

impl Entity for ProductTemplate {
    type Id = TemplateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A purchasable product.
///
/// Carries its template plus any product-scoped package overrides. Package
/// lookups check product scope before template scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    template: ProductTemplate,
    name: String,
    cost_price: Decimal,
    packages: Vec<Package>,
}

impl Product {
    pub fn new(
        id: ProductId,
        template: ProductTemplate,
        name: impl Into<String>,
        cost_price: Decimal,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(Self {
            id,
            template,
            name,
            cost_price,
            packages: Vec::new(),
        })
    }

    /// Declare a package at specific-product scope.
    pub fn add_package(&mut self, package: Package) {
        self.packages.push(package);
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &ProductTemplate {
        &self.template
    }

    /// Template identity, used by hosts to scope package selection widgets.
    pub fn template_id(&self) -> TemplateId {
        *self.template.id()
    }

    pub fn cost_price(&self) -> Decimal {
        self.cost_price
    }

    /// Packages declared at specific-product scope only.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// True iff at least one package is declared at either scope.
    pub fn has_packages(&self) -> bool {
        !self.packages.is_empty() || !self.template.packages().is_empty()
    }

    /// The package preselected when this product lands on a purchase line.
    ///
    /// Specific-product scope is checked before template scope; within a
    /// scope the first package flagged default wins.
    pub fn default_package(&self) -> Option<&Package> {
        self.packages
            .iter()
            .find(|p| p.is_default())
            .or_else(|| self.template.packages().iter().find(|p| p.is_default()))
    }

    /// All packages this product can be bought in, product scope first.
    pub fn available_packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().chain(self.template.packages())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
