// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog entities the tariff engine reads: services, their priced
//! components, and department overrides.

use crate::types::{ComponentKind, DepartmentId, ServiceId, TariffTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One priced part of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceComponent {
    /// The identifier assigned by storage. `None` if not persisted.
    pub component_id: Option<i64>,
    /// Whether this is the technical or professional part.
    pub kind: ComponentKind,
    /// The relative value units of this part.
    pub coefficient: Decimal,
    /// Whether the component is active.
    pub is_active: bool,
    /// Whether the component has been soft-deleted.
    pub is_deleted: bool,
}

impl ServiceComponent {
    /// Creates a new active component without an id.
    #[must_use]
    pub const fn new(kind: ComponentKind, coefficient: Decimal) -> Self {
        Self {
            component_id: None,
            kind,
            coefficient,
            is_active: true,
            is_deleted: false,
        }
    }

    /// Returns whether this component is live: active and not deleted.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

/// A clinical procedure as seen by the tariff engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    service_id: ServiceId,
    title: String,
    tier: TariffTier,
    components: Vec<ServiceComponent>,
    flat_price: Option<Decimal>,
}

impl Service {
    /// Creates a new `Service`.
    ///
    /// # Arguments
    ///
    /// * `service_id` - The catalog id
    /// * `title` - Display title
    /// * `tier` - Tariff tier from the hashtag classification
    /// * `components` - Priced components, in catalog order
    /// * `flat_price` - Price used only for services without any components
    #[must_use]
    pub const fn new(
        service_id: ServiceId,
        title: String,
        tier: TariffTier,
        components: Vec<ServiceComponent>,
        flat_price: Option<Decimal>,
    ) -> Self {
        Self {
            service_id,
            title,
            tier,
            components,
            flat_price,
        }
    }

    /// Returns the service id.
    #[must_use]
    pub const fn service_id(&self) -> ServiceId {
        self.service_id
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the tariff tier.
    #[must_use]
    pub const fn tier(&self) -> TariffTier {
        self.tier
    }

    /// Returns all components, including inactive and deleted ones.
    #[must_use]
    pub fn components(&self) -> &[ServiceComponent] {
        &self.components
    }

    /// Returns the fallback flat price.
    #[must_use]
    pub const fn flat_price(&self) -> Option<Decimal> {
        self.flat_price
    }

    /// Returns the live components of `kind`.
    pub fn live_components(&self, kind: ComponentKind) -> impl Iterator<Item = &ServiceComponent> {
        self.components
            .iter()
            .filter(move |c| c.kind == kind && c.is_live())
    }

    /// Returns a copy of this service with its components replaced.
    #[must_use]
    pub fn with_components(mut self, components: Vec<ServiceComponent>) -> Self {
        self.components = components;
        self
    }
}

/// A department-specific replacement for one or both factors of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentOverride {
    /// The identifier assigned by storage. `None` if not persisted.
    pub override_id: Option<i64>,
    /// The overridden service.
    pub service_id: ServiceId,
    /// The department the override applies in.
    pub department_id: DepartmentId,
    /// Replacement technical factor value.
    pub technical_factor: Option<Decimal>,
    /// Replacement professional factor value.
    pub professional_factor: Option<Decimal>,
    /// Whether the pairing is active.
    pub is_active: bool,
    /// Whether the pairing has been soft-deleted.
    pub is_deleted: bool,
}

impl DepartmentOverride {
    /// Returns whether this pairing is live: active and not deleted.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.is_active && !self.is_deleted
    }

    /// Returns the replacement value for `kind`, if one is set.
    #[must_use]
    pub const fn value_for(&self, kind: ComponentKind) -> Option<Decimal> {
        match kind {
            ComponentKind::Technical => self.technical_factor,
            ComponentKind::Professional => self.professional_factor,
        }
    }
}
