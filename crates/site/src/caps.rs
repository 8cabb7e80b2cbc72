//! Well-known capabilities of the site infrastructure.

use std::sync::LazyLock;

use manor_component::Capability;

/// Capability under which host-policy bundles are registered, named by
/// the lower-cased host name they apply to.
pub static SITE_POLICY: LazyLock<Capability> =
	LazyLock::new(|| Capability::named("manor.site-policy"));

/// Capability under which site mappings are registered, named by the
/// lower-cased source site name.
pub static SITE_MAPPING: LazyLock<Capability> =
	LazyLock::new(|| Capability::named("manor.site-mapping"));
