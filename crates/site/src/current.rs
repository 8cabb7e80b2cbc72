//! Per-thread current-site state.
//!
//! Exactly one current site per execution thread at any time, read by
//! lookup code and written by the traversal switcher or the request
//! boundary. The lifecycle is explicit: install at the start of a
//! request or walk, clear at its end. Concurrent threads never observe
//! each other's value.

use std::cell::RefCell;

use crate::node::SiteHandle;

#[cfg(test)]
mod tests;

thread_local! {
	static CURRENT_SITE: RefCell<Option<SiteHandle>> = const { RefCell::new(None) };
}

/// The calling thread's active site, if one is installed.
pub fn current_site() -> Option<SiteHandle> {
	CURRENT_SITE.with(|slot| slot.borrow().clone())
}

/// Installs (or clears, with `None`) the calling thread's active site.
pub fn set_current_site(site: Option<SiteHandle>) {
	CURRENT_SITE.with(|slot| *slot.borrow_mut() = site);
}

/// Clears the calling thread's active site.
pub fn clear_current_site() {
	set_current_site(None);
}

/// Installs `site` for the lifetime of the returned guard, restoring the
/// previous value on drop. Intended for request and test scopes.
pub fn enter_site(site: SiteHandle) -> CurrentSiteGuard {
	let previous = current_site();
	set_current_site(Some(site));
	CurrentSiteGuard { previous }
}

/// Restores the previously-installed site on drop.
pub struct CurrentSiteGuard {
	previous: Option<SiteHandle>,
}

impl Drop for CurrentSiteGuard {
	fn drop(&mut self) {
		set_current_site(self.previous.take());
	}
}
