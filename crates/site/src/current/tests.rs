use std::thread;

use manor_component::Components;

use super::*;
use crate::node::{Site, SiteKind, SiteLike};

fn plain_site(name: &str) -> SiteHandle {
	Site::transient(name, SiteKind::Plain, Components::based(name, Vec::new()))
}

#[test]
fn set_get_clear_roundtrip() {
	assert!(current_site().is_none());

	let site = plain_site("a");
	set_current_site(Some(site.clone()));
	assert_eq!(current_site().unwrap().site_id(), site.site_id());

	clear_current_site();
	assert!(current_site().is_none());
}

#[test]
fn guard_restores_previous_site() {
	let outer = plain_site("outer");
	set_current_site(Some(outer.clone()));

	{
		let inner = plain_site("inner");
		let _guard = enter_site(inner.clone());
		assert_eq!(current_site().unwrap().site_id(), inner.site_id());
	}

	assert_eq!(current_site().unwrap().site_id(), outer.site_id());
	clear_current_site();
}

#[test]
fn threads_do_not_observe_each_other() {
	let site = plain_site("main-thread");
	set_current_site(Some(site.clone()));

	let other = thread::spawn(|| {
		assert!(current_site().is_none());
		set_current_site(Some(plain_site("other-thread")));
		assert_eq!(current_site().unwrap().name(), "other-thread");
	});
	other.join().unwrap();

	assert_eq!(current_site().unwrap().site_id(), site.site_id());
	clear_current_site();
}
