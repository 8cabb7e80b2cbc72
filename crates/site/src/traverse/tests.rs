use std::sync::Arc;

use manor_component::{Capability, Components, Provider, provider};

use super::*;
use crate::current::clear_current_site;
use crate::node::{Site, SiteLike};
use crate::resolve::{get_site_for_site_names, register_host_policy};

fn cap(name: &str) -> Capability {
	Capability::named(name)
}

fn as_i32(p: Provider) -> i32 {
	*p.downcast::<i32>().unwrap()
}

/// Persisted main bundle with a marker utility.
fn main_bundle() -> Arc<Components> {
	let main = Components::persistent("main");
	main.register_utility(cap("main-only"), "", provider(1i32));
	main
}

/// Host bundle with a marker utility and a shared one.
fn host_bundle() -> Arc<Components> {
	let host = Components::persistent("host.example.com");
	host.register_utility(cap("host-only"), "", provider(2i32));
	host.register_utility(cap("shared"), "", provider(10i32));
	host
}

/// A current site carrying a host override, as the resolver synthesizes.
fn override_site(host: &Arc<Components>, main: &Arc<Components>) -> SiteHandle {
	let composite =
		Components::host_composite("host.example.com", host.clone(), main.clone());
	Site::transient("host.example.com", SiteKind::Plain, composite)
}

fn plain_site(name: &str, bundle: Arc<Components>) -> SiteHandle {
	Site::persistent(name, SiteKind::Plain, bundle)
}

#[test]
fn root_and_main_are_no_ops() {
	clear_current_site();
	let root: SiteHandle =
		Site::persistent("root", SiteKind::Root, Components::persistent("root"));
	let app: SiteHandle = Site::persistent("app", SiteKind::MainApplication, main_bundle());

	before_traverse(&root).unwrap();
	assert!(current_site().is_none());
	before_traverse(&app).unwrap();
	assert!(current_site().is_none());
}

#[test]
fn first_site_is_installed() {
	clear_current_site();
	let site = plain_site("s1", main_bundle());

	before_traverse(&site).unwrap();
	assert_eq!(current_site().unwrap().site_id(), site.site_id());
	clear_current_site();
}

#[test]
fn identity_is_a_no_op() {
	clear_current_site();
	let site = plain_site("s1", main_bundle());
	set_current_site(Some(site.clone()));

	before_traverse(&site).unwrap();
	assert_eq!(current_site().unwrap().site_id(), site.site_id());
	clear_current_site();
}

#[test]
fn host_policy_pair_is_a_no_op() {
	clear_current_site();
	let a: SiteHandle = Site::persistent(
		"a.example.com",
		SiteKind::HostPolicy,
		Components::persistent("a.example.com"),
	);
	let b: SiteHandle = Site::persistent(
		"b.example.com",
		SiteKind::HostPolicy,
		Components::persistent("b.example.com"),
	);
	set_current_site(Some(a.clone()));

	before_traverse(&b).unwrap();
	// The established host configuration is untouched.
	let current = current_site().unwrap();
	assert_eq!(current.site_id(), a.site_id());
	assert!(Arc::ptr_eq(&current.components(), &a.components()));
	clear_current_site();
}

#[test]
fn override_is_composed_into_traversed_site() {
	clear_current_site();
	let main = main_bundle();
	let host = host_bundle();
	set_current_site(Some(override_site(&host, &main)));

	let b1 = Components::persistent("b1");
	b1.add_base(main.clone()).unwrap();
	let s1 = plain_site("s1", b1);
	before_traverse(&s1).unwrap();

	let current = current_site().unwrap();
	// A pass-through proxy was installed, not s1 itself.
	assert_ne!(current.site_id(), s1.site_id());
	assert_eq!(current.name(), "s1");
	assert!(matches!(
		current.set_components(Components::persistent("x")),
		Err(crate::error::SiteError::ProxyImmutable)
	));

	// Host components were appended behind the new site's chain.
	let components = current.components();
	assert_eq!(as_i32(components.query_utility(&cap("main-only"), "").unwrap()), 1);
	assert_eq!(as_i32(components.query_utility(&cap("host-only"), "").unwrap()), 2);
	assert!(Arc::ptr_eq(&components.host_components().unwrap(), &host));
	clear_current_site();
}

#[test]
fn repeated_switch_reaches_the_same_effective_state() {
	clear_current_site();
	let main = main_bundle();
	let host = host_bundle();
	set_current_site(Some(override_site(&host, &main)));

	let b1 = Components::persistent("b1");
	b1.add_base(main.clone()).unwrap();
	let s1 = plain_site("s1", b1);

	before_traverse(&s1).unwrap();
	let first = current_site().unwrap().components().resolution_order();
	before_traverse(&s1).unwrap();
	let second = current_site().unwrap().components().resolution_order();

	// Fresh composite heads, identical tails: the effective lookup chain
	// is unchanged.
	assert_eq!(first.len(), second.len());
	for (a, b) in first.iter().zip(second.iter()).skip(1) {
		assert!(Arc::ptr_eq(a, b));
	}
	clear_current_site();
}

#[test]
fn override_survives_multiple_hops() {
	clear_current_site();
	let main = main_bundle();
	let host = host_bundle();
	set_current_site(Some(override_site(&host, &main)));

	let b1 = Components::persistent("b1");
	b1.add_base(main.clone()).unwrap();
	before_traverse(&plain_site("s1", b1)).unwrap();

	let b2 = Components::persistent("b2");
	b2.add_base(main.clone()).unwrap();
	before_traverse(&plain_site("s2", b2)).unwrap();

	let current = current_site().unwrap();
	assert_eq!(current.name(), "s2");
	let components = current.components();
	assert!(Arc::ptr_eq(&components.host_components().unwrap(), &host));
	assert_eq!(as_i32(components.query_utility(&cap("host-only"), "").unwrap()), 2);
	clear_current_site();
}

#[test]
fn already_inherited_override_keeps_its_position() {
	clear_current_site();
	let main = main_bundle();
	main.register_utility(cap("shared"), "", provider(20i32));
	let host = host_bundle();
	set_current_site(Some(override_site(&host, &main)));

	// The new site's chain already starts with the host bundle.
	let b2 = Components::based("b2", vec![host.clone(), main.clone()]);
	let s2 = plain_site("s2", b2);
	before_traverse(&s2).unwrap();

	let components = current_site().unwrap().components();
	let order = components.resolution_order();
	let host_positions: Vec<_> = order
		.iter()
		.enumerate()
		.filter(|(_, bundle)| Arc::ptr_eq(bundle, &host))
		.map(|(i, _)| i)
		.collect();
	let main_position = order
		.iter()
		.position(|bundle| Arc::ptr_eq(bundle, &main))
		.unwrap();

	// Appending de-duplicated: one occurrence, still ahead of main.
	assert_eq!(host_positions.len(), 1);
	assert!(host_positions[0] < main_position);
	assert_eq!(as_i32(components.query_utility(&cap("shared"), "").unwrap()), 10);
	clear_current_site();
}

#[test]
fn unreconcilable_sites_are_rejected() {
	clear_current_site();
	let a = plain_site("a", Components::persistent("a"));
	let b = plain_site("b", Components::persistent("b"));
	set_current_site(Some(a));

	let err = before_traverse(&b).unwrap_err();
	assert!(err.is_not_found());
	assert!(matches!(err, TraversalError::UnresolvableSite { .. }));
	// The failed switch leaves the current site alone.
	assert_eq!(current_site().unwrap().name(), "a");
	clear_current_site();
}

#[test]
fn resolver_output_feeds_the_switcher() {
	clear_current_site();
	let policies = Components::persistent("");
	let host = host_bundle();
	register_host_policy(&policies, "host.example.com", host.clone());
	let main = main_bundle();
	let fallback: SiteHandle = Site::persistent("main", SiteKind::MainApplication, main.clone());

	let resolved = get_site_for_site_names(&policies, &["host.example.com"], &fallback).unwrap();
	set_current_site(Some(resolved));

	let b1 = Components::persistent("b1");
	b1.add_base(main).unwrap();
	before_traverse(&plain_site("s1", b1)).unwrap();

	let components = current_site().unwrap().components();
	assert!(Arc::ptr_eq(&components.host_components().unwrap(), &host));
	assert_eq!(as_i32(components.query_utility(&cap("host-only"), "").unwrap()), 2);
	clear_current_site();
}
