//! Resolution tests against the in-memory adapter

mod common;

use std::sync::Arc;

use common::*;
use hostparam_core::codec::is_encoded;
use hostparam_core::parameter::REDACTED;
use hostparam_core::resolver::HostContext;
use hostparam_types::auth_adapter::{Caller, ROLE_VIEWER, RoleAuthorizer};
use hostparam_types::prelude::*;

fn host1() -> HostContext {
	HostContext::new(1).organization(1)
}

#[tokio::test]
async fn test_most_specific_scope_wins() {
	let env = test_env();
	env.service.create(&admin(), new_param("http_proxy", "a", ScopeRef::Common)).await.unwrap();
	env.service
		.create(&admin(), new_param("http_proxy", "b", ScopeRef::Organization(RefId(1))))
		.await
		.unwrap();
	env.service
		.create(&admin(), new_param("http_proxy", "c", ScopeRef::Host(RefId(1))))
		.await
		.unwrap();

	let resolved = env.service.resolve(&admin(), &host1(), "http_proxy").await.unwrap().unwrap();
	assert_eq!(resolved.value(), "c");
	assert_eq!(resolved.scope(), ScopeRef::Host(RefId(1)));
	assert_eq!(resolved.parameter.priority, 70);

	// Another host in the same organization gets the organization value
	let other = HostContext::new(2).organization(1);
	let resolved = env.service.resolve(&admin(), &other, "http_proxy").await.unwrap().unwrap();
	assert_eq!(resolved.value(), "b");

	// A host outside the organization falls back to common
	let outsider = HostContext::new(3).organization(9);
	let resolved = env.service.resolve(&admin(), &outsider, "http_proxy").await.unwrap().unwrap();
	assert_eq!(resolved.value(), "a");
}

#[tokio::test]
async fn test_common_only() {
	let env = test_env();
	env.service.create(&admin(), new_param("dns", "x", ScopeRef::Common)).await.unwrap();

	for host in [host1(), HostContext::new(42), HostContext::new(7).domain(3).host_group(5)] {
		let resolved = env.resolver().resolve(&host, "dns").await.unwrap().unwrap();
		assert_eq!(resolved.value(), "x");
	}
}

#[tokio::test]
async fn test_unset_name_is_none() {
	let env = test_env();
	env.service.create(&admin(), new_param("dns", "x", ScopeRef::Common)).await.unwrap();
	assert!(env.resolver().resolve(&host1(), "unset_name").await.unwrap().is_none());
}

#[tokio::test]
async fn test_scopes_of_other_hosts_ignored() {
	let env = test_env();
	env.service.create(&admin(), new_param("ntp", "mine", ScopeRef::Host(RefId(2)))).await.unwrap();
	env.service
		.create(&admin(), new_param("ntp", "theirs", ScopeRef::Domain(RefId(5))))
		.await
		.unwrap();
	assert!(env.resolver().resolve(&host1(), "ntp").await.unwrap().is_none());
}

#[tokio::test]
async fn test_full_priority_ladder() {
	let env = test_env();
	let host = HostContext::new(1)
		.organization(1)
		.location(1)
		.domain(1)
		.subnet(1)
		.operating_system(1)
		.host_group(1);
	let ladder = [
		ScopeRef::Common,
		ScopeRef::Organization(RefId(1)),
		ScopeRef::Location(RefId(1)),
		ScopeRef::Domain(RefId(1)),
		ScopeRef::Subnet(RefId(1)),
		ScopeRef::OperatingSystem(RefId(1)),
		ScopeRef::HostGroup(RefId(1)),
		ScopeRef::Host(RefId(1)),
	];

	// Add overrides from least to most specific; each new one must take over
	for scope in ladder {
		env.service.create(&admin(), new_param("p", &scope.to_string(), scope)).await.unwrap();
		let resolved = env.resolver().resolve(&host, "p").await.unwrap().unwrap();
		assert_eq!(resolved.scope(), scope);
	}

	// explain lists every override, most specific first
	let params = env.resolver().explain(&host, "p").await.unwrap();
	assert_eq!(params.len(), 8);
	for (param, expected) in params.iter().zip(ladder.iter().rev()) {
		assert_eq!(param.scope, *expected);
	}
}

#[tokio::test]
async fn test_nearest_host_group_wins() {
	let env = test_env();
	// host group 20 is nested in 10, the host sits in 20
	let host = HostContext::new(1).host_group(20).host_group(10);
	env.service
		.create(&admin(), new_param("repo", "parent", ScopeRef::HostGroup(RefId(10))))
		.await
		.unwrap();

	let resolved = env.resolver().resolve(&host, "repo").await.unwrap().unwrap();
	assert_eq!(resolved.value(), "parent");

	env.service
		.create(&admin(), new_param("repo", "child", ScopeRef::HostGroup(RefId(20))))
		.await
		.unwrap();
	let resolved = env.resolver().resolve(&host, "repo").await.unwrap().unwrap();
	assert_eq!(resolved.value(), "child");
}

#[tokio::test]
async fn test_ambiguous_organizations() {
	let env = test_env();
	let host = HostContext::new(1).organization(1).organization(2);
	env.service
		.create(&admin(), new_param("ntp", "a", ScopeRef::Organization(RefId(1))))
		.await
		.unwrap();
	env.service
		.create(&admin(), new_param("ntp", "b", ScopeRef::Organization(RefId(2))))
		.await
		.unwrap();

	let res = env.resolver().resolve(&host, "ntp").await;
	assert!(matches!(res, Err(Error::AmbiguousOverride { .. })));

	// A more specific override settles it
	env.service.create(&admin(), new_param("ntp", "c", ScopeRef::Domain(RefId(1)))).await.unwrap();
	let host = host.domain(1);
	let resolved = env.resolver().resolve(&host, "ntp").await.unwrap().unwrap();
	assert_eq!(resolved.value(), "c");
}

#[tokio::test]
async fn test_ambiguous_locations() {
	let env = test_env();
	let host = HostContext::new(1).location(3).location(4);
	env.service.create(&admin(), new_param("ntp", "a", ScopeRef::Location(RefId(3)))).await.unwrap();
	env.service.create(&admin(), new_param("ntp", "b", ScopeRef::Location(RefId(4)))).await.unwrap();

	match env.service.resolve(&admin(), &host, "ntp").await {
		Err(Error::AmbiguousOverride { name, scopes }) => {
			assert_eq!(name.as_ref(), "ntp");
			assert_eq!(scopes.len(), 2);
			assert!(scopes.contains(&ScopeRef::Location(RefId(3))));
			assert!(scopes.contains(&ScopeRef::Location(RefId(4))));
		}
		other => panic!("expected AmbiguousOverride, got {:?}", other),
	}

	// The whole listing fails as well
	let res = env.service.resolve_all(&admin(), &host).await;
	assert!(matches!(res, Err(Error::AmbiguousOverride { .. })));

	// One location alone is fine
	let resolved =
		env.service.resolve(&admin(), &HostContext::new(1).location(4), "ntp").await.unwrap().unwrap();
	assert_eq!(resolved.value(), "b");
}

#[tokio::test]
async fn test_bare_resolver_keeps_hidden_sealed() {
	let env = test_env();
	env.service
		.create(&admin(), hidden_param("root_pass", "secret", ScopeRef::Host(RefId(1))))
		.await
		.unwrap();

	let resolved = env.resolver().resolve(&host1(), "root_pass").await.unwrap().unwrap();
	assert!(is_encoded(resolved.value()));
	assert!(!resolved.value().contains("secret"));

	let all = env.resolver().resolve_all(&host1()).await.unwrap();
	assert!(is_encoded(all["root_pass"].value()));

	let chain = env.resolver().explain(&host1(), "root_pass").await.unwrap();
	assert!(is_encoded(&chain[0].value));
}

#[tokio::test]
async fn test_resolution_storage_unavailable() {
	let env = test_env();
	env.service.create(&admin(), new_param("dns", "x", ScopeRef::Common)).await.unwrap();
	env.adapter.set_unavailable(true);

	let res = env.service.resolve(&admin(), &host1(), "dns").await;
	assert!(matches!(res, Err(Error::StorageUnavailable)));
	let res = env.service.resolve_all(&admin(), &host1()).await;
	assert!(matches!(res, Err(Error::StorageUnavailable)));
	let res = env.service.explain(&admin(), &host1(), "dns").await;
	assert!(matches!(res, Err(Error::StorageUnavailable)));

	env.adapter.set_unavailable(false);
	assert!(env.service.resolve(&admin(), &host1(), "dns").await.unwrap().is_some());
}

#[tokio::test]
async fn test_explain_redacts_for_viewer() {
	let env = test_env_with(Arc::new(RoleAuthorizer));
	let viewer = Caller::new("viewer", &[ROLE_VIEWER]);
	env.service
		.create(&admin(), hidden_param("root_pass", "secret", ScopeRef::Host(RefId(1))))
		.await
		.unwrap();
	env.service.create(&admin(), new_param("root_pass", "default", ScopeRef::Common)).await.unwrap();

	let chain = env.service.explain(&viewer, &host1(), "root_pass").await.unwrap();
	let values: Vec<&str> = chain.iter().map(|p| p.value.as_ref()).collect();
	assert_eq!(values, vec![REDACTED, "default"]);

	let chain = env.service.explain(&admin(), &host1(), "root_pass").await.unwrap();
	let values: Vec<&str> = chain.iter().map(|p| p.value.as_ref()).collect();
	assert_eq!(values, vec!["secret", "default"]);
}

#[tokio::test]
async fn test_hidden_value_resolves_decoded() {
	let env = test_env();
	env.service
		.create(&admin(), hidden_param("root_pass", "secret", ScopeRef::Host(RefId(1))))
		.await
		.unwrap();
	let resolved = env.service.resolve(&admin(), &host1(), "root_pass").await.unwrap().unwrap();
	assert_eq!(resolved.value(), "secret");
	assert!(resolved.parameter.hidden);
}

#[tokio::test]
async fn test_hidden_value_needs_read_permission() {
	let env = test_env_with(Arc::new(RoleAuthorizer));
	let viewer = Caller::new("viewer", &[ROLE_VIEWER]);
	env.service
		.create(&admin(), hidden_param("root_pass", "secret", ScopeRef::Host(RefId(1))))
		.await
		.unwrap();
	env.service.create(&admin(), new_param("dns", "x", ScopeRef::Common)).await.unwrap();

	let res = env.service.resolve(&viewer, &host1(), "root_pass").await;
	assert!(matches!(res, Err(Error::PermissionDenied)));

	let all = env.service.resolve_all(&viewer, &host1()).await.unwrap();
	assert_eq!(all.len(), 2);
	assert_eq!(all["root_pass"].value(), REDACTED);
	assert_eq!(all["dns"].value(), "x");
}

#[tokio::test]
async fn test_resolve_all() {
	let env = test_env();
	let host = HostContext::new(1).domain(3).host_group(5);
	env.service.create(&admin(), new_param("dns", "common", ScopeRef::Common)).await.unwrap();
	env.service.create(&admin(), new_param("dns", "domain", ScopeRef::Domain(RefId(3)))).await.unwrap();
	env.service.create(&admin(), new_param("ntp", "group", ScopeRef::HostGroup(RefId(5)))).await.unwrap();
	env.service.create(&admin(), new_param("ntp", "elsewhere", ScopeRef::Host(RefId(2)))).await.unwrap();

	let all = env.service.resolve_all(&admin(), &host).await.unwrap();
	let values: Vec<(&str, &str)> = all.iter().map(|(k, v)| (k.as_ref(), v.value())).collect();
	assert_eq!(values, vec![("dns", "domain"), ("ntp", "group")]);
}

#[tokio::test]
async fn test_concurrent_resolution() {
	let env = test_env();
	env.service.create(&admin(), new_param("dns", "x", ScopeRef::Common)).await.unwrap();
	env.service.create(&admin(), new_param("dns", "y", ScopeRef::Host(RefId(2)))).await.unwrap();

	let mut handles = Vec::new();
	for host_id in 1..=8 {
		let service = env.service.clone();
		handles.push(tokio::spawn(async move {
			service.resolve(&admin(), &HostContext::new(host_id), "dns").await
		}));
	}
	for (i, handle) in handles.into_iter().enumerate() {
		let resolved = handle.await.unwrap().unwrap().unwrap();
		let expected = if i == 1 { "y" } else { "x" };
		assert_eq!(resolved.value(), expected);
	}
}

// vim: ts=4
