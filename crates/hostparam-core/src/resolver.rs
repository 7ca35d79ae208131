//! Override resolution
//!
//! For a host and a parameter name, collect every override attached to a scope
//! that applies to the host and keep the one with the highest priority. Host
//! group ties are broken by position in the host's group chain, nearest group
//! first. Any other tie means two unrelated scope instances of the same kind
//! both claim the host, and resolution fails with `AmbiguousOverride` rather
//! than picking one.
//!
//! The resolver works on stored parameters: hidden values come back in their
//! encoded form. Decoding is left to `ParameterService`, which checks read
//! permission first.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use hostparam_types::param_adapter::ParamAdapter;
use hostparam_types::types::Parameter;

use crate::prelude::*;

/// The scope instances a host belongs to
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostContext {
	pub host_id: RefId,
	/// The host's group followed by its ancestors, nearest first
	#[serde(default)]
	pub host_groups: Vec<RefId>,
	pub domain: Option<RefId>,
	pub subnet: Option<RefId>,
	pub operating_system: Option<RefId>,
	#[serde(default)]
	pub organizations: Vec<RefId>,
	#[serde(default)]
	pub locations: Vec<RefId>,
}

impl HostContext {
	pub fn new(host_id: impl Into<RefId>) -> Self {
		Self { host_id: host_id.into(), ..Self::default() }
	}

	/// Append a host group; call nearest group first
	pub fn host_group(mut self, id: impl Into<RefId>) -> Self {
		self.host_groups.push(id.into());
		self
	}

	pub fn domain(mut self, id: impl Into<RefId>) -> Self {
		self.domain = Some(id.into());
		self
	}

	pub fn subnet(mut self, id: impl Into<RefId>) -> Self {
		self.subnet = Some(id.into());
		self
	}

	pub fn operating_system(mut self, id: impl Into<RefId>) -> Self {
		self.operating_system = Some(id.into());
		self
	}

	pub fn organization(mut self, id: impl Into<RefId>) -> Self {
		self.organizations.push(id.into());
		self
	}

	pub fn location(mut self, id: impl Into<RefId>) -> Self {
		self.locations.push(id.into());
		self
	}

	/// Every scope instance whose overrides apply to this host, least specific first
	pub fn applicable_scopes(&self) -> Vec<ScopeRef> {
		let mut scopes = vec![ScopeRef::Common];
		scopes.extend(self.organizations.iter().copied().map(ScopeRef::Organization));
		scopes.extend(self.locations.iter().copied().map(ScopeRef::Location));
		scopes.extend(self.domain.map(ScopeRef::Domain));
		scopes.extend(self.subnet.map(ScopeRef::Subnet));
		scopes.extend(self.operating_system.map(ScopeRef::OperatingSystem));
		// Farthest ancestor first, so the list reads from general to specific
		scopes.extend(self.host_groups.iter().rev().copied().map(ScopeRef::HostGroup));
		scopes.push(ScopeRef::Host(self.host_id));

		let mut seen = std::collections::HashSet::with_capacity(scopes.len());
		scopes.retain(|scope| seen.insert(*scope));
		scopes
	}

	/// Distance of a host group from the host (0 = the host's own group)
	fn host_group_rank(&self, id: RefId) -> Option<usize> {
		self.host_groups.iter().position(|g| *g == id)
	}
}

/// The winning override for a name
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resolved {
	pub parameter: Parameter,
}

impl Resolved {
	pub fn value(&self) -> &str {
		&self.parameter.value
	}

	pub fn scope(&self) -> ScopeRef {
		self.parameter.scope
	}
}

#[derive(Clone, Debug)]
pub struct Resolver {
	adapter: Arc<dyn ParamAdapter>,
}

impl Resolver {
	pub fn new(adapter: Arc<dyn ParamAdapter>) -> Self {
		Self { adapter }
	}

	/// Effective value of `name` for `host`, or `None` if no applicable scope defines it
	pub async fn resolve(&self, host: &HostContext, name: &str) -> ClResult<Option<Resolved>> {
		let scopes = host.applicable_scopes();
		let candidates = self.adapter.find_all_by_name_across_scopes(name, &scopes).await?;

		let Some(winner) = select(host, name, filter_applicable(candidates, &scopes))? else {
			debug!("No value for '{}' on host {}", name, host.host_id);
			return Ok(None);
		};
		debug!(
			"Resolved '{}' on host {} from {} (priority {})",
			name, host.host_id, winner.scope, winner.priority
		);
		Ok(Some(Resolved { parameter: winner }))
	}

	/// Effective value of every parameter name visible to `host`
	pub async fn resolve_all(&self, host: &HostContext) -> ClResult<BTreeMap<Box<str>, Resolved>> {
		let scopes = host.applicable_scopes();
		let params = self.adapter.list_by_scopes(&scopes).await?;

		let mut by_name: BTreeMap<Box<str>, Vec<Parameter>> = BTreeMap::new();
		for param in filter_applicable(params, &scopes) {
			by_name.entry(param.name.clone()).or_default().push(param);
		}

		let mut res = BTreeMap::new();
		for (name, candidates) in by_name {
			if let Some(winner) = select(host, &name, candidates)? {
				res.insert(name, Resolved { parameter: winner });
			}
		}
		debug!("Resolved {} parameter(s) on host {}", res.len(), host.host_id);
		Ok(res)
	}

	/// Every applicable override of `name`, winner first, followed by the
	/// overrides it shadows. Equal-priority overrides that cannot be ordered
	/// keep storage order.
	pub async fn explain(&self, host: &HostContext, name: &str) -> ClResult<Vec<Parameter>> {
		let scopes = host.applicable_scopes();
		let mut candidates = filter_applicable(
			self.adapter.find_all_by_name_across_scopes(name, &scopes).await?,
			&scopes,
		);
		candidates.sort_by(|a, b| precedence(host, a, b));
		Ok(candidates)
	}
}

fn filter_applicable(params: Vec<Parameter>, scopes: &[ScopeRef]) -> Vec<Parameter> {
	params.into_iter().filter(|param| scopes.contains(&param.scope)).collect()
}

/// Higher priority first; within host groups, nearest first
fn precedence(host: &HostContext, a: &Parameter, b: &Parameter) -> Ordering {
	b.priority.cmp(&a.priority).then_with(|| match (a.scope, b.scope) {
		(ScopeRef::HostGroup(ga), ScopeRef::HostGroup(gb)) => {
			host.host_group_rank(ga).cmp(&host.host_group_rank(gb))
		}
		_ => Ordering::Equal,
	})
}

/// Pick the single winning candidate
fn select(host: &HostContext, name: &str, candidates: Vec<Parameter>) -> ClResult<Option<Parameter>> {
	let Some(top) = candidates.iter().map(|p| p.priority).max() else {
		return Ok(None);
	};
	let mut tied: Vec<Parameter> = candidates.into_iter().filter(|p| p.priority == top).collect();
	if tied.len() == 1 {
		return Ok(tied.pop());
	}

	let ranks: Option<Vec<usize>> = tied
		.iter()
		.map(|param| match param.scope {
			ScopeRef::HostGroup(id) => host.host_group_rank(id),
			_ => None,
		})
		.collect();
	if let Some(ranks) = ranks {
		let nearest = ranks.iter().enumerate().min_by_key(|(_, rank)| **rank).map(|(i, _)| i);
		if let Some(i) = nearest {
			return Ok(Some(tied.swap_remove(i)));
		}
	}

	let scopes: Vec<ScopeRef> = tied.iter().map(|p| p.scope).collect();
	warn!("Ambiguous override for '{}' on host {}: {:?}", name, host.host_id, scopes);
	Err(Error::AmbiguousOverride { name: name.into(), scopes })
}


// vim: ts=4
