//! Shared test helpers: an in-memory parameter adapter and service setup

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hostparam_core::codec::ChaChaCodec;
use hostparam_core::parameter::{CreateParameter, ParameterService};
use hostparam_core::resolver::Resolver;
use hostparam_types::auth_adapter::{AllowAll, Authorizer, Caller};
use hostparam_types::param_adapter::{
	ListOrder, ListParameterOptions, NewParameter, ParamAdapter, UpdateParameterData,
};
use hostparam_types::prelude::*;
use hostparam_types::types::Parameter;

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

#[derive(Debug, Default)]
struct State {
	next_id: i64,
	rows: BTreeMap<ParamId, Parameter>,
}

/// Keeps parameters in a map; uniqueness is checked under the same lock as the insert
#[derive(Debug, Default)]
pub struct MemoryAdapter {
	state: Mutex<State>,
	unavailable: AtomicBool,
}

impl MemoryAdapter {
	/// Stored form of a parameter, bypassing the service
	pub fn raw(&self, param_id: ParamId) -> Option<Parameter> {
		self.state.lock().rows.get(&param_id).cloned()
	}

	/// Make every further call fail as if the backend went away
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::SeqCst);
	}

	fn check(&self) -> ClResult<()> {
		if self.unavailable.load(Ordering::SeqCst) { Err(Error::StorageUnavailable) } else { Ok(()) }
	}
}

fn sort(params: &mut [Parameter], order: ListOrder) {
	match order {
		ListOrder::Name => params.sort_by(|a, b| a.name.cmp(&b.name).then(a.param_id.cmp(&b.param_id))),
		ListOrder::Priority => {
			params.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.name.cmp(&b.name)));
		}
		ListOrder::Id => params.sort_by_key(|p| p.param_id),
	}
}

#[async_trait]
impl ParamAdapter for MemoryAdapter {
	async fn read_parameter(&self, param_id: ParamId) -> ClResult<Parameter> {
		self.check()?;
		self.state.lock().rows.get(&param_id).cloned().ok_or(Error::NotFound)
	}

	async fn find_by_scope(&self, scope: &ScopeRef, name: &str) -> ClResult<Option<Parameter>> {
		self.check()?;
		let state = self.state.lock();
		Ok(state.rows.values().find(|p| p.scope == *scope && p.name.as_ref() == name).cloned())
	}

	async fn find_all_by_name_across_scopes(
		&self,
		name: &str,
		scopes: &[ScopeRef],
	) -> ClResult<Vec<Parameter>> {
		self.check()?;
		let state = self.state.lock();
		Ok(state
			.rows
			.values()
			.filter(|p| p.name.as_ref() == name && scopes.contains(&p.scope))
			.cloned()
			.collect())
	}

	async fn list_by_scopes(&self, scopes: &[ScopeRef]) -> ClResult<Vec<Parameter>> {
		self.check()?;
		let mut res: Vec<Parameter> = self
			.state
			.lock()
			.rows
			.values()
			.filter(|p| scopes.contains(&p.scope))
			.cloned()
			.collect();
		sort(&mut res, ListOrder::Name);
		Ok(res)
	}

	async fn list_parameters(&self, opts: &ListParameterOptions) -> ClResult<Vec<Parameter>> {
		self.check()?;
		let mut res: Vec<Parameter> = self
			.state
			.lock()
			.rows
			.values()
			.filter(|p| opts.scope.is_none_or(|scope| p.scope == scope))
			.filter(|p| opts.name.as_deref().is_none_or(|name| p.name.as_ref() == name))
			.cloned()
			.collect();
		sort(&mut res, opts.order);
		Ok(res)
	}

	async fn insert_parameter(&self, param: &NewParameter<'_>) -> ClResult<Parameter> {
		self.check()?;
		let mut state = self.state.lock();
		if state.rows.values().any(|p| p.scope == param.scope && p.name.as_ref() == param.name) {
			return Err(Error::DuplicateName { name: param.name.into(), scope: param.scope });
		}
		state.next_id += 1;
		let param_id = ParamId(state.next_id);
		let now = Timestamp::now();
		let row = Parameter {
			param_id,
			name: param.name.into(),
			value: param.value.into(),
			scope: param.scope,
			priority: param.priority,
			hidden: param.hidden,
			created_at: now,
			updated_at: now,
		};
		state.rows.insert(param_id, row.clone());
		Ok(row)
	}

	async fn update_parameter(
		&self,
		param_id: ParamId,
		data: &UpdateParameterData<'_>,
	) -> ClResult<Parameter> {
		self.check()?;
		let mut state = self.state.lock();
		let row = state.rows.get_mut(&param_id).ok_or(Error::NotFound)?;
		row.value = data.value.into();
		row.hidden = data.hidden;
		row.updated_at = Timestamp::now();
		Ok(row.clone())
	}

	async fn delete_parameter(&self, param_id: ParamId) -> ClResult<bool> {
		self.check()?;
		Ok(self.state.lock().rows.remove(&param_id).is_some())
	}

	async fn delete_by_scope(&self, scope: &ScopeRef) -> ClResult<u64> {
		self.check()?;
		let mut state = self.state.lock();
		let before = state.rows.len();
		state.rows.retain(|_, p| p.scope != *scope);
		Ok((before - state.rows.len()) as u64)
	}
}

pub struct TestEnv {
	pub adapter: Arc<MemoryAdapter>,
	pub service: ParameterService,
}

impl TestEnv {
	/// Bare resolver over the same adapter; hands out stored values
	pub fn resolver(&self) -> Resolver {
		Resolver::new(self.adapter.clone())
	}

	/// A second service on the same adapter, sealing with another key
	pub fn service_with_key(&self, key: [u8; 32]) -> ParameterService {
		let codec = Arc::new(ChaChaCodec::new("test", key).unwrap());
		ParameterService::new(self.adapter.clone(), codec, Arc::new(AllowAll))
	}
}

pub fn test_env() -> TestEnv {
	test_env_with(Arc::new(AllowAll))
}

pub fn test_env_with(authorizer: Arc<dyn Authorizer>) -> TestEnv {
	setup_test_logging();
	let adapter = Arc::new(MemoryAdapter::default());
	let codec = Arc::new(ChaChaCodec::new("test", [42u8; 32]).unwrap());
	let service = ParameterService::new(adapter.clone(), codec, authorizer);
	TestEnv { adapter, service }
}

pub fn admin() -> Caller {
	Caller::system()
}

pub fn new_param(name: &str, value: &str, scope: ScopeRef) -> CreateParameter {
	CreateParameter { name: name.into(), value: value.into(), scope, hidden: false }
}

pub fn hidden_param(name: &str, value: &str, scope: ScopeRef) -> CreateParameter {
	CreateParameter { name: name.into(), value: value.into(), scope, hidden: true }
}

// vim: ts=4
