//! App builder - assembles adapters, codec and authorizer into an `App`

use std::sync::Arc;

use hostparam_types::auth_adapter::{AllowAll, Authorizer};
use hostparam_types::param_adapter::ParamAdapter;

use crate::codec::HiddenValueCodec;
use crate::config::CoreConfig;
use crate::parameter::{DeleteMode, ParameterService};
use crate::prelude::*;

pub struct AppBuilder {
	config: CoreConfig,
	param_adapter: Option<Arc<dyn ParamAdapter>>,
	authorizer: Option<Arc<dyn Authorizer>>,
	codec: Option<Arc<dyn HiddenValueCodec>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A subscriber installed by the embedding program wins
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder { config: CoreConfig::default(), param_adapter: None, authorizer: None, codec: None }
	}

	/// Builder seeded with `CoreConfig::from_env`
	pub fn from_env() -> ClResult<Self> {
		let mut builder = Self::new();
		builder.config(CoreConfig::from_env()?);
		Ok(builder)
	}

	pub fn config(&mut self, config: CoreConfig) -> &mut Self {
		self.config = config;
		self
	}
	pub fn strict_delete(&mut self, strict: bool) -> &mut Self {
		self.config.strict_delete = strict;
		self
	}
	pub fn param_adapter(&mut self, adapter: Arc<dyn ParamAdapter>) -> &mut Self {
		self.param_adapter = Some(adapter);
		self
	}
	pub fn authorizer(&mut self, authorizer: Arc<dyn Authorizer>) -> &mut Self {
		self.authorizer = Some(authorizer);
		self
	}
	pub fn codec(&mut self, codec: Arc<dyn HiddenValueCodec>) -> &mut Self {
		self.codec = Some(codec);
		self
	}

	pub fn build(&mut self) -> ClResult<App> {
		let adapter = self
			.param_adapter
			.take()
			.ok_or_else(|| Error::ConfigError("a parameter adapter is required".into()))?;
		let codec: Arc<dyn HiddenValueCodec> = match self.codec.take() {
			Some(codec) => codec,
			None => Arc::new(self.config.codec()?),
		};
		let authorizer = self.authorizer.take().unwrap_or_else(|| {
			warn!("No authorizer configured, every caller is allowed everything");
			Arc::new(AllowAll)
		});

		info!("hostparam ready (strict delete: {})", self.config.strict_delete);
		Ok(App {
			config: Arc::new(self.config.clone()),
			params: ParameterService::new(adapter, codec, authorizer),
		})
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Clone, Debug)]
pub struct App {
	pub config: Arc<CoreConfig>,
	pub params: ParameterService,
}

impl App {
	pub fn builder() -> AppBuilder {
		AppBuilder::new()
	}

	/// Delete mode selected by configuration
	pub fn delete_mode(&self) -> DeleteMode {
		if self.config.strict_delete { DeleteMode::Strict } else { DeleteMode::Lenient }
	}
}

// vim: ts=4
