//! Hidden value codec
//!
//! Values of hidden parameters are stored encoded and only decoded for callers
//! allowed to read them. The default codec seals values with
//! ChaCha20-Poly1305 under a process-wide key:
//!
//! ```text
//! enc:v1:<key_id>:<nonce>:<ciphertext>
//! ```
//!
//! Nonce and ciphertext are URL-safe base64 without padding.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chacha20poly1305::{ChaCha20Poly1305, KeyInit, Nonce, aead::Aead};
use rand::RngExt;
use zeroize::Zeroizing;

use crate::prelude::*;

const ENVELOPE_PREFIX: &str = "enc:v1:";
const KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;

pub trait HiddenValueCodec: std::fmt::Debug + Send + Sync {
	fn encode(&self, plain: &str) -> ClResult<Box<str>>;
	fn decode(&self, encoded: &str) -> ClResult<Box<str>>;
}

pub fn is_encoded(value: &str) -> bool {
	value.starts_with(ENVELOPE_PREFIX)
}

pub struct ChaChaCodec {
	key_id: Box<str>,
	key: Zeroizing<[u8; KEY_LENGTH]>,
}

impl std::fmt::Debug for ChaChaCodec {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ChaChaCodec").field("key_id", &self.key_id).finish_non_exhaustive()
	}
}

impl ChaChaCodec {
	pub fn new(key_id: impl Into<Box<str>>, key: [u8; KEY_LENGTH]) -> ClResult<Self> {
		let key_id = key_id.into();
		if key_id.is_empty() || key_id.contains(':') {
			return Err(Error::ConfigError(format!("invalid hidden value key id '{}'", key_id)));
		}
		Ok(Self { key_id, key: Zeroizing::new(key) })
	}

	/// Key given as base64 (URL-safe or standard alphabet)
	pub fn from_base64_key(key_id: impl Into<Box<str>>, encoded_key: &str) -> ClResult<Self> {
		let encoded_key = encoded_key.trim();
		let bytes = Zeroizing::new(
			URL_SAFE_NO_PAD
				.decode(encoded_key.as_bytes())
				.or_else(|_| base64::engine::general_purpose::STANDARD.decode(encoded_key))
				.map_err(|err| {
					Error::ConfigError(format!("hidden value key is not valid base64: {}", err))
				})?,
		);
		let key: [u8; KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
			Error::ConfigError(format!(
				"hidden value key must be {} bytes, got {}",
				KEY_LENGTH,
				bytes.len()
			))
		})?;
		Self::new(key_id, key)
	}

	/// Fresh random key. Values encoded with it do not survive a restart.
	pub fn generate(key_id: impl Into<Box<str>>) -> ClResult<Self> {
		let key: [u8; KEY_LENGTH] = rand::rng().random();
		Self::new(key_id, key)
	}

	pub fn key_id(&self) -> &str {
		&self.key_id
	}

	fn cipher(&self) -> ClResult<ChaCha20Poly1305> {
		ChaCha20Poly1305::new_from_slice(self.key.as_slice())
			.map_err(|err| Error::CodecError(format!("cipher init failed: {}", err)))
	}
}

impl HiddenValueCodec for ChaChaCodec {
	fn encode(&self, plain: &str) -> ClResult<Box<str>> {
		let nonce_bytes: [u8; NONCE_LENGTH] = rand::rng().random();
		let ciphertext = self
			.cipher()?
			.encrypt(Nonce::from_slice(&nonce_bytes), plain.as_bytes())
			.map_err(|err| Error::CodecError(format!("encrypt failed: {}", err)))?;

		Ok(format!(
			"{}{}:{}:{}",
			ENVELOPE_PREFIX,
			self.key_id,
			URL_SAFE_NO_PAD.encode(nonce_bytes),
			URL_SAFE_NO_PAD.encode(ciphertext)
		)
		.into())
	}

	fn decode(&self, encoded: &str) -> ClResult<Box<str>> {
		// Rows written before the value was hidden are still plain
		let Some(envelope) = encoded.strip_prefix(ENVELOPE_PREFIX) else {
			return Ok(encoded.into());
		};

		let mut parts = envelope.split(':');
		let (Some(key_id), Some(nonce_b64), Some(ciphertext_b64), None) =
			(parts.next(), parts.next(), parts.next(), parts.next())
		else {
			return Err(Error::CodecError("malformed hidden value envelope".into()));
		};
		if key_id != self.key_id.as_ref() {
			return Err(Error::CodecError(format!("hidden value key '{}' is not configured", key_id)));
		}

		let nonce = URL_SAFE_NO_PAD
			.decode(nonce_b64)
			.map_err(|err| Error::CodecError(format!("bad nonce: {}", err)))?;
		if nonce.len() != NONCE_LENGTH {
			return Err(Error::CodecError("bad nonce length".into()));
		}
		let ciphertext = URL_SAFE_NO_PAD
			.decode(ciphertext_b64)
			.map_err(|err| Error::CodecError(format!("bad payload: {}", err)))?;

		let plain = self
			.cipher()?
			.decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
			.map_err(|err| Error::CodecError(format!("decrypt failed: {}", err)))?;
		String::from_utf8(plain)
			.map(String::into_boxed_str)
			.map_err(|err| Error::CodecError(format!("plaintext is not utf-8: {}", err)))
	}
}


// vim: ts=4
