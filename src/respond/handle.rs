use super::config::ResponderConfig;
use crate::{errors::ShutdownError, message::Identity};
use std::sync::{Arc, RwLock};

pub(super) struct ResponderHandleInner {
	pub(super) config: Arc<RwLock<ResponderConfig>>,
	pub(super) thread: std::thread::JoinHandle<Result<(), std::io::Error>>,
	pub(super) shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

pub(super) struct ResponderHandleDrop(pub(super) Option<ResponderHandleInner>);
impl ResponderHandleDrop {
	fn shutdown(&mut self) -> Result<(), ShutdownError> {
		let ResponderHandleInner {
			thread, shutdown_tx, ..
		} = match self.0.take() {
			Some(inner) => inner,
			None => return Ok(()),
		};

		if !thread.is_finished() {
			shutdown_tx.send(()).ok();
		}

		match thread.join() {
			Ok(Ok(_)) => Ok(()),
			Ok(Err(err)) => Err(ShutdownError::IoError(err)),
			Err(_) => Err(ShutdownError::ThreadPanic),
		}
	}
}
impl Drop for ResponderHandleDrop {
	fn drop(&mut self) {
		if let Err(ShutdownError::ThreadPanic) = self.shutdown() {
			panic!("responder loop thread panicked");
		}
	}
}

/// Controls a responder running on a background thread.
///
/// The advertised capability list can be changed while the loop runs; the
/// next reply uses the updated announcement. Dropping the handle shuts the
/// loop down.
pub struct ResponderHandle(pub(super) ResponderHandleDrop);
impl ResponderHandle {
	#[inline(always)]
	fn with_config<F, R>(&self, handle: F) -> Option<R>
	where
		F: FnOnce(&RwLock<ResponderConfig>) -> R,
	{
		let config = match self.0 .0.as_ref() {
			Some(inner) => &inner.config,
			None => return None,
		};

		Some(handle(config))
	}

	pub fn shutdown(mut self) -> Result<(), ShutdownError> {
		let res = self.0.shutdown();
		std::mem::forget(self.0);
		res
	}

	/// Appends a skill to a server identity's advertised list.
	pub fn add_skill(&self, skill: impl Into<String>) {
		self.with_config(|config| config.write().unwrap().add_skill(skill.into()));
	}

	/// Removes every occurrence of the skill, reporting whether any was
	/// found.
	pub fn remove_skill(&self, skill: &str) -> bool {
		self.with_config(|config| config.write().unwrap().remove_skill(skill))
			.unwrap_or(false)
	}

	/// Replaces the advertised skill list, making the identity a server.
	pub fn set_skills<I, S>(&self, skills: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let skills = skills.into_iter().map(Into::into).collect();
		self.with_config(|config| config.write().unwrap().set_skills(skills));
	}

	/// Replaces the announced identity.
	pub fn set_identity(&self, identity: Identity) {
		self.with_config(|config| config.write().unwrap().set_identity(identity));
	}
}
