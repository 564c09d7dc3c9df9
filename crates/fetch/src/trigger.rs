/// Reason an invocation was started, used for logging and spawn metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
	/// Explicit `execute`/`trigger` call from the consumer.
	Manual,
	/// First run when the fetcher is activated with `immediate` set.
	Activation,
	/// Re-run after a reactive dependency changed.
	Dependency,
}

impl Trigger {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Manual => "manual",
			Self::Activation => "activation",
			Self::Dependency => "dependency",
		}
	}
}
