use std::time::Duration;

use serde_json::Value;

/// Delay applied before dispatch when the request does not override it.
pub const DEFAULT_DISPATCH_DELAY: Duration = Duration::from_millis(500);

/// A read query whose cached result must be refreshed after the write.
#[derive(Clone, Debug, PartialEq)]
pub struct DependentRead {
    pub query: String,
    pub variables: Value,
}

impl DependentRead {
    pub fn new(query: impl Into<String>, variables: Value) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// Everything needed to run one write. Built fresh for every call.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationRequest {
    pub variables: Value,
    pub dependent_reads: Vec<DependentRead>,
    /// Shown on success; `None` succeeds silently.
    pub success_message: Option<String>,
    /// Minimum time between `run` and dispatch. Not a debounce: the write is
    /// always sent exactly once.
    pub dispatch_delay: Duration,
}

impl MutationRequest {
    pub fn new(variables: Value) -> Self {
        Self {
            variables,
            dependent_reads: Vec::new(),
            success_message: None,
            dispatch_delay: DEFAULT_DISPATCH_DELAY,
        }
    }

    pub fn with_dependent_read(mut self, read: DependentRead) -> Self {
        self.dependent_reads.push(read);
        self
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn silent(mut self) -> Self {
        self.success_message = None;
        self
    }

    pub fn with_dispatch_delay(mut self, delay: Duration) -> Self {
        self.dispatch_delay = delay;
        self
    }

    pub(crate) fn invocation(&self) -> MutationInvocation {
        MutationInvocation {
            variables: self.variables.clone(),
            dependent_reads: self.dependent_reads.clone(),
        }
    }
}

/// What the remote write receives: the request minus its UI concerns.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationInvocation {
    pub variables: Value,
    pub dependent_reads: Vec<DependentRead>,
}
