#![doc = include_str!("README.md")]
mod config;
mod error;
mod outcome;
mod request;
mod runner;
mod transport;

pub use config::{
    parse_endpoint_options, EndpointOptions, RunnerSettings, API_HOST_ENV, DEFAULT_API_HOST,
    GRAPHQL_PATH,
};
pub use error::{
    already_submitting, internal_error, invalid_argument, network_error, permission_denied,
    unauthenticated, MutationError, MutationErrorCode, MutationResult,
};
pub use outcome::{
    classify, domain_error_message, transport_error_message, Classification, DomainError,
    GENERIC_ERROR_MESSAGE, PERMISSION_DENIED_MESSAGE,
};
pub use request::{DependentRead, MutationInvocation, MutationRequest, DEFAULT_DISPATCH_DELAY};
pub use runner::{
    MutationContinuation, MutationRunner, RunCancellation, RunOutcome, SubmittingListener,
};
pub use transport::{
    GraphQlClient, GraphQlMutation, GraphQlReadRefresher, MutationTransport, NoopReadRefresher,
    ReadRefresher,
};
