use std::error::Error;
use std::sync::Arc;

use datacatalog_client::error_catalog::{CatalogCache, CatalogLoader, StaticCatalogSource};
use datacatalog_client::mutation::{
    DependentRead, EndpointOptions, GraphQlClient, GraphQlMutation, GraphQlReadRefresher,
    MutationContinuation, MutationRequest, MutationRunner, RunOutcome,
};
use datacatalog_client::notification::ChannelNotificationSink;
use serde_json::{json, Value};

const EN: &str = "\
errors:
  Datastore:
    name:
      required: Give the datastore a name.
      taken: Another datastore already uses this name.
";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Point DATACATALOG_API_HOST at a local API, e.g. http://localhost:8080
    let client = GraphQlClient::new(EndpointOptions::from_env()?);
    let rename = GraphQlMutation::new(
        client.clone(),
        "mutation RenameDatastore($id: ID!, $name: String!) { \
         renameDatastore(id: $id, name: $name) { datastore { id name } errors { resource field code } } }",
    )?;

    let catalog = CatalogLoader::new(
        Arc::new(StaticCatalogSource::new().with_document("en", EN)),
        CatalogCache::new(),
    );
    let (sink, notifications) = ChannelNotificationSink::new();
    let runner = MutationRunner::new(
        Arc::new(rename),
        Arc::new(GraphQlReadRefresher::new(client)),
        catalog,
        Arc::new(sink),
    );

    let request = MutationRequest::new(json!({ "id": "ds_42", "name": "warehouse" }))
        .with_success_message("Datastore renamed.")
        .with_dependent_read(DependentRead::new(
            "query Datastores { datastores { id name } }",
            Value::Object(Default::default()),
        ));

    let on_settled: MutationContinuation = Box::new(|payload: &Value| {
        println!("settled payload: {payload}");
    });
    let outcome = runner.run(request, Some(on_settled)).await?;

    while let Ok(notification) = notifications.try_recv() {
        println!("[{}] {}", notification.severity, notification.message);
    }
    if let RunOutcome::DomainError { errors, .. } = outcome {
        println!("{} domain error(s) reported", errors.len());
    }
    Ok(())
}
