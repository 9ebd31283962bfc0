//! Channels demo binary
//!
//! Runs generated channel and channel-tag actions against an in-process socket
//! peer and prints the store after each step.

use channels_demo::{ChannelsReducer, ChannelsState};
use crud_actions_core::{ActionEnvironment, ActionsConfig, ConstructionError, HostConfig};
use crud_actions_runtime::transport::{
    Method, SocketAck, SocketChannel, SocketRequest, socket_channel,
};
use crud_actions_runtime::{AssociationActions, PrimaryActions, Store, Transport};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Stand-in API: answers like a small chat server would.
fn answer(request: &SocketRequest) -> SocketAck {
    let name = request.data.as_ref().and_then(|data| data.get("name"));

    match (request.method, request.url.as_str()) {
        (Method::Get, url) if url.ends_with("/tags") => {
            SocketAck::ok(json!([{"id": 7, "name": "rust"}]))
        }
        (Method::Get, _) => SocketAck::ok(json!([
            {"id": 1, "name": "general"},
            {"id": 2, "name": "random"},
        ])),
        (Method::Post, _) if name == Some(&json!("taken")) => {
            SocketAck::with_status(409, json!({"message": "channel name taken"}))
        }
        (Method::Post | Method::Put, _) => {
            SocketAck::ok(request.data.clone().unwrap_or_default())
        }
        (Method::Delete, _) => SocketAck::with_status(204, json!(null)),
    }
}

fn load_config() -> ActionsConfig {
    match ActionsConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::info!(error = %e, "No CRUD_ACTIONS_* configuration, using demo defaults");
            let mut config = ActionsConfig {
                host: HostConfig::new("ws://chat.local").with_prefix("api"),
                ..ActionsConfig::default()
            };
            config.transport.socket = true;
            config
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ConstructionError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "channels=debug,crud_actions_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Channels Demo: generated CRUD actions ===\n");

    let config = load_config();
    let (client, server) = socket_channel(16);
    let peer = tokio::spawn(server.serve(answer));

    let channel: Arc<dyn SocketChannel> = Arc::new(client);
    let transport = Transport::from_config(&config.transport, Some(channel))?;
    let env = ActionEnvironment::production();

    let channels = PrimaryActions::new("channel", &config.host, transport.clone(), env.clone())?;
    let channel_tags = AssociationActions::new("channel", "tag", &config.host, transport, env)?;

    let store = Arc::new(Store::new(
        ChannelsState::default(),
        ChannelsReducer::new(channels.types().clone()),
    ));

    println!(">>> findChannels()");
    store.run(channels.find_many(None)).await;
    println!("Channels: {:?}\n", store.state(|s| s.channels.clone()));

    println!(">>> createChannel({{name: \"help\"}})");
    let terminal = store.run(channels.create_one(json!({"name": "help"}))).await;
    println!("Finished with {}", terminal.action_type);
    println!("Channels: {}\n", store.state(|s| s.channels.len()));

    println!(">>> createChannel({{name: \"taken\"}})");
    let terminal = store.run(channels.create_one(json!({"name": "taken"}))).await;
    println!("Finished with {}", terminal.action_type);
    println!("Last error: {:?}\n", store.state(|s| s.last_error.clone()));

    println!(">>> findChannelTags(1)");
    let terminal = store.run(channel_tags.find_related(1)).await;
    println!("{}\n", terminal.to_value());

    println!(">>> addTagToChannel(1, {{id: 7}}) with tag 7 already linked");
    let terminal = store
        .run(channel_tags.add_related(1, json!({"id": 7}), &[json!({"id": 7})]))
        .await;
    println!("{}\n", terminal.to_value());

    println!(">>> destroyChannel({{id: 2}})");
    store.run(channels.destroy_one(json!({"id": 2}))).await;
    println!("Channels: {:?}", store.state(|s| s.channels.clone()));

    drop((channels, channel_tags));
    if let Err(e) = peer.await {
        tracing::warn!(error = %e, "Socket peer stopped abnormally");
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
