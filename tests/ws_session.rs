mod support;

use serde_json::json;
use support::ws;

fn unique_name() -> String {
    format!("p{}", &uuid::Uuid::new_v4().simple().to_string()[..10])
}

#[tokio::test]
async fn test_map_data_is_sent_before_join() {
    let mut socket = ws::connect().await;

    let map = ws::next_of_type(&mut socket, "MapData").await;

    assert_eq!(map["data"]["map_size"], 1600.0);
    let obstacles = map["data"]["obstacles"].as_array().expect("obstacles");
    assert!(!obstacles.is_empty() && obstacles.len() <= 30);
}

#[tokio::test]
async fn test_joined_player_appears_in_world_updates() {
    let name = unique_name();
    let (mut socket, player_id) = ws::join(&name, "sniper").await;

    let me = loop {
        let update = ws::next_of_type(&mut socket, "WorldUpdate").await;
        let players = update["data"]["players"].as_array().expect("players").clone();
        if let Some(me) = players.into_iter().find(|p| p["id"] == player_id) {
            break me;
        }
    };

    assert_eq!(me["name"], name.as_str());
    assert_eq!(me["kit"], "sniper");
    assert_eq!(me["hp"], 60.0);
    assert_eq!(me["invincible"], true);
}

#[tokio::test]
async fn test_unknown_kit_falls_back_to_default() {
    let (mut socket, player_id) = ws::join(&unique_name(), "railgun").await;

    let me = loop {
        let update = ws::next_of_type(&mut socket, "WorldUpdate").await;
        let players = update["data"]["players"].as_array().expect("players").clone();
        if let Some(me) = players.into_iter().find(|p| p["id"] == player_id) {
            break me;
        }
    };

    assert_eq!(me["kit"], "assault");
}

#[tokio::test]
async fn test_ping_is_echoed() {
    let (mut socket, _player_id) = ws::join(&unique_name(), "tank").await;

    ws::send(&mut socket, json!({"type": "Ping", "data": {"t": 12.5}})).await;
    let pong = ws::next_of_type(&mut socket, "Pong").await;

    assert_eq!(pong["data"]["t"], 12.5);
}

#[tokio::test]
async fn test_input_before_join_closes_connection() {
    let mut socket = ws::connect().await;
    ws::next_of_type(&mut socket, "MapData").await;

    ws::send(&mut socket, json!({"type": "Input", "data": {"up": true}})).await;

    assert_eq!(ws::close_code(&mut socket).await, Some(1008));
}

#[tokio::test]
async fn test_binary_frame_closes_with_unsupported() {
    use futures_util::SinkExt;
    use tokio_tungstenite::tungstenite::Message;

    let (mut socket, _player_id) = ws::join(&unique_name(), "assault").await;

    socket
        .send(Message::binary(vec![1u8, 2, 3]))
        .await
        .expect("send binary");

    assert_eq!(ws::close_code(&mut socket).await, Some(1003));
}
