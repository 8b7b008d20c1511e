// Boots one server per test binary on an ephemeral port.
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

static SERVER_URL: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Own thread and runtime so the server outlives each `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                arena_server::run(listener).await.expect("server failed");
            });
        });
        wait_until_ready(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_until_ready(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

// Websocket helpers shared by the session and name-check tests.
#[allow(dead_code)]
pub mod ws {
    use futures_util::{SinkExt, StreamExt};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

    pub type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

    // Upper bound for any single server reply in these tests.
    const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

    // Open a websocket to the shared test server.
    pub async fn connect() -> Ws {
        let base_url = super::ensure_server();
        let url = format!("{}/ws", base_url.replacen("http://", "ws://", 1));
        let (ws, _response) = connect_async(url).await.expect("websocket connect");
        ws
    }

    // Send one `{"type", "data"}` message.
    pub async fn send(ws: &mut Ws, msg: Value) {
        ws.send(Message::text(msg.to_string()))
            .await
            .expect("send message");
    }

    // Read frames until a JSON message with the given `type` arrives.
    pub async fn next_of_type(ws: &mut Ws, ty: &str) -> Value {
        tokio::time::timeout(REPLY_TIMEOUT, async {
            loop {
                let msg = ws
                    .next()
                    .await
                    .expect("stream ended")
                    .expect("websocket error");
                if !msg.is_text() {
                    continue;
                }
                let value: Value =
                    serde_json::from_str(msg.to_text().expect("text frame")).expect("json");
                if value["type"] == ty {
                    return value;
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("no {ty} message in time"))
    }

    // Wait for the server to close the socket and return the close code, if one was sent.
    pub async fn close_code(ws: &mut Ws) -> Option<u16> {
        tokio::time::timeout(REPLY_TIMEOUT, async {
            loop {
                match ws.next().await {
                    Some(Ok(Message::Close(frame))) => return frame.map(|f| u16::from(f.code)),
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => return None,
                }
            }
        })
        .await
        .expect("server should close the socket")
    }

    // Connect, consume the map, join and return the assigned player id.
    pub async fn join(name: &str, kit: &str) -> (Ws, u64) {
        let mut ws = connect().await;
        next_of_type(&mut ws, "MapData").await;
        send(&mut ws, json!({"type": "Join", "data": {"name": name, "kit": kit}})).await;
        let identity = next_of_type(&mut ws, "Identity").await;
        let player_id = identity["data"]["player_id"]
            .as_u64()
            .expect("numeric player id");
        (ws, player_id)
    }
}
