//! Integration tests for the WebSocket client connection.
//!
//! These spin up a real tokio-tungstenite server on a random local port
//! and check that frames, the token query and close frames actually
//! cross the network.

#[cfg(feature = "websocket")]
mod websocket {
    use broadside_transport::{Connection, TransportError, WebSocketConnection};
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::handshake::server::{
        ErrorResponse, Request, Response,
    };

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Helper: binds a listener on a random port and accepts one
    /// WebSocket client, reporting the request URI it was opened with.
    async fn one_shot_server() -> (
        String,
        tokio::task::JoinHandle<(ServerWs, String)>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("local addr");

        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("should accept");
            let (uri_tx, uri_rx) = oneshot::channel();
            let ws = tokio_tungstenite::accept_hdr_async(
                stream,
                move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    let _ = uri_tx.send(req.uri().to_string());
                    Ok(resp)
                },
            )
            .await
            .expect("handshake should succeed");
            let uri = uri_rx.await.expect("uri captured");
            (ws, uri)
        });

        (format!("ws://{addr}"), handle)
    }

    #[tokio::test]
    async fn test_connect_sends_token_as_query_parameter() {
        let (endpoint, server) = one_shot_server().await;

        let conn = WebSocketConnection::connect(&endpoint, "secret-token")
            .await
            .expect("should connect");
        let (_ws, uri) = server.await.expect("server task");

        assert_eq!(uri, "/?token=secret-token");
        assert!(conn.is_open());
        assert!(conn.id().into_inner() > 0);
    }

    #[tokio::test]
    async fn test_send_and_receive_text_frames() {
        let (endpoint, server) = one_shot_server().await;
        let conn = WebSocketConnection::connect(&endpoint, "t")
            .await
            .expect("should connect");
        let (mut server_ws, _) = server.await.unwrap();

        // --- Client sends, server receives ---
        conn.send(r#"{"type":"join_queue"}"#).await.expect("send");
        let msg = server_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"join_queue"}"#);

        // --- Server sends, client receives ---
        server_ws
            .send(Message::Text(r#"{"type":"start_game"}"#.to_string().into()))
            .await
            .unwrap();
        let received = conn.recv().await.expect("recv").expect("a frame");
        assert_eq!(received, r#"{"type":"start_game"}"#);
    }

    #[tokio::test]
    async fn test_recv_returns_none_when_server_closes() {
        let (endpoint, server) = one_shot_server().await;
        let conn = WebSocketConnection::connect(&endpoint, "t")
            .await
            .expect("should connect");
        let (mut server_ws, _) = server.await.unwrap();

        server_ws.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on server close");
        assert!(!conn.is_open());
    }

    #[tokio::test]
    async fn test_close_sends_close_frame_and_is_idempotent() {
        let (endpoint, server) = one_shot_server().await;
        let conn = WebSocketConnection::connect(&endpoint, "t")
            .await
            .expect("should connect");
        let (mut server_ws, _) = server.await.unwrap();

        conn.close("Leaving queue").await.expect("first close");
        conn.close("again").await.expect("second close is a no-op");
        assert!(!conn.is_open());

        match server_ws.next().await {
            Some(Ok(Message::Close(Some(frame)))) => {
                assert_eq!(frame.reason.as_str(), "Leaving queue");
            }
            other => panic!("expected close frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_after_close_returns_connection_closed() {
        let (endpoint, server) = one_shot_server().await;
        let conn = WebSocketConnection::connect(&endpoint, "t")
            .await
            .expect("should connect");
        let _server = server.await.unwrap();

        conn.close("done").await.unwrap();
        let result = conn.send("{}").await;
        assert!(matches!(result, Err(TransportError::ConnectionClosed(_))));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result =
            WebSocketConnection::connect(&format!("ws://{addr}"), "t").await;
        assert!(matches!(result, Err(TransportError::ConnectFailed(_))));
    }
}
