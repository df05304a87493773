use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::session::ConnectionSession;

/// Simple WebSocket abstraction - all we care about is send/receive
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Receive the next text message from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Handler for incoming WebSocket messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle an incoming message; may bind or rebind the session
    async fn handle_message(&self, session: &mut ConnectionSession, message: String);

    /// Called once after the socket has gone away
    async fn handle_disconnect(&self, session: &ConnectionSession);
}

#[derive(Debug)]
pub enum SocketError {
    ConnectionClosed,
    SendFailed(String),
    ReceiveFailed(String),
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // Binary/ping/pong carry nothing for us
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Connection represents a managed WebSocket connection.
/// Outbound frames arrive on the receiver half of the session's channel,
/// either from the connection manager or written directly by the handler.
pub struct Connection {
    session: ConnectionSession,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        socket: Box<dyn SocketWrapper>,
        message_handler: Arc<dyn MessageHandler>,
    ) -> Self {
        let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
        Self {
            session: ConnectionSession::new(outbound_sender),
            socket,
            outbound_receiver,
            message_handler,
        }
    }

    /// Run the connection until the client goes away, then hand the final
    /// session to the disconnect hook
    pub async fn run(mut self) -> Result<(), SocketError> {
        let result = self.pump().await;
        let _ = self.socket.close().await;
        self.message_handler.handle_disconnect(&self.session).await;
        result
    }

    async fn pump(&mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                // Outbound (app -> client)
                msg = self.outbound_receiver.recv() => {
                    match msg {
                        Some(message) => self.socket.send_message(message).await?,
                        None => return Err(SocketError::ConnectionClosed),
                    }
                }

                // Inbound (client -> app)
                msg = self.socket.receive_message() => {
                    match msg? {
                        Some(message) => {
                            self.message_handler
                                .handle_message(&mut self.session, message)
                                .await;
                        }
                        None => return Ok(()),
                    }
                }
            }
        }
    }
}
