//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Connection tests against a loopback RCON server

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use rconwatch_client::{ClientConfig, ClientError, Frame, PacketType, RconCodec, RconConnection};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Encoder, Framed};

const PASSWORD: &str = "hunter2";

/// How the fake server answers after a successful login
#[derive(Clone, Copy)]
enum Behavior {
    /// Echo a canned reply per command
    Reply,
    /// Prefix the auth response with an empty value frame
    SourceAuth,
    /// Answer commands with the wrong request id
    WrongId,
    /// Never answer commands
    Silent,
    /// Deliver each reply in two separate writes
    Fragmented,
}

fn reply_for(command: &str) -> &'static str {
    match command {
        "list" => "There are 1 of a max of 20 players online: Alice",
        "tps" => "§6TPS from last 1m, 5m, 15m: §a20.0, §a19.8, §a19.5",
        _ => "Unknown command",
    }
}

async fn spawn_server(behavior: Behavior) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        serve(socket, behavior).await;
    });

    addr
}

async fn serve(socket: TcpStream, behavior: Behavior) {
    let mut framed = Framed::new(socket, RconCodec::new());

    let Some(Ok(auth)) = framed.next().await else {
        return;
    };
    let id = if auth.body_text() == PASSWORD {
        auth.request_id
    } else {
        -1
    };
    if let Behavior::SourceAuth = behavior {
        framed
            .send(Frame::new(auth.request_id, PacketType::RESPONSE_VALUE, Bytes::new()))
            .await
            .unwrap();
    }
    if framed
        .send(Frame::new(id, PacketType::AUTH_RESPONSE, Bytes::new()))
        .await
        .is_err()
    {
        return;
    }

    while let Some(Ok(request)) = framed.next().await {
        let reply = Frame::new(
            request.request_id,
            PacketType::RESPONSE_VALUE,
            reply_for(&request.body_text()),
        );
        let sent = match behavior {
            Behavior::Reply | Behavior::SourceAuth => framed.send(reply).await.is_ok(),
            Behavior::WrongId => framed
                .send(Frame::new(request.request_id + 100, reply.packet_type, reply.body))
                .await
                .is_ok(),
            Behavior::Silent => true,
            Behavior::Fragmented => {
                let mut wire = bytes::BytesMut::new();
                RconCodec::new().encode(reply, &mut wire).unwrap();
                let (head, tail) = wire.split_at(wire.len() / 2);
                let socket = framed.get_mut();
                socket.write_all(head).await.unwrap();
                socket.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(50)).await;
                socket.write_all(tail).await.is_ok()
            }
        };
        if !sent {
            return;
        }
    }
}

fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new(addr.ip().to_string(), addr.port())
        .with_password(PASSWORD)
        .with_read_timeout(Some(Duration::from_millis(500)))
}

#[tokio::test]
async fn test_connect_and_execute() {
    let addr = spawn_server(Behavior::Reply).await;
    let mut conn = RconConnection::connect(&config_for(addr)).await.unwrap();

    assert!(conn.is_authenticated());
    assert_eq!(conn.address(), addr.to_string());
    assert_eq!(conn.execute("list").await.unwrap(), reply_for("list"));
    assert_eq!(conn.execute("tps").await.unwrap(), reply_for("tps"));

    conn.close().await;
}

#[tokio::test]
async fn test_wrong_password() {
    let addr = spawn_server(Behavior::Reply).await;
    let config = config_for(addr).with_password("not-it");

    let err = RconConnection::connect(&config).await.unwrap_err();
    assert!(matches!(err, ClientError::AuthFailed { .. }));
}

#[tokio::test]
async fn test_source_style_auth() {
    let addr = spawn_server(Behavior::SourceAuth).await;
    let mut conn = RconConnection::connect(&config_for(addr)).await.unwrap();
    assert_eq!(conn.execute("list").await.unwrap(), reply_for("list"));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = RconConnection::connect(&config_for(addr)).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_read_timeout() {
    let addr = spawn_server(Behavior::Silent).await;
    let config = config_for(addr).with_read_timeout(Some(Duration::from_millis(100)));
    let mut conn = RconConnection::connect(&config).await.unwrap();

    let err = conn.execute("list").await.unwrap_err();
    assert!(matches!(err, ClientError::ReadTimeout));
    assert!(!conn.is_authenticated());
}

#[tokio::test]
async fn test_mismatched_response_id() {
    let addr = spawn_server(Behavior::WrongId).await;
    let mut conn = RconConnection::connect(&config_for(addr)).await.unwrap();

    let err = conn.execute("list").await.unwrap_err();
    assert!(err.is_protocol());
    assert!(matches!(
        conn.execute("list").await.unwrap_err(),
        ClientError::NotConnected
    ));
}

#[tokio::test]
async fn test_fragmented_response_is_reassembled() {
    let addr = spawn_server(Behavior::Fragmented).await;
    let mut conn = RconConnection::connect(&config_for(addr)).await.unwrap();
    assert_eq!(conn.execute("tps").await.unwrap(), reply_for("tps"));
}
