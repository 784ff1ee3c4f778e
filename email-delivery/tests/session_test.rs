use email_delivery::{SmtpConfig, SmtpMailer};
use interfaces::{DeliveryError, DigestSink};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

mod common;
use common::{init_tracing, sample_digests, test_credentials};

/// What the scripted server saw during one run.
struct Session {
    commands: Vec<String>,
    second_connection: bool,
}

#[derive(Default, Clone, Copy)]
struct Script {
    reject_auth: bool,
    /// Zero-based message whose data is refused.
    reject_message: Option<usize>,
}

/// Minimal plaintext SMTP server that serves a single session and records
/// the verbs it received.
async fn start_server(script: Script) -> (u16, JoinHandle<Session>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut commands = Vec::new();
        let mut in_data = false;
        let mut messages = 0;

        write.write_all(b"220 localhost ESMTP\r\n").await.unwrap();

        while let Some(line) = lines.next_line().await.unwrap() {
            if in_data {
                if line == "." {
                    in_data = false;
                    let reply: &[u8] = if script.reject_message == Some(messages) {
                        b"554 5.7.1 Message rejected\r\n"
                    } else {
                        b"250 2.0.0 Queued\r\n"
                    };
                    messages += 1;
                    write.write_all(reply).await.unwrap();
                }
                continue;
            }

            let verb = line.split_whitespace().next().unwrap_or_default().to_ascii_uppercase();
            commands.push(verb.clone());
            let reply: &[u8] = match verb.as_str() {
                "EHLO" => b"250-localhost\r\n250-AUTH PLAIN LOGIN\r\n250 8BITMIME\r\n",
                "AUTH" if script.reject_auth => b"535 5.7.8 Authentication failed\r\n",
                "AUTH" => b"235 2.7.0 Authentication successful\r\n",
                "DATA" => {
                    in_data = true;
                    b"354 End data with <CR><LF>.<CR><LF>\r\n"
                }
                "QUIT" => {
                    write.write_all(b"221 2.0.0 Bye\r\n").await.unwrap();
                    break;
                }
                _ => b"250 2.0.0 OK\r\n",
            };
            write.write_all(reply).await.unwrap();
        }

        let second_connection = tokio::time::timeout(Duration::from_millis(200), listener.accept())
            .await
            .is_ok();

        Session {
            commands,
            second_connection,
        }
    });

    (port, handle)
}

fn mailer_for(port: u16) -> SmtpMailer {
    let credentials = test_credentials();
    let uri = format!("smtp://127.0.0.1:{}?tls=none", port);
    let config = SmtpConfig::from_uri_and_credentials(&uri, &credentials)
        .unwrap()
        .with_send_delay(Duration::ZERO);
    SmtpMailer::new(config, &credentials).unwrap()
}

#[tokio::test]
async fn test_batch_uses_one_session_and_quits() {
    init_tracing();
    let (port, server) = start_server(Script::default()).await;
    let mut mailer = mailer_for(port);

    let delivered = mailer.deliver(&sample_digests()).await.unwrap();
    assert_eq!(delivered, 2);

    let session = server.await.unwrap();
    assert_eq!(
        session.commands,
        vec!["EHLO", "AUTH", "MAIL", "RCPT", "DATA", "MAIL", "RCPT", "DATA", "QUIT"]
    );
    assert!(!session.second_connection);
}

#[tokio::test]
async fn test_rejected_login_is_setup_error_and_quits() {
    init_tracing();
    let (port, server) = start_server(Script {
        reject_auth: true,
        ..Default::default()
    })
    .await;
    let mut mailer = mailer_for(port);

    let err = mailer.deliver(&sample_digests()).await.unwrap_err();
    assert!(matches!(err, DeliveryError::Setup(_)));

    let session = server.await.unwrap();
    assert_eq!(session.commands, vec!["EHLO", "AUTH", "QUIT"]);
}

#[tokio::test]
async fn test_rejected_message_stops_batch_and_quits() {
    init_tracing();
    let (port, server) = start_server(Script {
        reject_message: Some(0),
        ..Default::default()
    })
    .await;
    let mut mailer = mailer_for(port);

    let err = mailer.deliver(&sample_digests()).await.unwrap_err();
    assert!(matches!(err, DeliveryError::Send { index: 0, .. }));

    let session = server.await.unwrap();
    assert_eq!(session.commands, vec!["EHLO", "AUTH", "MAIL", "RCPT", "DATA", "QUIT"]);
    assert!(!session.second_connection);
}
