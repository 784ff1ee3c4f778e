use async_trait::async_trait;
use interfaces::{Credentials, DeliveryError, DigestSink, RenderedDigest};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::{Credentials as SmtpCredentials, DEFAULT_MECHANISMS};
use lettre::transport::smtp::client::{AsyncSmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::transport::smtp::Error as SmtpError;
use lettre::Message;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_SMTP_URI: &str = "smtp://smtp.gmail.com:587";
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(300);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum SmtpConfigError {
    #[error("Invalid SMTP URI '{uri}': {message}")]
    InvalidUri { uri: String, message: String },

    #[error("Invalid {field} address '{address}': {message}")]
    InvalidAddress {
        field: &'static str,
        address: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS.
    StartTls,
    /// TLS from the first byte (SMTPS).
    Wrapper,
    /// No encryption. Only for local test servers.
    None,
}

impl TlsMode {
    fn default_port(self) -> u16 {
        match self {
            TlsMode::StartTls => 587,
            TlsMode::Wrapper => 465,
            TlsMode::None => 25,
        }
    }
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub tls: TlsMode,
    pub username: String,
    pub password: String,
    pub send_delay: Duration,
}

impl SmtpConfig {
    /// Parse the submission endpoint from a URI and take the login from the
    /// credentials file.
    /// Expected URI format: smtp://[username@]server[:port][?tls=starttls|wrapper|none]
    pub fn from_uri_and_credentials(uri: &str, credentials: &Credentials) -> Result<Self, SmtpConfigError> {
        let invalid = |message: String| SmtpConfigError::InvalidUri {
            uri: uri.to_string(),
            message,
        };

        let parsed_uri = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;

        let scheme_tls = match parsed_uri.scheme() {
            "smtp" => TlsMode::StartTls,
            "smtps" => TlsMode::Wrapper,
            other => return Err(invalid(format!("URI must use 'smtp://' or 'smtps://', got: {}", other))),
        };

        let server = parsed_uri
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| invalid("no server specified".to_string()))?
            .to_string();

        let tls = match parsed_uri.query_pairs().find(|(key, _)| key == "tls") {
            None => scheme_tls,
            Some((_, value)) => match value.as_ref() {
                "starttls" => TlsMode::StartTls,
                "wrapper" => TlsMode::Wrapper,
                "none" => TlsMode::None,
                other => return Err(invalid(format!("unknown tls mode: {}", other))),
            },
        };

        let port = parsed_uri.port().unwrap_or_else(|| tls.default_port());

        let username = match parsed_uri.username() {
            "" => credentials.sender.clone(),
            user => user.to_string(),
        };

        Ok(Self {
            server,
            port,
            tls,
            username,
            password: credentials.sender_secret.clone(),
            send_delay: DEFAULT_SEND_DELAY,
        })
    }

    pub fn with_send_delay(mut self, send_delay: Duration) -> Self {
        self.send_delay = send_delay;
        self
    }
}

/// Sends each digest as its own email to the single configured recipient.
pub struct SmtpMailer {
    config: SmtpConfig,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig, credentials: &Credentials) -> Result<Self, SmtpConfigError> {
        let from = parse_mailbox("sender", &credentials.sender)?;
        let to = parse_mailbox("recipient", &credentials.recipient)?;
        Ok(Self { config, from, to })
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    /// Multipart/alternative message with a single HTML part.
    pub fn build_message(&self, digest: &RenderedDigest) -> Result<Message, lettre::error::Error> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(digest.subject.as_str())
            .multipart(MultiPart::alternative().singlepart(SinglePart::html(digest.html_body.clone())))
    }

    /// Connect, secure and log in. The returned session is closed by the caller.
    async fn open_session(&self) -> Result<AsyncSmtpConnection, SmtpError> {
        let hello = ClientId::default();
        let server = (self.config.server.as_str(), self.config.port);
        let (wrapper_tls, starttls) = match self.config.tls {
            TlsMode::StartTls => (None, Some(TlsParameters::new(self.config.server.clone())?)),
            TlsMode::Wrapper => (Some(TlsParameters::new(self.config.server.clone())?), None),
            TlsMode::None => (None, None),
        };

        let mut session =
            AsyncSmtpConnection::connect_tokio1(server, Some(CONNECT_TIMEOUT), &hello, wrapper_tls, None).await?;

        if let Some(parameters) = starttls {
            if let Err(e) = session.starttls(parameters, &hello).await {
                session.abort().await;
                return Err(e);
            }
        }

        let credentials = SmtpCredentials::new(self.config.username.clone(), self.config.password.clone());
        if let Err(e) = session.auth(DEFAULT_MECHANISMS, &credentials).await {
            session.abort().await;
            return Err(e);
        }

        Ok(session)
    }

    async fn send_batch(
        &self,
        session: &mut AsyncSmtpConnection,
        digests: &[RenderedDigest],
    ) -> Result<usize, DeliveryError> {
        for (index, digest) in digests.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.send_delay).await;
            }

            let send_error = |message: String| DeliveryError::Send {
                index,
                subject: digest.subject.clone(),
                message,
            };

            let message = self.build_message(digest).map_err(|e| send_error(e.to_string()))?;
            session
                .send(message.envelope(), &message.formatted())
                .await
                .map_err(|e| send_error(e.to_string()))?;

            info!(to = %self.to, subject = %digest.subject, "Email sent");
        }

        Ok(digests.len())
    }
}

fn parse_mailbox(field: &'static str, address: &str) -> Result<Mailbox, SmtpConfigError> {
    address.parse().map_err(|e: lettre::address::AddressError| SmtpConfigError::InvalidAddress {
        field,
        address: address.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl DigestSink for SmtpMailer {
    fn sink_name(&self) -> String {
        format!("smtp://{}:{}", self.config.server, self.config.port)
    }

    async fn deliver(&mut self, digests: &[RenderedDigest]) -> Result<usize, DeliveryError> {
        // Connect and log in before anything is sent.
        let mut session = self
            .open_session()
            .await
            .map_err(|e| DeliveryError::Setup(format!("Login to {} failed: {}", self.config.server, e)))?;
        debug!("Connected to {}:{}", self.config.server, self.config.port);

        let result = self.send_batch(&mut session, digests).await;

        // Sends QUIT unless the session already broke, then closes the socket.
        session.abort().await;
        debug!("Closed connection to {}", self.config.server);

        result
    }
}
