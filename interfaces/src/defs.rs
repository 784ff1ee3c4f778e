use async_trait::async_trait;

/// Mail account details read from the credentials file.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub recipient: String,
    pub sender: String,
    pub sender_secret: String,
}

// Keep the secret out of logs and panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("recipient", &self.recipient)
            .field("sender", &self.sender)
            .field("sender_secret", &"***")
            .finish()
    }
}

/// One digest, ready to hand to a sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDigest {
    pub feed_url: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery setup failed: {0}")]
    Setup(String),

    #[error("failed to deliver digest #{index} ({subject}): {message}")]
    Send {
        index: usize,
        subject: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Object style note:
// A sink receives the whole batch of a run at once. It either hands every
// digest over and returns Ok, or stops at the first failure and returns Err.
// Callers only record fingerprints after an Ok, so a sink must never report
// success for a partially delivered batch.

/// Destination for the digests produced by one run.
#[async_trait]
pub trait DigestSink: Send {
    /// Short name used in logs.
    fn sink_name(&self) -> String;

    /// Deliver every digest in order. Returns how many were delivered.
    async fn deliver(&mut self, digests: &[RenderedDigest]) -> Result<usize, DeliveryError>;
}
