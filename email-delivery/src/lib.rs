pub mod debug_writer;
pub mod smtp_mailer;

pub use debug_writer::DebugArtifactWriter;
pub use smtp_mailer::{SmtpConfig, SmtpConfigError, SmtpMailer, TlsMode, DEFAULT_SEND_DELAY, DEFAULT_SMTP_URI};
