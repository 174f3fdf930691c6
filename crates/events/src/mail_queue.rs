//! Bounded hand-off of welcome emails to a background worker.
//!
//! Request handlers call [`MailQueue::enqueue`], which never waits: when the
//! queue is full the message is dropped with a warning. A single
//! [`MailWorker`] drains the queue and delivers each message once. Delivery
//! failures are logged and not retried.

use serde::Serialize;
use sgp_core::roles::AccountKind;
use tokio::sync::mpsc;

use crate::delivery::email::EmailDelivery;

/// Default number of messages the queue holds before dropping.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Welcome email for a freshly created account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeMail {
    pub to: String,
    pub name: String,
    pub kind: AccountKind,
}

impl WelcomeMail {
    pub fn new(to: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            to: to.into(),
            name: name.into(),
            kind,
        }
    }

    pub fn subject(&self) -> String {
        "Cadastro realizado com sucesso".to_string()
    }

    pub fn body(&self) -> String {
        let profile = match self.kind {
            AccountKind::Student => "aluno",
            AccountKind::Professor => "professor",
        };
        format!(
            "Olá, {}!\n\nSeu cadastro como {profile} no Sistema de Gestão de Projetos foi \
             concluído. Acesse com o e-mail {}.",
            self.name, self.to
        )
    }
}

/// Producer side of the welcome-mail queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MailQueue {
    sender: mpsc::Sender<WelcomeMail>,
}

/// Consumer side of the welcome-mail queue.
#[derive(Debug)]
pub struct MailWorker {
    receiver: mpsc::Receiver<WelcomeMail>,
}

impl MailQueue {
    /// Create a queue holding at most `capacity` pending messages.
    pub fn new(capacity: usize) -> (Self, MailWorker) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, MailWorker { receiver })
    }

    /// Queue `mail` without waiting. Returns `false` when it was dropped.
    pub fn enqueue(&self, mail: WelcomeMail) -> bool {
        match self.sender.try_send(mail) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(mail)) => {
                tracing::warn!(to = %mail.to, "Mail queue full, welcome email dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(mail)) => {
                tracing::warn!(to = %mail.to, "Mail worker stopped, welcome email dropped");
                false
            }
        }
    }
}

impl MailWorker {
    /// Drain the queue until every [`MailQueue`] handle is dropped.
    ///
    /// With `delivery` set to `None` (SMTP not configured) messages are
    /// consumed and discarded.
    pub async fn run(mut self, delivery: Option<EmailDelivery>) {
        if delivery.is_none() {
            tracing::info!("SMTP not configured, welcome emails are disabled");
        }
        while let Some(mail) = self.receiver.recv().await {
            let Some(delivery) = delivery.as_ref() else {
                tracing::debug!(to = %mail.to, "Welcome email skipped");
                continue;
            };
            if let Err(e) = delivery.deliver(&mail).await {
                tracing::error!(error = %e, to = %mail.to, "Failed to send welcome email");
            }
        }
        tracing::info!("Mail queue closed, worker shutting down");
    }
}
