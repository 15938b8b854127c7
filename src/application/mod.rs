//! Application layer: services orchestrating the ports.

mod collections;
mod payments;
mod webhooks;

pub use collections::CollectionService;
pub use payments::{
    CreatePaymentCommand, CreateQrSessionCommand, IssuedPayment, IssuedQrSession, PaymentService,
};
pub use webhooks::{PreflightDecision, WebhookAck, WebhookService};
