mod outbox;

pub use outbox::OutboxUploader;
