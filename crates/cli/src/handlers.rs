use styx_service::MessageHandler;

/// Answers version negotiation and refuses everything else.
///
/// There is no file tree behind it; it exists so the transport can be
/// exercised end to end.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Handler {
    max_message_size: u32,
}

impl Handler {
    pub fn new(max_message_size: u32) -> Self {
        Self { max_message_size }
    }
}

impl MessageHandler for Handler {
    fn max_message_size(&self) -> u32 {
        self.max_message_size
    }
}
