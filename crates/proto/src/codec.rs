use crate::{
    error::{Error, Result},
    framing::{encode_message, DecoderConfig, FrameDecoder},
    registry::Role,
    TaggedMessage,
};
use bytes::BytesMut;
use std::collections::VecDeque;
use tokio_util::codec::{Decoder, Encoder};

/// `tokio_util` codec backed by [`FrameDecoder`].
///
/// Every byte handed to `decode` goes straight into the state machine, so
/// the read buffer never holds more than the transport's last read.
/// Messages completed by one read are queued and handed out one per call.
#[derive(Debug)]
pub struct MessageCodec {
    decoder: FrameDecoder,
    ready: VecDeque<TaggedMessage>,
    failure: Option<Error>,
}

impl MessageCodec {
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self::with_config(DecoderConfig::new(role))
    }

    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            decoder: FrameDecoder::new(config),
            ready: VecDeque::new(),
            failure: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        self.decoder.config()
    }

    fn next_ready(&mut self) -> Result<Option<TaggedMessage>> {
        if let Some(message) = self.ready.pop_front() {
            return Ok(Some(message));
        }
        // messages completed before a violation are delivered first
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

impl Decoder for MessageCodec {
    type Item = TaggedMessage;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if !src.is_empty() && self.failure.is_none() {
            let chunk = src.split();
            let ready = &mut self.ready;
            if let Err(err) = self.decoder.feed(&chunk, |message| ready.push_back(message)) {
                self.failure = Some(err);
            }
        }
        self.next_ready()
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }
        self.decoder.finish()?;
        Ok(None)
    }
}

impl Encoder<TaggedMessage> for MessageCodec {
    type Error = Error;

    fn encode(&mut self, item: TaggedMessage, dst: &mut BytesMut) -> Result<()> {
        let max = self.config().max_message_size() as usize;
        let size = item.encoded_len();
        if size > max {
            return Err(Error::MessageTooLarge { size, max });
        }

        let frame = encode_message(&item)?;
        dst.extend_from_slice(&frame);
        Ok(())
    }
}
