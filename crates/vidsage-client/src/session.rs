/// Accumulation state of one streamed call
///
/// Created fresh per gateway call and dropped when it settles; never shared
/// between calls.
#[derive(Debug)]
pub struct StreamingSession<M> {
    accumulated_text: String,
    metadata: Option<M>,
    is_done: bool,
}

impl<M> Default for StreamingSession<M> {
    fn default() -> Self {
        Self {
            accumulated_text: String::new(),
            metadata: None,
            is_done: false,
        }
    }
}

impl<M> StreamingSession<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk, returning the full text so far
    pub fn push_chunk(&mut self, chunk: &str) -> &str {
        self.accumulated_text.push_str(chunk);
        &self.accumulated_text
    }

    /// Keep the first metadata record only
    pub fn set_metadata(&mut self, metadata: M) {
        if self.metadata.is_none() {
            self.metadata = Some(metadata);
        }
    }

    pub fn metadata(&self) -> Option<&M> {
        self.metadata.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.accumulated_text
    }

    pub fn finish(&mut self) {
        self.is_done = true;
    }

    pub fn is_done(&self) -> bool {
        self.is_done
    }

    pub fn into_parts(self) -> (String, Option<M>) {
        (self.accumulated_text, self.metadata)
    }
}
