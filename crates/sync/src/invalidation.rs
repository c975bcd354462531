/// Turns a stream of observed version tokens into reload triggers.
///
/// The first token seen is a baseline and never triggers. After that, each
/// distinct transition triggers exactly once; repeats of the current token
/// are ignored no matter how quickly they arrive.
#[derive(Debug, Clone, Default)]
pub struct VersionGate {
    last: Option<String>,
}

impl VersionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `token`; returns true when it differs from the last handled one.
    pub fn observe(&mut self, token: &str) -> bool {
        match self.last.as_deref() {
            Some(prev) if prev == token => false,
            Some(_) => {
                self.last = Some(token.to_string());
                true
            }
            None => {
                self.last = Some(token.to_string());
                false
            }
        }
    }

    /// Last handled token, if any.
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Forget the baseline; the next token observed becomes the new one.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
