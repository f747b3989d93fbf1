/// A single named variable and the bytes most recently stored under it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    name: String,
    bytes: Vec<u8>,
}

impl Record {
    pub(crate) fn new(name: &str, bytes: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Replaces the stored value. Same-length values are written in place,
    /// otherwise the old buffer is released and a new one allocated.
    pub(crate) fn store(&mut self, bytes: &[u8]) {
        if self.bytes.len() == bytes.len() {
            self.bytes.copy_from_slice(bytes);
        } else {
            self.bytes = bytes.to_vec();
        }
    }
}
