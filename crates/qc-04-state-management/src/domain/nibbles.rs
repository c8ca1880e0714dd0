// =============================================================================
// NIBBLES: Half-byte path representation
// =============================================================================

/// Nibble path for trie traversal.
///
/// Keys are converted to nibbles (half-bytes, 0-15) for traversal through the
/// trie. A 32-byte hashed key becomes 64 nibbles.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Nibbles(pub Vec<u8>);

impl Nibbles {
    /// Create nibbles from arbitrary bytes (used for hashed keys).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut nibbles = Vec::with_capacity(bytes.len() * 2);
        for byte in bytes {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0F);
        }
        Nibbles(nibbles)
    }

    /// Pack back into bytes. `None` for an odd number of nibbles.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        if self.len() % 2 == 1 {
            return None;
        }
        Some(self.0.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
    }

    /// Get a slice of nibbles starting at offset.
    pub fn slice(&self, start: usize) -> Self {
        Nibbles(self.0[start..].to_vec())
    }

    /// Get a range slice of nibbles.
    pub fn slice_range(&self, start: usize, end: usize) -> Self {
        Nibbles(self.0[start..end].to_vec())
    }

    /// Append another path to this one.
    pub fn join(&self, other: &Nibbles) -> Self {
        let mut joined = self.0.clone();
        joined.extend_from_slice(&other.0);
        Nibbles(joined)
    }

    pub fn push(&mut self, nibble: u8) {
        self.0.push(nibble);
    }

    /// Find common prefix length with another nibbles path.
    pub fn common_prefix_len(&self, other: &Nibbles) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get nibble at index.
    pub fn at(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Encode nibbles with hex-prefix for RLP encoding.
    ///
    /// Per Ethereum Yellow Paper:
    /// - First nibble encodes flags: 0=extension even, 1=extension odd, 2=leaf even, 3=leaf odd
    /// - If odd number of nibbles, first nibble is part of path
    pub fn encode_hex_prefix(&self, is_leaf: bool) -> Vec<u8> {
        let odd = self.len() % 2 == 1;
        let prefix = if is_leaf { 2 } else { 0 } + if odd { 1 } else { 0 };

        let mut result = Vec::with_capacity(self.len() / 2 + 1);

        let rest = if odd {
            result.push((prefix << 4) | self.0[0]);
            &self.0[1..]
        } else {
            result.push(prefix << 4);
            &self.0[..]
        };
        for pair in rest.chunks(2) {
            result.push((pair[0] << 4) | pair[1]);
        }

        result
    }

    /// Decode hex-prefix encoded bytes back to nibbles.
    pub fn decode_hex_prefix(encoded: &[u8]) -> (Self, bool) {
        if encoded.is_empty() {
            return (Nibbles(vec![]), false);
        }

        let prefix = encoded[0] >> 4;
        let is_leaf = prefix >= 2;
        let odd = prefix % 2 == 1;

        let mut nibbles = Vec::with_capacity(encoded.len() * 2);

        if odd {
            nibbles.push(encoded[0] & 0x0F);
        }

        for &byte in &encoded[1..] {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0F);
        }

        (Nibbles(nibbles), is_leaf)
    }
}
