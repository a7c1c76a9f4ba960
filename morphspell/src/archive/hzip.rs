//! Reader for `hzip` (`.hz`) compressed sources.
//!
//! The container is a `hz0` (plain) or `hz1` (obfuscated) magic, for `hz1` a
//! key checksum byte, a big-endian count of Huffman codes, the code table,
//! and the packed bit stream. Each code maps to two output bytes. The last
//! code read terminates the stream; if its first byte is non-zero, its second
//! byte is a trailing odd byte. With a key, only the code table is XORed with
//! the repeating key.

use byteorder::{BigEndian, ByteOrder};

const MAGIC: &[u8] = b"hz0";
const MAGIC_ENCRYPTED: &[u8] = b"hz1";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum HzipError {
    /// The data is truncated or not an hzip container
    #[error("not a valid hzip stream")]
    Format,

    /// The container is obfuscated but no key was supplied
    #[error("a key is required to read this file")]
    MissingKey,

    /// The supplied key does not match the container's checksum
    #[error("wrong key")]
    WrongKey,
}

struct KeyStream<'k> {
    key: Option<&'k [u8]>,
    pos: Option<usize>,
}

impl<'k> KeyStream<'k> {
    fn next(&mut self) -> u8 {
        match self.key {
            Some(key) if !key.is_empty() => {
                let pos = match self.pos {
                    None => 0,
                    Some(p) => (p + 1) % key.len(),
                };
                self.pos = Some(pos);
                key[pos]
            }
            _ => 0,
        }
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], HzipError> {
        let end = self.offset.checked_add(n).ok_or(HzipError::Format)?;
        let out = self.data.get(self.offset..end).ok_or(HzipError::Format)?;
        self.offset = end;
        Ok(out)
    }

    fn take_masked<const N: usize>(&mut self, key: &mut KeyStream<'_>) -> Result<[u8; N], HzipError> {
        let mut out = [0u8; N];
        for (o, b) in out.iter_mut().zip(self.take(N)?) {
            *o = b ^ key.next();
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Node {
    next: [usize; 2],
    bytes: [u8; 2],
}

#[inline(always)]
fn bit(data: &[u8], i: usize) -> usize {
    ((data[i / 8] >> (7 - (i % 8))) & 1) as usize
}

pub fn decode(data: &[u8], key: Option<&str>) -> Result<Vec<u8>, HzipError> {
    let mut reader = Reader { data, offset: 0 };

    let magic = reader.take(3)?;
    let key = if magic == MAGIC {
        None
    } else if magic == MAGIC_ENCRYPTED {
        let key = key.ok_or(HzipError::MissingKey)?.as_bytes();
        let checksum = reader.take(1)?[0];
        if key.iter().fold(checksum, |acc, b| acc ^ b) != 0 {
            return Err(HzipError::WrongKey);
        }
        Some(key)
    } else {
        return Err(HzipError::Format);
    };

    let mut stream = KeyStream { key, pos: None };

    let count = BigEndian::read_u16(&reader.take_masked::<2>(&mut stream)?) as usize;
    let mut tree = vec![Node::default()];

    for _ in 0..count {
        let bytes = reader.take_masked::<2>(&mut stream)?;
        let [len] = reader.take_masked::<1>(&mut stream)?;
        let len = len as usize;

        let mut bits = reader.take(len / 8 + 1)?.to_vec();
        for b in bits.iter_mut() {
            *b ^= stream.next();
        }

        let mut p = 0;
        for j in 0..len {
            let b = bit(&bits, j);
            if tree[p].next[b] == 0 {
                tree.push(Node::default());
                let id = tree.len() - 1;
                tree[p].next[b] = id;
            }
            p = tree[p].next[b];
        }
        tree[p].bytes = bytes;
    }

    let last = tree.len() - 1;
    let body = &data[reader.offset..];
    let mut out = Vec::with_capacity(body.len() * 2);
    let mut p = 0;

    for i in 0..body.len() * 8 {
        let b = bit(body, i);
        let prev = p;
        p = tree[p].next[b];

        if p == 0 {
            if prev == last {
                if tree[last].bytes[0] != 0 {
                    out.push(tree[last].bytes[1]);
                }
                return Ok(out);
            }
            out.extend_from_slice(&tree[prev].bytes);
            p = tree[0].next[b];
        }
    }

    Err(HzipError::Format)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two codes: `0` -> "ab", `1` -> terminator.
    const TABLE: &[u8] = &[0x00, 0x02, b'a', b'b', 1, 0x00, 0, 0, 1, 0x80];
    const BODY: &[u8] = &[0x20];

    fn plain() -> Vec<u8> {
        [MAGIC, TABLE, BODY].concat()
    }

    fn encrypted(key: &str) -> Vec<u8> {
        let key = key.as_bytes();
        let checksum = key.iter().fold(0u8, |acc, b| acc ^ b);
        let table: Vec<u8> = TABLE
            .iter()
            .enumerate()
            .map(|(i, b)| b ^ key[i % key.len()])
            .collect();
        [MAGIC_ENCRYPTED, &[checksum], &table, BODY].concat()
    }

    #[test]
    fn plain_stream() {
        assert_eq!(decode(&plain(), None).unwrap(), b"abab");
    }

    #[test]
    fn keyed_stream() {
        let data = encrypted("secret");
        assert_eq!(decode(&data, Some("secret")).unwrap(), b"abab");
        assert_eq!(decode(&data, Some("wrong!")), Err(HzipError::WrongKey));
        assert_eq!(decode(&data, None), Err(HzipError::MissingKey));
    }

    #[test]
    fn truncated() {
        assert_eq!(decode(b"hz", None), Err(HzipError::Format));
        assert_eq!(decode(b"zip", None), Err(HzipError::Format));
        let mut data = plain();
        data.pop();
        assert_eq!(decode(&data, None), Err(HzipError::Format));
    }
}
